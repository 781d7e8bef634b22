#[cfg(test)]
mod tests;

pub mod vector_store;

pub use vector_store::{StoredEntry, VectorStore};

use crate::chunking::NarrativeChunk;
use crate::dataset::ComplaintRecord;

/// Deterministic entry id: record index and chunk index joined by an
/// underscore. Stable across runs over the same sample ordering, so re-runs
/// upsert over the same ids instead of duplicating entries.
#[inline]
pub fn entry_id(record_index: usize, chunk_index: usize) -> String {
    format!("{}_{}", record_index, chunk_index)
}

/// Descriptive metadata persisted alongside each chunk.
///
/// The key set is uniform: optional source fields persist as explicit nulls,
/// never as omitted columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// External complaint id, or the record index when the source has none
    pub complaint_id: String,
    pub product: String,
    pub issue: Option<String>,
    pub company: Option<String>,
    /// 0-based position of the chunk within its parent narrative
    pub chunk_index: u32,
}

impl EntryMetadata {
    #[inline]
    pub fn for_chunk(record: &ComplaintRecord, chunk_index: usize) -> Self {
        let complaint_id = record
            .complaint_id
            .clone()
            .unwrap_or_else(|| record.record_index.to_string());

        Self {
            complaint_id,
            product: record.product.clone(),
            issue: record.issue.clone(),
            company: record.company.clone(),
            chunk_index: chunk_index as u32,
        }
    }
}

/// The unit persisted to the vector store: one chunk, its embedding, and its
/// metadata under a deterministic id.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub id: String,
    /// The chunk text
    pub document: String,
    pub vector: Vec<f32>,
    pub metadata: EntryMetadata,
}

impl IndexedEntry {
    /// Assemble the full tuple for one (record, chunk) pair.
    #[inline]
    pub fn assemble(record: &ComplaintRecord, chunk: &NarrativeChunk, vector: Vec<f32>) -> Self {
        Self {
            id: entry_id(record.record_index, chunk.chunk_index),
            document: chunk.content.clone(),
            vector,
            metadata: EntryMetadata::for_chunk(record, chunk.chunk_index),
        }
    }
}
