
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::IndexError;
use crate::chunking::{ChunkingConfig, split_narrative};
use crate::dataset::ComplaintRecord;
use crate::embeddings::EmbeddingProvider;
use crate::store::{IndexedEntry, VectorStore};

/// Progress of one record through the pipeline. States advance strictly in
/// order; a record with an empty narrative passes through `Segmented`
/// directly to `Indexed` without writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Pending,
    Segmented,
    Embedded,
    Indexed,
}

/// Outcome of one full pass over the sampled records
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Records that reached `Indexed`
    pub records_processed: usize,
    /// Entries upserted into the collection
    pub entries_indexed: usize,
    /// Record indices that failed and can be retried independently
    pub failed_records: Vec<usize>,
}

/// Drives sampled records through segment → embed → index, sequentially.
///
/// The embedding provider and store handle are constructed by the caller and
/// borrowed for the duration of one run; the driver owns no ambient state.
/// A single record's failure is recorded and skipped, never aborting the
/// records after it.
pub struct PipelineDriver<'a, E: EmbeddingProvider> {
    embedder: &'a E,
    store: &'a mut VectorStore,
    chunking: ChunkingConfig,
    show_progress: bool,
}

impl<'a, E: EmbeddingProvider> PipelineDriver<'a, E> {
    #[inline]
    pub fn new(embedder: &'a E, store: &'a mut VectorStore, chunking: ChunkingConfig) -> Self {
        Self {
            embedder,
            store,
            chunking,
            show_progress: false,
        }
    }

    #[inline]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run the pipeline over every sampled record.
    ///
    /// Fails fast if the embedding provider is not usable; afterwards the
    /// only fatal outcomes are the caller dropping the future. Finishes only
    /// once every record has reached a terminal state.
    #[inline]
    pub async fn run(&mut self, records: &[ComplaintRecord]) -> crate::Result<RunSummary> {
        self.embedder.health_check()?;

        info!("Indexing {} sampled records", records.len());

        let progress = if self.show_progress {
            ProgressBar::new(records.len() as u64).with_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} records ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            )
        } else {
            ProgressBar::hidden()
        };

        let mut summary = RunSummary::default();

        for record in records {
            match self.process_record(record).await {
                Ok(entries) => {
                    summary.records_processed += 1;
                    summary.entries_indexed += entries;
                }
                Err(e) => {
                    warn!("Record {} failed: {}", record.record_index, e);
                    summary.failed_records.push(record.record_index);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();

        info!(
            "Run complete: {} records processed, {} entries indexed, {} failed",
            summary.records_processed,
            summary.entries_indexed,
            summary.failed_records.len()
        );

        Ok(summary)
    }

    /// Walk one record through the state machine; returns the number of
    /// entries written for it.
    async fn process_record(&mut self, record: &ComplaintRecord) -> crate::Result<usize> {
        let mut state = RecordState::Pending;
        debug!("Record {}: {:?}", record.record_index, state);

        let chunks = split_narrative(&record.narrative, &self.chunking);
        state = RecordState::Segmented;
        debug!(
            "Record {}: {:?} ({} chunks)",
            record.record_index,
            state,
            chunks.len()
        );

        if chunks.is_empty() {
            // Nothing to index; the record still completes
            state = RecordState::Indexed;
            debug!("Record {}: {:?} (empty narrative)", record.record_index, state);
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(IndexError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        state = RecordState::Embedded;
        debug!("Record {}: {:?}", record.record_index, state);

        let entries: Vec<IndexedEntry> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedEntry::assemble(record, chunk, vector))
            .collect();

        self.store.upsert_batch(&entries).await?;
        state = RecordState::Indexed;
        debug!(
            "Record {}: {:?} ({} entries)",
            record.record_index,
            state,
            entries.len()
        );

        Ok(entries.len())
    }
}
