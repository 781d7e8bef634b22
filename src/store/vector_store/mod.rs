
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase, Select},
};
use tracing::{debug, info};

use super::{EntryMetadata, IndexedEntry};
use crate::IndexError;

/// Persistent vector collection backed by LanceDB.
///
/// The collection is addressed by name under a persistence directory and is
/// created on first write (get-or-create semantics). Writes are upserts keyed
/// by entry id, so re-running a pipeline over the same sample replaces
/// entries instead of duplicating them.
pub struct VectorStore {
    connection: Connection,
    collection: String,
    vector_dimension: Option<usize>,
}

/// A read-back view of one persisted entry (vector omitted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: String,
    pub document: String,
    pub metadata: EntryMetadata,
}

impl VectorStore {
    /// Connect to the store at `persist_dir` and bind to `collection`.
    ///
    /// An existing collection's vector dimension is detected from its schema;
    /// a missing collection is created lazily on the first upsert, once the
    /// dimension is known from the data.
    #[inline]
    pub async fn open(persist_dir: &Path, collection: &str) -> Result<Self, IndexError> {
        debug!(
            "Opening vector store at {} (collection {:?})",
            persist_dir.display(),
            collection
        );

        std::fs::create_dir_all(persist_dir).map_err(|e| {
            IndexError::Store(format!("Failed to create vector store directory: {}", e))
        })?;

        let uri = format!("file://{}", persist_dir.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        let mut store = Self {
            connection,
            collection: collection.to_string(),
            vector_dimension: None,
        };

        if store.collection_exists().await? {
            let dimension = store.detect_vector_dimension().await?;
            store.vector_dimension = Some(dimension);
            info!(
                "Opened existing collection {:?} with {}-dimensional vectors",
                store.collection, dimension
            );
        }

        Ok(store)
    }

    /// Upsert a batch of entries into the collection.
    ///
    /// Every entry must carry a non-empty document and embedding; the batch
    /// is rejected before any write otherwise, so no partial tuple is ever
    /// persisted. All vectors must match the collection's dimension.
    #[inline]
    pub async fn upsert_batch(&mut self, entries: &[IndexedEntry]) -> Result<(), IndexError> {
        if entries.is_empty() {
            debug!("No entries to upsert");
            return Ok(());
        }

        let dimension = validate_entries(entries)?;
        self.ensure_collection(dimension).await?;

        let batch = self.create_record_batch(entries, dimension)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);

        let table = self.open_table().await?;
        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        let result = merge
            .execute(Box::new(reader))
            .await
            .map_err(|e| IndexError::Store(format!("Failed to upsert entries: {}", e)))?;

        debug!(
            "Upserted {} entries into {:?} ({} inserted, {} updated)",
            entries.len(),
            self.collection,
            result.num_inserted_rows,
            result.num_updated_rows
        );
        Ok(())
    }

    /// Total number of entries in the collection.
    #[inline]
    pub async fn count_entries(&self) -> Result<u64, IndexError> {
        if !self.collection_exists().await? {
            return Ok(0);
        }

        let table = self.open_table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| IndexError::Store(format!("Failed to count entries: {}", e)))?;

        Ok(count as u64)
    }

    /// All entry ids in the collection.
    #[inline]
    pub async fn entry_ids(&self) -> Result<Vec<String>, IndexError> {
        if !self.collection_exists().await? {
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;
        let mut stream = table
            .query()
            .select(Select::Columns(vec!["id".to_string()]))
            .execute()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to query entry ids: {}", e)))?;

        let mut ids = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to read id stream: {}", e)))?
        {
            let column = string_column(&batch, "id")?;
            for row in 0..batch.num_rows() {
                ids.push(column.value(row).to_string());
            }
        }

        Ok(ids)
    }

    /// Read back up to `limit` entries with their documents and metadata.
    #[inline]
    pub async fn list_entries(&self, limit: usize) -> Result<Vec<StoredEntry>, IndexError> {
        if !self.collection_exists().await? {
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;
        let mut stream = table
            .query()
            .limit(limit)
            .execute()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to query entries: {}", e)))?;

        let mut entries = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to read entry stream: {}", e)))?
        {
            entries.extend(parse_entry_batch(&batch)?);
        }

        Ok(entries)
    }

    async fn collection_exists(&self) -> Result<bool, IndexError> {
        let names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to list collections: {}", e)))?;
        Ok(names.contains(&self.collection))
    }

    async fn ensure_collection(&mut self, dimension: usize) -> Result<(), IndexError> {
        match self.vector_dimension {
            Some(existing) if existing == dimension => Ok(()),
            Some(existing) => Err(IndexError::Store(format!(
                "Embedding dimension {} does not match collection's {}; \
                 all entries in a collection must come from the same model",
                dimension, existing
            ))),
            None => {
                info!(
                    "Creating collection {:?} with {}-dimensional vectors",
                    self.collection, dimension
                );

                let schema = create_schema(dimension);
                self.connection
                    .create_empty_table(&self.collection, schema)
                    .execute()
                    .await
                    .map_err(|e| {
                        IndexError::Store(format!("Failed to create collection: {}", e))
                    })?;

                self.vector_dimension = Some(dimension);
                Ok(())
            }
        }
    }

    async fn detect_vector_dimension(&self) -> Result<usize, IndexError> {
        let table = self.open_table().await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to read collection schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(*size as usize);
                }
            }
        }

        Err(IndexError::Store(
            "Could not find vector column or determine its dimension".to_string(),
        ))
    }

    async fn open_table(&self) -> Result<lancedb::Table, IndexError> {
        self.connection
            .open_table(&self.collection)
            .execute()
            .await
            .map_err(|e| IndexError::Store(format!("Failed to open collection: {}", e)))
    }

    fn create_record_batch(
        &self,
        entries: &[IndexedEntry],
        dimension: usize,
    ) -> Result<RecordBatch, IndexError> {
        let len = entries.len();
        let indexed_at = Utc::now().to_rfc3339();

        let mut ids = Vec::with_capacity(len);
        let mut documents = Vec::with_capacity(len);
        let mut complaint_ids = Vec::with_capacity(len);
        let mut products = Vec::with_capacity(len);
        let mut issues = Vec::with_capacity(len);
        let mut companies = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut indexed_ats = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * dimension);

        for entry in entries {
            ids.push(entry.id.as_str());
            documents.push(entry.document.as_str());
            complaint_ids.push(entry.metadata.complaint_id.as_str());
            products.push(entry.metadata.product.as_str());
            issues.push(entry.metadata.issue.as_deref());
            companies.push(entry.metadata.company.as_deref());
            chunk_indices.push(entry.metadata.chunk_index);
            indexed_ats.push(indexed_at.as_str());
            flat_values.extend_from_slice(&entry.vector);
        }

        let values_array = Float32Array::from(flat_values);
        let item_field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(item_field, dimension as i32, Arc::new(values_array), None)
                .map_err(|e| IndexError::Store(format!("Failed to create vector array: {}", e)))?;

        let schema = create_schema(dimension);
        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(documents)),
            Arc::new(StringArray::from(complaint_ids)),
            Arc::new(StringArray::from(products)),
            Arc::new(StringArray::from(issues)),
            Arc::new(StringArray::from(companies)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(indexed_ats)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| IndexError::Store(format!("Failed to create record batch: {}", e)))
    }
}

/// Reject partial tuples and mixed dimensions before anything is written.
fn validate_entries(entries: &[IndexedEntry]) -> Result<usize, IndexError> {
    let dimension = entries[0].vector.len();

    for entry in entries {
        if entry.document.is_empty() {
            return Err(IndexError::Store(format!(
                "Entry {} has an empty document",
                entry.id
            )));
        }
        if entry.vector.is_empty() {
            return Err(IndexError::Store(format!(
                "Entry {} has an empty embedding",
                entry.id
            )));
        }
        if entry.vector.len() != dimension {
            return Err(IndexError::Store(format!(
                "Entry {} has dimension {} but the batch started with {}",
                entry.id,
                entry.vector.len(),
                dimension
            )));
        }
    }

    Ok(dimension)
}

fn create_schema(dimension: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                dimension as i32,
            ),
            false,
        ),
        Field::new("document", DataType::Utf8, false),
        Field::new("complaint_id", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("issue", DataType::Utf8, true),
        Field::new("company", DataType::Utf8, true),
        Field::new("chunk_index", DataType::UInt32, false),
        Field::new("indexed_at", DataType::Utf8, false),
    ]))
}

fn parse_entry_batch(batch: &RecordBatch) -> Result<Vec<StoredEntry>, IndexError> {
    let ids = string_column(batch, "id")?;
    let documents = string_column(batch, "document")?;
    let complaint_ids = string_column(batch, "complaint_id")?;
    let products = string_column(batch, "product")?;
    let issues = string_column(batch, "issue")?;
    let companies = string_column(batch, "company")?;

    let chunk_indices = batch
        .column_by_name("chunk_index")
        .ok_or_else(|| IndexError::Store("Missing chunk_index column".to_string()))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| IndexError::Store("Invalid chunk_index column type".to_string()))?;

    let mut entries = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        entries.push(StoredEntry {
            id: ids.value(row).to_string(),
            document: documents.value(row).to_string(),
            metadata: EntryMetadata {
                complaint_id: complaint_ids.value(row).to_string(),
                product: products.value(row).to_string(),
                issue: optional_value(issues, row),
                company: optional_value(companies, row),
                chunk_index: chunk_indices.value(row),
            },
        });
    }

    Ok(entries)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, IndexError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| IndexError::Store(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| IndexError::Store(format!("Invalid {} column type", name)))
}

fn optional_value(column: &StringArray, row: usize) -> Option<String> {
    if column.is_null(row) {
        None
    } else {
        Some(column.value(row).to_string())
    }
}
