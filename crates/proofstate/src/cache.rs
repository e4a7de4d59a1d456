//! Read-only symbolic-expression cache.
//!
//! Global-environment constants arrive with a sexp key whose parse input
//! lives in a pre-built cache file. The cache is a two-column Parquet
//! table (`key: Utf8`, `term: Utf8`) loaded once per process into a
//! `HashMap` for O(1) lookups; this layer never writes to it. `save`
//! exists for building caches and test fixtures offline.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

/// In-memory view of the symbolic-expression cache.
pub struct SexpCache {
    entries: HashMap<String, String>,
}

impl SexpCache {
    /// Load a cache from a Parquet file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            anyhow::anyhow!("failed to open sexp cache {}: {e}", path.display())
        })?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut entries = HashMap::new();
        for batch_result in reader {
            let batch = batch_result?;

            let keys = batch
                .column(0)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow::anyhow!("column 0 is not StringArray"))?;
            let terms = batch
                .column(1)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow::anyhow!("column 1 is not StringArray"))?;

            for i in 0..batch.num_rows() {
                entries.insert(keys.value(i).to_string(), terms.value(i).to_string());
            }
        }

        tracing::info!(
            entries = entries.len(),
            path = %path.display(),
            "Loaded sexp cache"
        );

        Ok(SexpCache { entries })
    }

    /// Build a cache in memory.
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        SexpCache { entries }
    }

    /// Look up the cached parse input for a sexp key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Whether the cache holds an entry for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache to a Parquet file.
    ///
    /// Schema: `key: Utf8`, `term: Utf8`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let schema = Arc::new(sexp_cache_schema());

        let mut keys = Vec::with_capacity(self.entries.len());
        let mut terms = Vec::with_capacity(self.entries.len());
        for (key, term) in &self.entries {
            keys.push(key.as_str());
            terms.push(term.as_str());
        }

        let key_array: StringArray = keys.iter().map(|s| Some(*s)).collect();
        let term_array: StringArray = terms.iter().map(|s| Some(*s)).collect();

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(key_array) as ArrayRef,
                Arc::new(term_array) as ArrayRef,
            ],
        )?;

        let file = std::fs::File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::info!(
            entries = self.entries.len(),
            path = %path.display(),
            "Saved sexp cache"
        );

        Ok(())
    }
}

/// Arrow schema for sexp cache Parquet files.
fn sexp_cache_schema() -> Schema {
    Schema::new(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("term", DataType::Utf8, false),
    ])
}
