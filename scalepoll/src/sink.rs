//! Record persistence
//!
//! A sink receives exactly one [`Record`] per polling cycle, connected or
//! not. Sinks own their storage layout; the poller only needs `store`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use scalepoll_types::Record;

use crate::error::{Error, Result};

/// Destination for polling records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingSink: Send + Sync {
    /// Persist one record
    async fn store(&self, record: &Record) -> Result<()>;
}

/// Appends records to a file, one JSON object per line
///
/// Columns mirror the readings table: `weight`, `division`, `stable`,
/// `connected` and `recorded_at`.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReadingSink for JsonLinesSink {
    async fn store(&self, record: &Record) -> Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| Error::Sink(format!("serialize record: {}", e)))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::Sink(format!("open {}: {}", self.path.display(), e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Sink(format!("write {}: {}", self.path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| Error::Sink(format!("flush {}: {}", self.path.display(), e)))?;

        debug!("Appended record to {}", self.path.display());
        Ok(())
    }
}

/// Keeps records in memory; clones share the same storage
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl ReadingSink for MemorySink {
    async fn store(&self, record: &Record) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
