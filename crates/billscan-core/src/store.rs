//! Bill record persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::bill::{BillDraft, BillRecord};

/// Storage for reviewed bills.
pub trait BillStore {
    /// Persist a draft, assigning it an id and creation time.
    fn insert(&mut self, draft: BillDraft) -> Result<BillRecord, StoreError>;

    /// All records, newest first.
    fn list(&self) -> Result<Vec<BillRecord>, StoreError>;
}

/// Bill store keeping every record in one JSON file.
///
/// A missing file is an empty store. The whole file is rewritten on insert.
pub struct JsonBillStore {
    path: PathBuf,
}

impl JsonBillStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<BillRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No bill store at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn write(&self, records: &[BillRecord]) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        fs::write(&self.path, content).map_err(io_err)
    }
}

impl BillStore for JsonBillStore {
    fn insert(&mut self, draft: BillDraft) -> Result<BillRecord, StoreError> {
        let mut records = self.load()?;

        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = draft.into_record(id, Utc::now());

        records.push(record.clone());
        self.write(&records)?;

        info!("Saved bill {} to {}", id, self.path.display());

        Ok(record)
    }

    fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        let mut records = self.load()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}
