use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{KeyValueStore, ResumeFile, ResumeId, ResumeUpdate, StoreError, StoredResume};

pub const RESUME_STORAGE_KEY: &str = "storedResume";

/// Single-slot resume cache. Every write replaces the previous record.
#[derive(Clone)]
pub struct ResumeStore {
    store: Arc<dyn KeyValueStore>,
}

impl ResumeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(
        &self,
        file: &ResumeFile,
        resume_id: Option<ResumeId>,
        metadata: Option<serde_json::Value>,
    ) -> Result<StoredResume, StoreError> {
        let record = StoredResume::from_file(file, resume_id, metadata);
        self.write(&record)?;
        info!(
            file_name = %record.file_name,
            file_size = record.file_size,
            "resume stored"
        );
        Ok(record)
    }

    /// The stored record, if any. An unreadable record is treated as absent.
    pub fn get(&self) -> Result<Option<StoredResume>, StoreError> {
        let Some(raw) = self.store.get(RESUME_STORAGE_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable stored resume");
                Ok(None)
            }
        }
    }

    pub fn has_stored(&self) -> Result<bool, StoreError> {
        Ok(self.get()?.is_some())
    }

    pub fn remove(&self) -> Result<(), StoreError> {
        self.store.remove(RESUME_STORAGE_KEY)?;
        info!("stored resume removed");
        Ok(())
    }

    /// Decode the stored record back into a file.
    pub fn get_as_file(&self) -> Result<Option<ResumeFile>, StoreError> {
        let Some(record) = self.get()? else {
            return Ok(None);
        };

        let file = record.to_file();
        if file.is_none() {
            warn!(file_name = %record.file_name, "stored resume payload is not a valid data URL");
        }
        Ok(file)
    }

    /// Merge `update` into the stored record. Does nothing when no record exists.
    pub fn update_metadata(
        &self,
        update: ResumeUpdate,
    ) -> Result<Option<StoredResume>, StoreError> {
        let Some(mut record) = self.get()? else {
            return Ok(None);
        };

        record.apply(update);
        self.write(&record)?;
        info!("stored resume metadata updated");
        Ok(Some(record))
    }

    fn write(&self, record: &StoredResume) -> Result<(), StoreError> {
        let rendered = serde_json::to_string(record)?;
        self.store.set(RESUME_STORAGE_KEY, &rendered)
    }
}
