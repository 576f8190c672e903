//! In-memory submission store for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::traits::store::SubmissionStore;
use crate::types::record::LoanRecord;

/// Keeps loan records in a process-local map. Data is lost on restart;
/// not suitable for production.
#[derive(Default)]
pub struct MemorySubmissionStore {
    records: RwLock<HashMap<String, LoanRecord>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn clear(&self) {
        self.records.write().unwrap().clear();
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn load_loan_record(
        &self,
        submission_id: &str,
    ) -> Result<Option<LoanRecord>, StoreError> {
        Ok(self.records.read().unwrap().get(submission_id).cloned())
    }

    async fn save_loan_record(
        &self,
        submission_id: &str,
        record: &LoanRecord,
    ) -> Result<(), StoreError> {
        self.records
            .write()
            .unwrap()
            .insert(submission_id.to_string(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = MemorySubmissionStore::new();
        assert_eq!(store.load_loan_record("sub-1").await.unwrap(), None);

        let record = LoanRecord::empty("Acme LLC", "https://example.com/acme");
        store.save_loan_record("sub-1", &record).await.unwrap();

        assert_eq!(store.record_count(), 1);
        assert_eq!(store.load_loan_record("sub-1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = MemorySubmissionStore::new();

        let first = LoanRecord::empty("Acme LLC", "https://example.com/a");
        let second = LoanRecord::empty("Acme LLC", "https://example.com/b");
        store.save_loan_record("sub-1", &first).await.unwrap();
        store.save_loan_record("sub-1", &second).await.unwrap();

        let loaded = store.load_loan_record("sub-1").await.unwrap().unwrap();
        assert_eq!(loaded.source_link, "https://example.com/b");
    }
}
