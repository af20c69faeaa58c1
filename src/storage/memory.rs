use std::sync::Mutex;

use crate::error::ScrapeError;
use crate::models::ApplicationRecord;
use crate::storage::RecordSink;

/// Collects records in emission order.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ApplicationRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl RecordSink for MemorySink {
    fn save(&self, record: &ApplicationRecord) -> Result<(), ScrapeError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
