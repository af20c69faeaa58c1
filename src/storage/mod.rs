use crate::error::ScrapeError;
use crate::models::ApplicationRecord;

mod sqlite;
pub use sqlite::SqliteStorage;

#[cfg(test)]
pub mod memory;

/// Destination for emitted records. Implementations must treat
/// `council_reference` as the key and overwrite on collision.
pub trait RecordSink: Send + Sync {
    fn save(&self, record: &ApplicationRecord) -> Result<(), ScrapeError>;
}
