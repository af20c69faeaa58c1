use rusqlite::{params, Connection};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::error::ScrapeError;
use crate::models::ApplicationRecord;
use crate::storage::RecordSink;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(db_path: &str) -> Result<Self, ScrapeError> {
        let conn = Connection::open(db_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ScrapeError> {
        self.conn.lock().map_err(|_| ScrapeError::StorageLock)
    }

    pub fn migrate(&self) -> Result<(), ScrapeError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS data (
                council_reference TEXT NOT NULL PRIMARY KEY,
                description TEXT NOT NULL,
                date_received TEXT NOT NULL,
                address TEXT NOT NULL,
                date_scraped TEXT NOT NULL,
                info_url TEXT NOT NULL
            )",
            [],
        )?;

        info!("Database migration completed");
        Ok(())
    }

    pub fn count(&self) -> Result<usize, ScrapeError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM data", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
impl SqliteStorage {
    pub fn in_memory() -> Result<Self, ScrapeError> {
        Self::open(":memory:")
    }

    pub fn description_of(&self, council_reference: &str) -> Result<Option<String>, ScrapeError> {
        use rusqlite::OptionalExtension;

        let conn = self.conn()?;
        let description = conn
            .query_row(
                "SELECT description FROM data WHERE council_reference = ?1",
                params![council_reference],
                |row| row.get(0),
            )
            .optional()?;
        Ok(description)
    }
}

impl RecordSink for SqliteStorage {
    fn save(&self, record: &ApplicationRecord) -> Result<(), ScrapeError> {
        info!("Storing {} - {}", record.council_reference, record.address);
        let conn = self.conn()?;

        conn.execute(
            "INSERT OR REPLACE INTO data
                (council_reference, description, date_received, address, date_scraped, info_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.council_reference,
                record.description,
                record.date_received.to_string(),
                record.address,
                record.date_scraped.format("%Y-%m-%d").to_string(),
                record.info_url,
            ],
        )?;

        Ok(())
    }
}
