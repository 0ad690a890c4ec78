//! SQLite-backed history of successful lookups.
//!
//! Rows are only ever appended or wiped in bulk; nothing updates or deletes a
//! single record.

use parking_lot::Mutex;
use rusqlite::{Connection, params};
use std::path::Path;

use crate::error::StoreResult;
use crate::model::{NewWeatherRecord, WeatherRecord};

/// Number of rows shown as history on the page.
pub const HISTORY_LIMIT: usize = 5;

/// The `weather` table. Shared by all requests; each statement is atomic on its own.
pub struct WeatherStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for WeatherStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherStore").finish_non_exhaustive()
    }
}

impl WeatherStore {
    /// Open (or create) the database file and its table.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { conn: Mutex::new(Connection::open(path)?) };
        store.init_schema()?;
        tracing::debug!("Opened weather history at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let store = Self { conn: Mutex::new(Connection::open_in_memory()?) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                temperature REAL,
                description TEXT,
                time TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Append a row and return it with its freshly assigned id.
    pub fn insert(&self, record: &NewWeatherRecord) -> StoreResult<WeatherRecord> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO weather (city, temperature, description, time) VALUES (?1, ?2, ?3, ?4)",
            params![record.city, record.temperature, record.description, record.time],
        )?;
        let id = conn.last_insert_rowid();

        Ok(WeatherRecord {
            id,
            city: record.city.clone(),
            temperature: record.temperature,
            description: record.description.clone(),
            time: record.time.clone(),
        })
    }

    /// Up to `limit` rows, most recently inserted first.
    pub fn list_recent(&self, limit: usize) -> StoreResult<Vec<WeatherRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, city, COALESCE(temperature, 0.0), COALESCE(description, ''), COALESCE(time, '')
             FROM weather
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(WeatherRecord {
                id: row.get(0)?,
                city: row.get(1)?,
                temperature: row.get(2)?,
                description: row.get(3)?,
                time: row.get(4)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete every row. Returns how many were removed.
    pub fn clear_all(&self) -> StoreResult<usize> {
        let removed = self.conn.lock().execute("DELETE FROM weather", [])?;
        tracing::debug!("Cleared {} history rows", removed);
        Ok(removed)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 =
            self.conn.lock().query_row("SELECT COUNT(*) FROM weather", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
