//! Main store implementation.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;
use tracing::{debug, info};

use verdure_types::{CalendarDate, Reading};

use crate::error::{Error, Result};
use crate::models::StoredReading;
use crate::schema;

const READING_COLUMNS: &str =
    "id, timestamp, amb_temp, water_temp, ph_value, ec_value, lux_top, lux_bot";

/// SQLite-based store for cultivation-unit sensor data.
///
/// Every operation executes exactly one query; prepared statements are
/// finalized on every exit path (success, empty result, error) when they
/// drop, so a failure mid-query never leaks a cursor.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        // WAL mode so the acquisition loop's writes don't block readers
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        // Initialize schema
        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }
}

// Reading operations
impl Store {
    /// Insert a sensor reading captured at the given instant.
    ///
    /// Unavailable metrics are stored as NULL columns.
    pub fn insert_reading(&self, reading: &Reading, captured_at: OffsetDateTime) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sensor_data (timestamp, amb_temp, water_temp, ph_value, ec_value, lux_top, lux_bot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                captured_at.unix_timestamp(),
                reading.ambient_temp.value(),
                reading.water_temp.value(),
                reading.ph.value(),
                reading.ec.value(),
                reading.lux_top.value(),
                reading.lux_bottom.value(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// The single most recent reading across all time.
    ///
    /// Returns the all-unavailable reading if the store holds no rows; an
    /// empty store is not an error.
    pub fn latest_reading(&self) -> Result<Reading> {
        let sql = format!(
            "SELECT {READING_COLUMNS} FROM sensor_data ORDER BY timestamp DESC LIMIT 1"
        );
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let row = stmt.query_row([], map_reading_row).optional()?;

        Ok(row.map(|r| r.to_reading()).unwrap_or_else(Reading::unavailable))
    }

    /// The most recent reading captured on the given UTC calendar day.
    ///
    /// Returns the all-unavailable reading if no row exists for that day.
    pub fn reading_on(&self, date: CalendarDate) -> Result<Reading> {
        let sql = format!(
            "SELECT {READING_COLUMNS} FROM sensor_data
             WHERE date(timestamp, 'unixepoch') = ?1
             ORDER BY timestamp DESC LIMIT 1"
        );
        debug!("Executing query for {}: {}", date, sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let row = stmt
            .query_row([date.to_string()], map_reading_row)
            .optional()?;

        Ok(row.map(|r| r.to_reading()).unwrap_or_else(Reading::unavailable))
    }

    /// The distinct set of UTC calendar days that have at least one row.
    pub fn dates_with_data(&self) -> Result<HashSet<CalendarDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT date(timestamp, 'unixepoch') FROM sensor_data")?;

        let strings = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut dates = HashSet::with_capacity(strings.len());
        for s in strings {
            let date = s.parse().map_err(|_| Error::InvalidDate(s.clone()))?;
            dates.insert(date);
        }

        Ok(dates)
    }

    /// Count stored readings.
    pub fn count_readings(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sensor_data", [], |row| row.get(0))?;

        Ok(count as u64)
    }
}

fn map_reading_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredReading> {
    Ok(StoredReading {
        id: row.get(0)?,
        timestamp: OffsetDateTime::from_unix_timestamp(row.get(1)?).unwrap(),
        amb_temp: row.get(2)?,
        water_temp: row.get(3)?,
        ph_value: row.get(4)?,
        ec_value: row.get(5)?,
        lux_top: row.get(6)?,
        lux_bot: row.get(7)?,
    })
}
