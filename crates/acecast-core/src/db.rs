// SQLite persistence for daily predictions and the pick history.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{HistoryEntry, HistorySummary, Prediction};

/// Calendar-date key format used for both tables.
const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_FORMAT)
        .with_context(|| format!("invalid date key in database: {key}"))
}

/// Date-keyed prediction cache plus one history row per date.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS predictions (
                date       TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                is_sample  INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS history (
                date         TEXT PRIMARY KEY,
                score        REAL NOT NULL,
                pitcher_name TEXT NOT NULL,
                pitcher_id   INTEGER NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// The cached prediction for `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Result<Option<Prediction>> {
        let conn = self.conn();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM predictions WHERE date = ?1",
                params![date_key(date)],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query cached prediction")?;

        payload
            .map(|json| {
                serde_json::from_str(&json).context("failed to deserialize cached prediction")
            })
            .transpose()
    }

    /// Store `prediction` as the authoritative pick for `date`, replacing any
    /// earlier one, and replace that date's history row in the same
    /// transaction.
    pub fn put(&self, prediction: &Prediction, date: NaiveDate) -> Result<()> {
        let payload =
            serde_json::to_string(prediction).context("failed to serialize prediction")?;
        let key = date_key(date);
        let entry = HistoryEntry {
            date,
            ..HistoryEntry::from(prediction)
        };

        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute(
            "INSERT OR REPLACE INTO predictions (date, payload, is_sample)
             VALUES (?1, ?2, ?3)",
            params![key, payload, prediction.is_sample],
        )
        .context("failed to store prediction")?;
        tx.execute(
            "INSERT OR REPLACE INTO history (date, score, pitcher_name, pitcher_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, entry.score, entry.pitcher_name, entry.pitcher_id],
        )
        .context("failed to store history entry")?;
        tx.commit().context("failed to commit prediction")?;
        Ok(())
    }

    /// Every history entry, most recent date first.
    pub fn history_entries(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT date, score, pitcher_name, pitcher_id
                 FROM history ORDER BY date DESC",
            )
            .context("failed to prepare history query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                ))
            })
            .context("failed to query history")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map history rows")?;

        rows.into_iter()
            .map(|(date, score, pitcher_name, pitcher_id)| -> Result<HistoryEntry> {
                Ok(HistoryEntry {
                    date: parse_date_key(&date)?,
                    score,
                    pitcher_name,
                    pitcher_id,
                })
            })
            .collect()
    }

    pub fn history_summary(&self) -> Result<HistorySummary> {
        Ok(HistorySummary::from_entries(&self.history_entries()?))
    }
}
