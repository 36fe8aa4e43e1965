use crate::reading::parsha::parse_timestamp;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Completion state of one aliyah as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEntry {
    pub is_complete: bool,
    pub date_completed: Option<DateTime<Utc>>,
}

/// Progress keyed by `(parsha title, aliyah number)`.
pub type ProgressMap = HashMap<(String, u32), ProgressEntry>;

/// SQLite-backed reading progress.
///
/// A connection is opened per call, so the store is cheap to share between
/// request handlers.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    db_path: PathBuf,
}

impl ProgressStore {
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            db_path: db_path.into(),
        };
        if let Some(parent) = store.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {parent:?}"))?;
        }
        store.init()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connection(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open database at {:?}", self.db_path))
    }

    fn init(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS progress (
                parsha_title TEXT NOT NULL,
                aliyah_number INTEGER NOT NULL,
                is_complete INTEGER NOT NULL DEFAULT 0,
                date_completed TEXT,
                PRIMARY KEY (parsha_title, aliyah_number)
            )",
            [],
        )?;

        Ok(())
    }

    pub fn load_progress(&self) -> Result<ProgressMap> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT parsha_title, aliyah_number, is_complete, date_completed FROM progress",
        )?;

        let rows = stmt.query_map([], |row| {
            let title: String = row.get(0)?;
            let number: i64 = row.get(1)?;
            let is_complete: i64 = row.get(2)?;
            let date_completed: Option<String> = row.get(3)?;
            Ok((title, number, is_complete, date_completed))
        })?;

        let mut progress = ProgressMap::new();
        for row in rows {
            let (title, number, is_complete, date_completed) = row?;
            let Ok(number) = u32::try_from(number) else {
                tracing::warn!(title = %title, number, "Skipping progress row with invalid aliyah number");
                continue;
            };
            progress.insert(
                (title, number),
                ProgressEntry {
                    is_complete: is_complete != 0,
                    date_completed: date_completed.as_deref().and_then(parse_timestamp),
                },
            );
        }

        Ok(progress)
    }

    pub fn get(&self, title: &str, number: u32) -> Result<Option<ProgressEntry>> {
        let conn = self.connection()?;
        let result = conn.query_row(
            "SELECT is_complete, date_completed FROM progress WHERE parsha_title = ?1 AND aliyah_number = ?2",
            params![title, number as i64],
            |row| {
                let is_complete: i64 = row.get(0)?;
                let date_completed: Option<String> = row.get(1)?;
                Ok((is_complete, date_completed))
            },
        );

        match result {
            Ok((is_complete, date_completed)) => Ok(Some(ProgressEntry {
                is_complete: is_complete != 0,
                date_completed: date_completed.as_deref().and_then(parse_timestamp),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Marks an aliyah complete. The completion date is stamped only on the
    /// transition to complete; re-marking keeps the original date.
    pub fn mark_complete(&self, title: &str, number: u32) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO progress (parsha_title, aliyah_number, is_complete, date_completed)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(parsha_title, aliyah_number) DO UPDATE SET
                date_completed = CASE WHEN progress.is_complete = 1
                                      THEN progress.date_completed
                                      ELSE excluded.date_completed END,
                is_complete = 1",
            params![title, number as i64, now],
        )?;

        Ok(())
    }

    pub fn mark_incomplete(&self, title: &str, number: u32) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "UPDATE progress SET is_complete = 0, date_completed = NULL
             WHERE parsha_title = ?1 AND aliyah_number = ?2",
            params![title, number as i64],
        )?;

        Ok(())
    }

    pub fn set_complete(&self, title: &str, number: u32, is_complete: bool) -> Result<()> {
        if is_complete {
            self.mark_complete(title, number)
        } else {
            self.mark_incomplete(title, number)
        }
    }
}
