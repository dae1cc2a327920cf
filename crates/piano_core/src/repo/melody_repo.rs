//! Melody repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist melodies with their ordered note lists.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - A melody row and its note rows are written in one transaction.
//! - Notes are read back ordered by `position`, i.e. recorded order.
//! - Lists are ordered `created_at DESC`, later inserts first on ties.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::melody::{Melody, MelodyId};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MELODY_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    created_at
FROM melodies";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for melody persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid melody data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for melody storage.
///
/// Melodies are immutable once stored; there is no update or delete.
pub trait MelodyRepository {
    /// Inserts a complete melody record.
    fn insert_melody(&mut self, melody: &Melody) -> RepoResult<MelodyId>;
    /// Gets one melody by id.
    fn get_melody(&self, id: MelodyId) -> RepoResult<Option<Melody>>;
    /// Lists all melodies, newest first.
    fn list_melodies(&self) -> RepoResult<Vec<Melody>>;
}

/// SQLite-backed melody repository.
pub struct SqliteMelodyRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMelodyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations have not been applied.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in ["melodies", "melody_notes"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl MelodyRepository for SqliteMelodyRepository<'_> {
    fn insert_melody(&mut self, melody: &Melody) -> RepoResult<MelodyId> {
        if melody.title.trim().is_empty() {
            return Err(RepoError::InvalidData("melody title is blank".to_string()));
        }
        if melody.notes.is_empty() {
            return Err(RepoError::InvalidData("melody has no notes".to_string()));
        }

        let id_text = melody.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO melodies (uuid, title, created_at) VALUES (?1, ?2, ?3);",
            params![
                id_text.as_str(),
                melody.title.as_str(),
                melody.created_at.timestamp_millis()
            ],
        )?;

        {
            let mut insert_note = tx.prepare(
                "INSERT INTO melody_notes (melody_uuid, position, note) VALUES (?1, ?2, ?3);",
            )?;
            for (position, note) in melody.notes.iter().enumerate() {
                insert_note.execute(params![id_text.as_str(), position as i64, note.as_str()])?;
            }
        }

        tx.commit()?;
        Ok(melody.id)
    }

    fn get_melody(&self, id: MelodyId) -> RepoResult<Option<Melody>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MELODY_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.load_melody(row)?));
        }

        Ok(None)
    }

    fn list_melodies(&self) -> RepoResult<Vec<Melody>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MELODY_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut melodies = Vec::new();
        while let Some(row) = rows.next()? {
            melodies.push(self.load_melody(row)?);
        }

        Ok(melodies)
    }
}

impl SqliteMelodyRepository<'_> {
    fn load_melody(&self, row: &Row<'_>) -> RepoResult<Melody> {
        let uuid_text: String = row.get("uuid")?;
        let id = Uuid::parse_str(&uuid_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in melodies.uuid"))
        })?;

        let created_ms: i64 = row.get("created_at")?;
        let created_at = parse_timestamp(created_ms)?;
        let notes = self.load_notes(uuid_text.as_str())?;
        if notes.is_empty() {
            return Err(RepoError::InvalidData(format!(
                "melody `{uuid_text}` has no notes"
            )));
        }

        Ok(Melody {
            id,
            title: row.get("title")?,
            notes,
            created_at,
        })
    }

    fn load_notes(&self, melody_uuid: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT note FROM melody_notes WHERE melody_uuid = ?1 ORDER BY position ASC;",
        )?;
        let notes = stmt
            .query_map([melody_uuid], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}

/// Converts stored epoch milliseconds back to a UTC timestamp.
fn parse_timestamp(value: i64) -> RepoResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single().ok_or_else(|| {
        RepoError::InvalidData(format!("invalid created_at value `{value}` in melodies"))
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
