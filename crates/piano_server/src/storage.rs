//! Shared storage handle for request handlers.
//!
//! # Invariants
//! - One SQLite connection per process, guarded by a mutex.
//! - A failed open is retried by the next request instead of stopping the
//!   process.
//! - Request handlers reach SQLite through `run`, on the blocking pool.

use log::{error, info};
use parking_lot::Mutex;
use piano_core::db::{open_db_at, DbError};
use piano_core::{MelodyService, MelodyServiceError, SqliteMelodyRepository};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failure of a storage-backed request.
#[derive(Debug)]
pub enum StorageError {
    /// The database could not be opened.
    Unavailable(DbError),
    /// The use-case itself failed.
    Service(MelodyServiceError),
    /// The blocking task running the use-case did not complete.
    Worker(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Worker(message) => write!(f, "storage worker failed: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Worker(_) => None,
        }
    }
}

impl From<MelodyServiceError> for StorageError {
    fn from(value: MelodyServiceError) -> Self {
        Self::Service(value)
    }
}

pub struct MelodyStorage {
    location: String,
    conn: Mutex<Option<Connection>>,
}

impl MelodyStorage {
    /// Creates a handle; nothing is opened until `connect` or the first request.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            conn: Mutex::new(None),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Opens the database if it is not open yet.
    pub fn connect(&self) -> Result<(), StorageError> {
        let mut guard = self.conn.lock();
        Self::ensure_open(&mut guard, &self.location).map(|_| ())
    }

    /// Runs `f` against a melody service bound to the shared connection.
    pub fn with_service<T>(
        &self,
        f: impl FnOnce(
            &mut MelodyService<SqliteMelodyRepository<'_>>,
        ) -> Result<T, MelodyServiceError>,
    ) -> Result<T, StorageError> {
        let mut guard = self.conn.lock();
        let conn = Self::ensure_open(&mut guard, &self.location)?;
        let repo = SqliteMelodyRepository::try_new(conn)
            .map_err(|err| StorageError::Service(err.into()))?;
        let mut service = MelodyService::new(repo);
        Ok(f(&mut service)?)
    }

    /// Runs [`Self::with_service`] on tokio's blocking pool.
    pub async fn run<T, F>(self: &Arc<Self>, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut MelodyService<SqliteMelodyRepository<'_>>) -> Result<T, MelodyServiceError>
            + Send
            + 'static,
    {
        let storage = Arc::clone(self);
        tokio::task::spawn_blocking(move || storage.with_service(f))
            .await
            .map_err(|err| {
                error!("event=storage_run module=server status=error error={err}");
                StorageError::Worker(err.to_string())
            })?
    }

    fn ensure_open<'a>(
        slot: &'a mut Option<Connection>,
        location: &str,
    ) -> Result<&'a mut Connection, StorageError> {
        let conn = match slot.take() {
            Some(conn) => conn,
            None => match open_db_at(location) {
                Ok(conn) => {
                    info!("event=storage_connect module=server status=ok location={location}");
                    conn
                }
                Err(err) => {
                    error!(
                        "event=storage_connect module=server status=error location={location} error={err}"
                    );
                    return Err(StorageError::Unavailable(err));
                }
            },
        };
        Ok(slot.insert(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::{MelodyStorage, StorageError};
    use piano_core::MelodyServiceError;
    use std::sync::Arc;

    #[tokio::test]
    async fn run_uses_a_blocking_thread() {
        let storage = Arc::new(MelodyStorage::new(":memory:"));
        let caller = std::thread::current().id();

        let worker = storage
            .run(|_service| Ok(std::thread::current().id()))
            .await
            .unwrap();

        assert_ne!(worker, caller);
        assert!(storage.is_connected());
    }

    #[tokio::test]
    async fn run_passes_service_errors_through() {
        let storage = Arc::new(MelodyStorage::new(":memory:"));
        let err = storage
            .run(|service| service.get_melody(uuid::Uuid::nil()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Service(MelodyServiceError::NotFound(_))
        ));
    }
}
