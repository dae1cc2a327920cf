//! Melody REST service.
//!
//! Exposes list/create/get-by-id over the melodies stored by `piano_core`.

pub mod config;
pub mod routes;
pub mod storage;

pub use config::ServerConfig;
pub use routes::router;
pub use storage::{MelodyStorage, StorageError};
