//! Terminal piano: plays notes, records melodies and talks to the melody service.

pub mod store_client;
pub mod terminal;

pub use store_client::{HttpMelodyStore, DEFAULT_API_URL};
pub use terminal::{parse_command, Command, Terminal};
