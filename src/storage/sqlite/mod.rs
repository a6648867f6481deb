//! Shared `SQLite` infrastructure for store backends.

mod connection;

pub use connection::{acquire_lock, configure_connection};
