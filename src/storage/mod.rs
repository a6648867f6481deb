//! Storage layer.
//!
//! - [`prompt`]: the version ledger backends behind [`PromptStore`]
//! - [`sqlite`]: connection setup shared by `SQLite` backends

// Dropping database connections slightly early provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

mod metrics;
pub mod prompt;
pub mod sqlite;

pub use metrics::record_operation_metrics;
pub use prompt::{
    Atomicity, MemoryPromptStore, PromptStore, PromptStoreFactory, SqlitePromptStore, StoreMode,
};
#[cfg(feature = "postgres")]
pub use prompt::PostgresPromptStore;
