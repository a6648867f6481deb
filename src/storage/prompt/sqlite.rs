//! SQLite-based prompt store.
//!
//! Prompts live in the `prompts` table; their history lives in
//! `prompt_versions`, keyed by `(prompt_id, version)`. Timestamps are stored
//! as Unix microseconds.

use super::{Atomicity, PromptStore, StoreMode};
use crate::models::{GenerationConfig, Prompt, PromptId, PromptSummary, Version, VersionSummary};
use crate::storage::sqlite::{acquire_lock, configure_connection};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS prompts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        model TEXT NOT NULL,
        config TEXT NOT NULL DEFAULT '{}',
        examples TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS prompt_versions (
        prompt_id TEXT NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
        version INTEGER NOT NULL CHECK (version >= 1),
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        PRIMARY KEY (prompt_id, version)
    );
    CREATE INDEX IF NOT EXISTS idx_prompts_created_at ON prompts(created_at DESC);
";

/// `SQLite`-based prompt store.
pub struct SqlitePromptStore {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the `SQLite` database.
    db_path: PathBuf,
    /// Write prompt and versions in one transaction.
    atomic_writes: bool,
}

/// A `prompts` row as stored.
struct PromptRow {
    id: String,
    title: String,
    content: String,
    tags: String,
    model: String,
    config: String,
    examples: String,
    created_at: i64,
}

impl PromptRow {
    const COLUMNS: &'static str = "id, title, content, tags, model, config, examples, created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags: row.get(3)?,
            model: row.get(4)?,
            config: row.get(5)?,
            examples: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl SqlitePromptStore {
    /// Creates a new `SQLite` prompt store.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the `SQLite` database file
    /// * `atomic_writes` - Whether creates run inside a single transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>, atomic_writes: bool) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::operation("create_prompt_dir", e))?;
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::operation("open_prompt_db", e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
            atomic_writes,
        };

        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory `SQLite` store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory(atomic_writes: bool) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::operation("open_prompt_db_memory", e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
            atomic_writes,
        };

        store.initialize()?;
        Ok(store)
    }

    /// Returns the default database path.
    ///
    /// `<platform data dir>/promptops/prompts.db`, e.g.
    /// `~/.local/share/promptops/prompts.db` on Linux.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.data_dir().join("promptops").join("prompts.db"))
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Initializes the database schema.
    fn initialize(&self) -> Result<()> {
        let conn = self.lock_conn();
        configure_connection(&conn)?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::operation("create_prompt_tables", e))?;
        Ok(())
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        acquire_lock(&self.conn)
    }

    fn insert_prompt_row(conn: &Connection, prompt: &Prompt) -> Result<()> {
        let tags = serde_json::to_string(&prompt.tags)
            .map_err(|e| Error::operation("serialize_tags", e))?;
        let config = serde_json::to_string(&prompt.config)
            .map_err(|e| Error::operation("serialize_config", e))?;
        let examples = serde_json::to_string(&prompt.examples)
            .map_err(|e| Error::operation("serialize_examples", e))?;

        conn.execute(
            "INSERT INTO prompts (id, title, content, tags, model, config, examples, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                prompt.id.as_str(),
                prompt.title,
                prompt.content,
                tags,
                prompt.model,
                config,
                examples,
                prompt.created_at.timestamp_micros(),
            ],
        )
        .map_err(|e| Error::operation("insert_prompt", e))?;

        Ok(())
    }

    fn insert_version_rows(conn: &Connection, prompt: &Prompt) -> Result<()> {
        let mut stmt = conn
            .prepare(
                "INSERT INTO prompt_versions (prompt_id, version, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| Error::operation("prepare_insert_version", e))?;

        for version in &prompt.versions {
            stmt.execute(params![
                prompt.id.as_str(),
                version.version,
                version.content,
                version.created_at.timestamp_micros(),
            ])
            .map_err(|e| Error::operation("insert_prompt_version", e))?;
        }

        Ok(())
    }

    fn version_summaries(conn: &Connection) -> Result<HashMap<String, Vec<VersionSummary>>> {
        let mut stmt = conn
            .prepare(
                "SELECT prompt_id, version, created_at FROM prompt_versions
                 ORDER BY prompt_id, version ASC",
            )
            .map_err(|e| Error::operation("prepare_list_versions", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| Error::operation("list_versions", e))?;

        let mut by_prompt: HashMap<String, Vec<VersionSummary>> = HashMap::new();
        for row in rows {
            let (prompt_id, version, created_at) =
                row.map_err(|e| Error::operation("read_version_row", e))?;
            by_prompt
                .entry(prompt_id)
                .or_default()
                .push(VersionSummary {
                    version,
                    created_at: from_micros(created_at)?,
                });
        }

        Ok(by_prompt)
    }

    fn versions_for(conn: &Connection, id: &str) -> Result<Vec<Version>> {
        let mut stmt = conn
            .prepare(
                "SELECT version, content, created_at FROM prompt_versions
                 WHERE prompt_id = ?1 ORDER BY version ASC",
            )
            .map_err(|e| Error::operation("prepare_get_versions", e))?;

        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| Error::operation("get_versions", e))?;

        let mut versions = Vec::new();
        for row in rows {
            let (version, content, created_at) =
                row.map_err(|e| Error::operation("read_version_row", e))?;
            versions.push(Version {
                version,
                content,
                created_at: from_micros(created_at)?,
            });
        }

        Ok(versions)
    }
}

fn decode_json<T: DeserializeOwned>(column: &'static str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::operation(format!("decode_{column}"), e))
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::operation("decode_timestamp", format!("out of range: {micros}")))
}

impl PromptStore for SqlitePromptStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn mode(&self) -> StoreMode {
        StoreMode::ExternalStore
    }

    fn atomicity(&self) -> Atomicity {
        if self.atomic_writes {
            Atomicity::Transactional
        } else {
            Atomicity::BestEffort
        }
    }

    fn create_prompt_with_version(&self, prompt: &Prompt) -> Result<PromptId> {
        let mut conn = self.lock_conn();

        if self.atomic_writes {
            let tx = conn
                .transaction()
                .map_err(|e| Error::operation("begin_create_prompt", e))?;
            Self::insert_prompt_row(&tx, prompt)?;
            Self::insert_version_rows(&tx, prompt)?;
            tx.commit()
                .map_err(|e| Error::operation("commit_create_prompt", e))?;
        } else {
            Self::insert_prompt_row(&conn, prompt)?;
            Self::insert_version_rows(&conn, prompt)?;
        }

        Ok(prompt.id.clone())
    }

    fn list(&self) -> Result<Vec<PromptSummary>> {
        let conn = self.lock_conn();

        let mut versions = Self::version_summaries(&conn)?;

        let sql = format!(
            "SELECT {} FROM prompts ORDER BY created_at DESC, rowid DESC",
            PromptRow::COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::operation("prepare_list_prompts", e))?;
        let rows = stmt
            .query_map([], PromptRow::from_row)
            .map_err(|e| Error::operation("list_prompts", e))?;

        let mut summaries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| Error::operation("read_prompt_row", e))?;
            summaries.push(PromptSummary {
                versions: versions.remove(&row.id).unwrap_or_default(),
                created_at: from_micros(row.created_at)?,
                tags: decode_json("tags", &row.tags)?,
                id: PromptId::new(row.id),
                title: row.title,
                content: row.content,
                model: row.model,
            });
        }

        Ok(summaries)
    }

    fn get(&self, id: &PromptId) -> Result<Option<Prompt>> {
        let conn = self.lock_conn();

        let sql = format!("SELECT {} FROM prompts WHERE id = ?1", PromptRow::COLUMNS);
        let row = conn
            .query_row(&sql, params![id.as_str()], PromptRow::from_row)
            .optional()
            .map_err(|e| Error::operation("get_prompt", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let versions = Self::versions_for(&conn, &row.id)?;
        let config: GenerationConfig = decode_json("config", &row.config)?;

        Ok(Some(Prompt {
            versions,
            config,
            created_at: from_micros(row.created_at)?,
            tags: decode_json("tags", &row.tags)?,
            examples: decode_json("examples", &row.examples)?,
            id: PromptId::new(row.id),
            title: row.title,
            content: row.content,
            model: row.model,
        }))
    }
}
