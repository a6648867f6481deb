//! PostgreSQL-based prompt store.
//!
//! Uses a `deadpool-postgres` pool driven on a dedicated Tokio runtime so the
//! synchronous [`PromptStore`] trait can be served from blocking threads.
//! Includes embedded migrations that auto-upgrade the schema on startup.

use super::{Atomicity, PromptStore, StoreMode};
use crate::models::{GenerationConfig, Prompt, PromptId, PromptSummary, Version, VersionSummary};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, GenericClient, ManagerConfig, Pool, RecyclingMethod, Runtime};
use std::collections::HashMap;
use std::future::Future;
use tokio::runtime::Runtime as TokioRuntime;
use tokio_postgres::NoTls;

/// A single migration with version and SQL.
struct Migration {
    /// Migration version (sequential, starting at 1).
    version: i32,
    /// Human-readable description.
    description: &'static str,
    /// SQL to apply (may contain multiple statements separated by semicolons).
    sql: &'static str,
}

/// Embedded migrations compiled into the binary.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Prompts and prompt versions",
    sql: r"
        CREATE TABLE IF NOT EXISTS prompts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            tags TEXT[] NOT NULL DEFAULT '{}',
            model TEXT NOT NULL,
            config JSONB NOT NULL DEFAULT '{}'::jsonb,
            examples TEXT[] NOT NULL DEFAULT '{}',
            created_at BIGINT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS prompt_versions (
            prompt_id TEXT NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
            version INTEGER NOT NULL CHECK (version >= 1),
            content TEXT NOT NULL,
            created_at BIGINT NOT NULL,
            PRIMARY KEY (prompt_id, version)
        );
        CREATE INDEX IF NOT EXISTS idx_prompts_created_at ON prompts(created_at DESC)
    ",
}];

const MIGRATIONS_TABLE: &str = "promptops_schema_migrations";

/// PostgreSQL-based prompt store with auto-migration support.
pub struct PostgresPromptStore {
    /// Connection pool.
    pool: Pool,
    /// Tokio runtime for blocking operations; taken on drop.
    runtime: Option<TokioRuntime>,
    /// Write prompt and versions in one transaction.
    atomic_writes: bool,
}

impl PostgresPromptStore {
    /// Creates a new PostgreSQL prompt store.
    ///
    /// Automatically runs any pending migrations on startup. Must be called
    /// outside of an async context.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created or migrations fail.
    pub fn new(connection_url: &str, atomic_writes: bool) -> Result<Self> {
        let runtime = TokioRuntime::new().map_err(|e| Error::operation("create_tokio_runtime", e))?;

        let mut cfg = Config::new();
        cfg.url = Some(connection_url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| Error::operation("create_postgres_pool", e))?;

        let store = Self {
            pool,
            runtime: Some(runtime),
            atomic_writes,
        };

        store.run_migrations()?;
        Ok(store)
    }

    /// Drives a future to completion on the store's runtime.
    fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| Error::operation("postgres_runtime", "runtime already shut down"))?;
        Ok(runtime.block_on(future))
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::operation("get_postgres_connection", e))
    }

    /// Runs all pending migrations.
    fn run_migrations(&self) -> Result<()> {
        self.block_on(async {
            let client = self.client().await?;

            let create_sql = format!(
                "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
                    version INTEGER PRIMARY KEY,
                    description TEXT NOT NULL,
                    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )"
            );
            client
                .execute(create_sql.as_str(), &[])
                .await
                .map_err(|e| Error::operation("create_migrations_table", e))?;

            let version_sql = format!("SELECT COALESCE(MAX(version), 0) FROM {MIGRATIONS_TABLE}");
            let current: i32 = client
                .query_one(version_sql.as_str(), &[])
                .await
                .map(|row| row.get(0))
                .map_err(|e| Error::operation("read_schema_version", e))?;

            let record_sql =
                format!("INSERT INTO {MIGRATIONS_TABLE} (version, description) VALUES ($1, $2)");
            for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
                for statement in migration.sql.split(';') {
                    let statement = statement.trim();
                    if statement.is_empty() {
                        continue;
                    }
                    client.execute(statement, &[]).await.map_err(|e| {
                        Error::operation(
                            format!("migration_v{}: {}", migration.version, migration.description),
                            e,
                        )
                    })?;
                }

                client
                    .execute(
                        record_sql.as_str(),
                        &[&migration.version, &migration.description],
                    )
                    .await
                    .map_err(|e| Error::operation("record_migration", e))?;

                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "Applied migration"
                );
            }

            Ok(())
        })?
    }

    async fn insert_prompt_row<C: GenericClient + Sync>(client: &C, prompt: &Prompt) -> Result<()> {
        let config = serde_json::to_value(prompt.config)
            .map_err(|e| Error::operation("serialize_config", e))?;

        client
            .execute(
                "INSERT INTO prompts (id, title, content, tags, model, config, examples, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &prompt.id.as_str(),
                    &prompt.title,
                    &prompt.content,
                    &prompt.tags,
                    &prompt.model,
                    &config,
                    &prompt.examples,
                    &prompt.created_at.timestamp_micros(),
                ],
            )
            .await
            .map_err(|e| Error::operation("insert_prompt", e))?;

        Ok(())
    }

    async fn insert_version_rows<C: GenericClient + Sync>(
        client: &C,
        prompt: &Prompt,
    ) -> Result<()> {
        for version in &prompt.versions {
            let number = i32::try_from(version.version)
                .map_err(|e| Error::operation("encode_version", e))?;
            client
                .execute(
                    "INSERT INTO prompt_versions (prompt_id, version, content, created_at)
                     VALUES ($1, $2, $3, $4)",
                    &[
                        &prompt.id.as_str(),
                        &number,
                        &version.content,
                        &version.created_at.timestamp_micros(),
                    ],
                )
                .await
                .map_err(|e| Error::operation("insert_prompt_version", e))?;
        }

        Ok(())
    }
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::operation("decode_timestamp", format!("out of range: {micros}")))
}

#[allow(clippy::cast_sign_loss)]
fn decode_version(number: i32) -> u32 {
    number.max(0) as u32
}

impl PromptStore for PostgresPromptStore {
    fn backend_name(&self) -> &'static str {
        "postgresql"
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
        self.block_on(async {
            let mut client = self.client().await?;

            if self.atomic_writes {
                let tx = client
                    .transaction()
                    .await
                    .map_err(|e| Error::operation("begin_create_prompt", e))?;
                Self::insert_prompt_row(&tx, prompt).await?;
                Self::insert_version_rows(&tx, prompt).await?;
                tx.commit()
                    .await
                    .map_err(|e| Error::operation("commit_create_prompt", e))?;
            } else {
                Self::insert_prompt_row(&*client, prompt).await?;
                Self::insert_version_rows(&*client, prompt).await?;
            }

            Ok(prompt.id.clone())
        })?
    }

    fn list(&self) -> Result<Vec<PromptSummary>> {
        self.block_on(async {
            let client = self.client().await?;

            let version_rows = client
                .query(
                    "SELECT prompt_id, version, created_at FROM prompt_versions
                     ORDER BY prompt_id, version ASC",
                    &[],
                )
                .await
                .map_err(|e| Error::operation("list_versions", e))?;

            let mut versions: HashMap<String, Vec<VersionSummary>> = HashMap::new();
            for row in version_rows {
                versions
                    .entry(row.get(0))
                    .or_default()
                    .push(VersionSummary {
                        version: decode_version(row.get(1)),
                        created_at: from_micros(row.get(2))?,
                    });
            }

            let rows = client
                .query(
                    "SELECT id, title, content, tags, model, created_at FROM prompts
                     ORDER BY created_at DESC, ctid DESC",
                    &[],
                )
                .await
                .map_err(|e| Error::operation("list_prompts", e))?;

            rows.into_iter()
                .map(|row| {
                    let id: String = row.get(0);
                    Ok(PromptSummary {
                        versions: versions.remove(&id).unwrap_or_default(),
                        id: PromptId::new(id),
                        title: row.get(1),
                        content: row.get(2),
                        tags: row.get(3),
                        model: row.get(4),
                        created_at: from_micros(row.get(5))?,
                    })
                })
                .collect()
        })?
    }

    fn get(&self, id: &PromptId) -> Result<Option<Prompt>> {
        self.block_on(async {
            let client = self.client().await?;

            let row = client
                .query_opt(
                    "SELECT id, title, content, tags, model, config, examples, created_at
                     FROM prompts WHERE id = $1",
                    &[&id.as_str()],
                )
                .await
                .map_err(|e| Error::operation("get_prompt", e))?;

            let Some(row) = row else {
                return Ok(None);
            };

            let version_rows = client
                .query(
                    "SELECT version, content, created_at FROM prompt_versions
                     WHERE prompt_id = $1 ORDER BY version ASC",
                    &[&id.as_str()],
                )
                .await
                .map_err(|e| Error::operation("get_versions", e))?;

            let versions = version_rows
                .into_iter()
                .map(|v| {
                    Ok(Version {
                        version: decode_version(v.get(0)),
                        content: v.get(1),
                        created_at: from_micros(v.get(2))?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let config: GenerationConfig =
                serde_json::from_value(row.get::<_, serde_json::Value>(5))
                    .map_err(|e| Error::operation("decode_config", e))?;

            Ok(Some(Prompt {
                id: PromptId::new(row.get::<_, String>(0)),
                title: row.get(1),
                content: row.get(2),
                tags: row.get(3),
                model: row.get(4),
                config,
                examples: row.get(6),
                versions,
                created_at: from_micros(row.get(7))?,
            }))
        })?
    }
}

impl Drop for PostgresPromptStore {
    fn drop(&mut self) {
        // The last handle may be released on an async worker, where a
        // blocking runtime shutdown panics.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
