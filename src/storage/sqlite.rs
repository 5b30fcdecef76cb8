//! SQLite program store
//!
//! Uses a `Mutex` around a single connection; each batch runs in its own
//! transaction so a failing operation rolls back the whole batch. Every
//! statement runs on tokio's blocking pool so slow disks never stall the
//! runtime's worker threads.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, Row, Transaction};

use super::error::{StoreError, StoreResult};
use super::ProgramStore;
use crate::models::{EpochMillis, Program, ProgramOperation};

const SELECT_COLUMNS: &str = "id, channel_id, title, description, episode_title, season_number, \
     episode_number, start_time_ms, end_time_ms, content_ratings, genres, poster_uri, provider_data";

/// SQLite implementation of [`ProgramStore`]
pub struct SqliteProgramStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProgramStore {
    /// Open (or create) a store at `path`
    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite program store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS programs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    channel_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    episode_title TEXT,
                    season_number INTEGER,
                    episode_number INTEGER,
                    start_time_ms INTEGER NOT NULL,
                    end_time_ms INTEGER NOT NULL,
                    content_ratings TEXT NOT NULL DEFAULT '[]',
                    genres TEXT NOT NULL DEFAULT '[]',
                    poster_uri TEXT,
                    provider_data TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_programs_channel_start
                    ON programs(channel_id, start_time_ms);

                CREATE INDEX IF NOT EXISTS idx_programs_end
                    ON programs(end_time_ms);
                "#,
        )?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking thread pool
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock()?;
            f(&mut conn)
        })
        .await?
    }

    fn apply_op(tx: &Transaction<'_>, op: &ProgramOperation) -> StoreResult<()> {
        match op {
            ProgramOperation::Insert(p) => {
                tx.execute(
                    "INSERT INTO programs (channel_id, title, description, episode_title, \
                     season_number, episode_number, start_time_ms, end_time_ms, content_ratings, \
                     genres, poster_uri, provider_data) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        p.channel_id,
                        p.title,
                        p.description,
                        p.episode_title,
                        p.season_number,
                        p.episode_number,
                        p.start_time_ms,
                        p.end_time_ms,
                        serde_json::to_string(&p.content_ratings)?,
                        serde_json::to_string(&p.genres)?,
                        p.poster_uri,
                        p.provider_data,
                    ],
                )?;
            }
            ProgramOperation::Update { id, program: p } => {
                let changed = tx.execute(
                    "UPDATE programs SET channel_id = ?1, title = ?2, description = ?3, \
                     episode_title = ?4, season_number = ?5, episode_number = ?6, \
                     start_time_ms = ?7, end_time_ms = ?8, content_ratings = ?9, genres = ?10, \
                     poster_uri = ?11, provider_data = ?12 WHERE id = ?13",
                    params![
                        p.channel_id,
                        p.title,
                        p.description,
                        p.episode_title,
                        p.season_number,
                        p.episode_number,
                        p.start_time_ms,
                        p.end_time_ms,
                        serde_json::to_string(&p.content_ratings)?,
                        serde_json::to_string(&p.genres)?,
                        p.poster_uri,
                        p.provider_data,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(StoreError::write(format!("no program with id {id}")));
                }
            }
            ProgramOperation::Delete { id } => {
                let changed = tx.execute("DELETE FROM programs WHERE id = ?1", params![id])?;
                if changed == 0 {
                    return Err(StoreError::write(format!("no program with id {id}")));
                }
            }
        }
        Ok(())
    }
}

/// Raw row before the JSON list columns are decoded
struct ProgramRow {
    program: Program,
    content_ratings: String,
    genres: String,
}

impl ProgramRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            program: Program {
                id: Some(row.get(0)?),
                channel_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                episode_title: row.get(4)?,
                season_number: row.get(5)?,
                episode_number: row.get(6)?,
                start_time_ms: row.get(7)?,
                end_time_ms: row.get(8)?,
                content_ratings: Vec::new(),
                genres: Vec::new(),
                poster_uri: row.get(11)?,
                provider_data: row.get(12)?,
            },
            content_ratings: row.get(9)?,
            genres: row.get(10)?,
        })
    }

    fn into_program(self) -> StoreResult<Program> {
        Ok(Program {
            content_ratings: serde_json::from_str(&self.content_ratings)?,
            genres: serde_json::from_str(&self.genres)?,
            ..self.program
        })
    }
}

#[async_trait]
impl ProgramStore for SqliteProgramStore {
    async fn query_persisted_programs(&self, channel_id: i64) -> StoreResult<Vec<Program>> {
        self.with_conn(move |conn| {
            let query = format!(
                "SELECT {SELECT_COLUMNS} FROM programs WHERE channel_id = ?1 \
                 ORDER BY start_time_ms ASC, id ASC"
            );
            let mut stmt = conn.prepare(&query)?;

            let rows = stmt
                .query_map(params![channel_id], ProgramRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| StoreError::read(channel_id, e.to_string()))?;

            rows.into_iter().map(ProgramRow::into_program).collect()
        })
        .await
    }

    async fn apply_batch(&self, ops: &[ProgramOperation]) -> StoreResult<()> {
        let ops = ops.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            for op in &ops {
                Self::apply_op(&tx, op).map_err(|e| match e {
                    StoreError::Write { .. } => e,
                    other => StoreError::write(other.to_string()),
                })?;
            }

            tx.commit()
                .map_err(|e| StoreError::write(format!("commit failed: {e}")))?;
            tracing::trace!(ops = ops.len(), "Applied program batch");
            Ok(())
        })
        .await
    }

    async fn purge_ended_before(&self, cutoff: EpochMillis) -> StoreResult<usize> {
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM programs WHERE end_time_ms <= ?1",
                params![cutoff],
            )?;
            tracing::debug!(cutoff, removed, "Purged expired programs");
            Ok(removed)
        })
        .await
    }
}
