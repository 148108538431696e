//! SQLite-backed [`Store`]: the durable home for memories, relations, agents, and
//! extraction audit logs, plus the keyword (FTS5) and vector index facades.
//!
//! Grounded on the teacher's `storage::sqlite::Storage`: separate reader/writer
//! connections behind their own `Mutex`es so `Store` is `Send + Sync` and callers
//! hold `Arc<Store>` rather than `Arc<Mutex<Store>>`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{CortexError, Result};
use crate::externals::VectorBackend;
use crate::model::{new_id, Category, Layer, Memory, NewMemory, NewRelation, Relation};

use super::keyword::sanitize_fts5_query;
use super::migrations::apply_migrations;

/// Filter used by [`Store::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub agent_id: Option<String>,
    pub layer: Option<Layer>,
    pub category: Option<Category>,
    /// When `false` (default), superseded rows are excluded.
    pub include_superseded: bool,
}

/// Atomic field update for [`Store::update`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub importance: Option<f64>,
    pub confidence: Option<f64>,
    pub decay_score: Option<f64>,
    pub layer: Option<Layer>,
    pub is_pinned: Option<bool>,
    pub superseded_by: Option<Option<String>>,
    pub metadata: Option<serde_json::Value>,
    pub access_count_delta: Option<u64>,
}

pub struct Store {
    writer: StdMutex<Connection>,
    reader: StdMutex<Connection>,
    vector: Arc<dyn VectorBackend>,
    agent_locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl Store {
    fn configure_connection(conn: &Connection, wal_mode: bool) -> Result<()> {
        if wal_mode {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
        } else {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        }
        Ok(())
    }

    pub fn new(db_path: Option<PathBuf>, wal_mode: bool, vector: Arc<dyn VectorBackend>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("dev", "cortex", "cortex").ok_or_else(|| {
                    CortexError::fatal("could not determine project data directory")
                })?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("cortex.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn, wal_mode)?;
        apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn, wal_mode)?;

        Ok(Self {
            writer: StdMutex::new(writer_conn),
            reader: StdMutex::new(reader_conn),
            vector,
            agent_locks: StdMutex::new(HashMap::new()),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory(vector: Arc<dyn VectorBackend>) -> Result<Self> {
        use rusqlite::OpenFlags;
        // A plain `:memory:` connection is private to its own connection handle;
        // the reader must see the writer's data, so both open the same named
        // in-memory database via a shared-cache URI instead.
        let uri = format!("file:cortex-test-{}?mode=memory&cache=shared", new_id());
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI;

        let writer_conn = Connection::open_with_flags(&uri, flags)?;
        Self::configure_connection(&writer_conn, false)?;
        apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open_with_flags(&uri, flags)?;
        Self::configure_connection(&reader_conn, false)?;

        Ok(Self {
            writer: StdMutex::new(writer_conn),
            reader: StdMutex::new(reader_conn),
            vector,
            agent_locks: StdMutex::new(HashMap::new()),
        })
    }

    /// Per-agent coarse-grained lock for ingest backpressure (§5). Lazily populated,
    /// matching the teacher's `Mutex<HashMap<String, Arc<...>>>` session table.
    pub fn lock_agent(&self, agent_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.agent_locks.lock().expect("agent lock table poisoned");
        locks
            .entry(agent_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    // -- CRUD -----------------------------------------------------------------

    pub fn insert(&self, spec: NewMemory) -> Result<Memory> {
        let memory = build_memory(spec)?;
        let writer = self.writer.lock().expect("writer lock poisoned");
        insert_row(&writer, &memory)?;
        Ok(memory)
    }

    /// Inserts `spec` and marks `supersede_id` as superseded by it in one
    /// transaction (§4.3 step 7, §5 "insert-new + supersede-old must be atomic").
    pub fn insert_and_supersede(&self, spec: NewMemory, supersede_id: &str) -> Result<Memory> {
        let memory = build_memory(spec)?;
        let mut writer = self.writer.lock().expect("writer lock poisoned");
        let tx = writer.transaction()?;
        insert_row(&tx, &memory)?;
        tx.execute(
            "UPDATE memories SET superseded_by = ?1, updated_at = ?2 WHERE id = ?3",
            params![memory.id, Utc::now().to_rfc3339(), supersede_id],
        )?;
        tx.commit()?;
        Ok(memory)
    }

    pub fn get(&self, id: &str) -> Result<Option<Memory>> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        reader
            .query_row("SELECT * FROM memories WHERE id = ?1", params![id], row_to_memory)
            .optional()
            .map_err(CortexError::from)
    }

    pub fn update(&self, id: &str, patch: MemoryPatch) -> Result<Memory> {
        let writer = self.writer.lock().expect("writer lock poisoned");
        let mut memory: Memory = writer
            .query_row("SELECT * FROM memories WHERE id = ?1", params![id], row_to_memory)
            .optional()?
            .ok_or_else(|| CortexError::invariant(format!("memory not found: {id}")))?;

        if let Some(c) = patch.content {
            memory.content = c;
        }
        if let Some(v) = patch.importance {
            memory.importance = v.clamp(0.0, 1.0);
        }
        if let Some(v) = patch.confidence {
            memory.confidence = v.clamp(0.0, 1.0);
        }
        if let Some(v) = patch.decay_score {
            memory.decay_score = v.clamp(0.0, 1.0);
        }
        if let Some(layer) = patch.layer {
            memory.layer = layer;
            memory.expires_at = match layer {
                Layer::Working => Some(memory.expires_at.unwrap_or(Utc::now() + chrono::Duration::hours(48))),
                _ => None,
            };
        }
        if let Some(v) = patch.is_pinned {
            memory.is_pinned = v;
        }
        if let Some(v) = patch.superseded_by {
            memory.superseded_by = v;
        }
        if let Some(v) = patch.metadata {
            memory.metadata = v;
        }
        if let Some(delta) = patch.access_count_delta {
            memory.access_count += delta;
        }
        memory.updated_at = Utc::now();
        memory.check_invariants()?;

        update_row(&writer, &memory)?;
        Ok(memory)
    }

    /// Narrow write used by the lifecycle engine's decay phase: recomputes
    /// `decay_score` without stamping `updated_at`. That field anchors the
    /// archival/compression age-floor checks, and decay runs on nearly every
    /// live memory every tick. Routing it through [`Store::update`] would reset
    /// those floors continuously and they would never trip.
    pub fn update_decay_score(&self, id: &str, decay_score: f64) -> Result<()> {
        let writer = self.writer.lock().expect("writer lock poisoned");
        writer.execute(
            "UPDATE memories SET decay_score = ?1 WHERE id = ?2",
            params![decay_score.clamp(0.0, 1.0), id],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let writer = self.writer.lock().expect("writer lock poisoned");
        writer.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        drop(writer);
        self.vector.delete(&[id.to_string()])?;
        Ok(())
    }

    pub fn list(&self, filter: ListFilter, limit: usize, offset: usize) -> Result<Vec<Memory>> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        let mut sql = "SELECT * FROM memories WHERE 1 = 1".to_string();
        let mut binds: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(agent_id) = &filter.agent_id {
            sql.push_str(" AND agent_id = ?");
            binds.push(Box::new(agent_id.clone()));
        }
        if let Some(layer) = filter.layer {
            sql.push_str(" AND layer = ?");
            binds.push(Box::new(layer.to_string()));
        }
        if let Some(category) = filter.category {
            sql.push_str(" AND category = ?");
            binds.push(Box::new(category.to_string()));
        }
        if !filter.include_superseded {
            sql.push_str(" AND superseded_by IS NULL");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");
        binds.push(Box::new(limit as i64));
        binds.push(Box::new(offset as i64));

        let mut stmt = reader.prepare(&sql)?;
        let params_ref: Vec<&dyn rusqlite::ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(params_ref.as_slice(), row_to_memory)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // -- Keyword search ---------------------------------------------------------

    pub fn keyword_search(&self, agent_id: &str, query: &str, k: usize) -> Result<Vec<(String, f64)>> {
        let sanitized = sanitize_fts5_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let reader = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = reader.prepare(
            "SELECT m.id, bm25(memories_fts) AS score
             FROM memories_fts
             JOIN memories m ON m.rowid = memories_fts.rowid
             WHERE memories_fts MATCH ?1
               AND m.agent_id = ?2
               AND m.superseded_by IS NULL
             ORDER BY score
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![sanitized, agent_id, k as i64], |row| {
            let id: String = row.get(0)?;
            // bm25() in SQLite FTS5 returns lower-is-better; negate so higher = more relevant.
            let raw_score: f64 = row.get(1)?;
            Ok((id, -raw_score))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // -- Vector index -------------------------------------------------------

    pub fn vector_upsert(&self, id: &str, vector: &[f32]) -> Result<()> {
        self.vector.upsert(id, vector)
    }

    /// `vectorSearch` is a Store-level responsibility per §4.1's key contract: the
    /// backend alone knows nothing about `agent_id` or supersede state, so results
    /// are overfetched and filtered here against live rows for the requested agent.
    pub fn vector_search(&self, agent_id: &str, vector: &[f32], k: usize) -> Result<Vec<(String, f64)>> {
        let overfetch = (k * 4).max(k + 10);
        let raw = self.vector.search(vector, overfetch)?;
        let mut out = Vec::with_capacity(k);
        for (id, distance) in raw {
            if out.len() >= k {
                break;
            }
            match self.get(&id)? {
                Some(m) if m.is_live() && m.agent_id == agent_id => out.push((id, distance)),
                _ => continue,
            }
        }
        Ok(out)
    }

    pub fn vector_delete(&self, ids: &[String]) -> Result<()> {
        self.vector.delete(ids)
    }

    // -- Transactions ---------------------------------------------------------

    /// Runs `f` inside a single `rusqlite` transaction, committing on `Ok` and
    /// rolling back on `Err`. Used by the writer's supersede step (insert-new +
    /// update-old must be atomic, §5).
    pub fn transaction<T>(&self, f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut writer = self.writer.lock().expect("writer lock poisoned");
        let tx = writer.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    // -- Relations ------------------------------------------------------------

    pub fn insert_relation(&self, spec: NewRelation) -> Result<Relation> {
        let now = Utc::now();
        let relation = Relation {
            id: new_id(),
            agent_id: spec.agent_id,
            subject: spec.subject,
            predicate: spec.predicate,
            object: spec.object,
            confidence: spec.confidence.clamp(0.0, 1.0),
            memory_id: spec.memory_id,
            expired: false,
            created_at: now,
            updated_at: now,
        };
        let writer = self.writer.lock().expect("writer lock poisoned");
        writer.execute(
            "INSERT INTO relations (id, agent_id, subject, predicate, object, confidence, memory_id, expired, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                relation.id,
                relation.agent_id,
                relation.subject,
                relation.predicate.to_string(),
                relation.object,
                relation.confidence,
                relation.memory_id,
                relation.expired as i64,
                relation.created_at.to_rfc3339(),
                relation.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(relation)
    }

    pub fn list_relations(&self, agent_id: &str) -> Result<Vec<Relation>> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = reader.prepare(
            "SELECT id, agent_id, subject, predicate, object, confidence, memory_id, expired, created_at, updated_at
             FROM relations WHERE agent_id = ?1 AND expired = 0",
        )?;
        let rows = stmt.query_map(params![agent_id], row_to_relation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // -- Agents -----------------------------------------------------------------

    pub fn upsert_agent(&self, agent: &crate::model::Agent) -> Result<()> {
        let writer = self.writer.lock().expect("writer lock poisoned");
        writer.execute(
            "INSERT INTO agents (id, name, config_overrides, profile, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                config_overrides = excluded.config_overrides,
                profile = excluded.profile,
                updated_at = excluded.updated_at",
            params![
                agent.id,
                agent.name,
                agent.config_overrides.to_string(),
                agent.profile,
                agent.created_at.to_rfc3339(),
                agent.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_agent(&self, id: &str) -> Result<Option<crate::model::Agent>> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        reader
            .query_row("SELECT * FROM agents WHERE id = ?1", params![id], row_to_agent)
            .optional()
            .map_err(CortexError::from)
    }

    /// Distinct agent ids with at least one live memory, for lifecycle passes that
    /// must walk every agent (promotion, archival, profile synthesis).
    pub fn list_agent_ids(&self) -> Result<Vec<String>> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = reader.prepare(
            "SELECT DISTINCT agent_id FROM memories WHERE superseded_by IS NULL",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn set_agent_profile(&self, agent_id: &str, profile: &str) -> Result<()> {
        let writer = self.writer.lock().expect("writer lock poisoned");
        writer.execute(
            "UPDATE agents SET profile = ?1, updated_at = ?2 WHERE id = ?3",
            params![profile, Utc::now().to_rfc3339(), agent_id],
        )?;
        Ok(())
    }

    // -- Extraction logs ----------------------------------------------------

    pub fn insert_extraction_log(&self, log: &crate::model::ExtractionLog) -> Result<()> {
        let writer = self.writer.lock().expect("writer lock poisoned");
        writer.execute(
            "INSERT INTO extraction_logs (id, agent_id, session_id, channel, exchange_preview, raw_output, parsed_count, written, deduplicated, smart_updated, latency_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                log.id,
                log.agent_id,
                log.session_id,
                serde_json::to_string(&log.channel).unwrap_or_default(),
                log.exchange_preview,
                log.raw_output,
                log.parsed_count,
                log.written,
                log.deduplicated,
                log.smart_updated,
                log.latency_ms,
                log.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // -- Stats ----------------------------------------------------------------

    /// Counters for `GET /stats` (§6): live memories per layer, total relations,
    /// total agents, plus the vector index size for a cheap consistency check.
    pub fn stats(&self) -> Result<StoreStats> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        let mut stats = StoreStats::default();

        let mut stmt = reader.prepare(
            "SELECT layer, COUNT(*) FROM memories WHERE superseded_by IS NULL GROUP BY layer",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;
        for row in rows {
            let (layer, count) = row?;
            match layer.as_str() {
                "working" => stats.working_count = count,
                "core" => stats.core_count = count,
                "archive" => stats.archive_count = count,
                _ => {}
            }
        }

        stats.relation_count =
            reader.query_row("SELECT COUNT(*) FROM relations", [], |row| row.get::<_, i64>(0))? as u64;
        stats.agent_count =
            reader.query_row("SELECT COUNT(*) FROM agents", [], |row| row.get::<_, i64>(0))? as u64;
        stats.vector_index_size = self.vector.len() as u64;

        Ok(stats)
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub working_count: u64,
    pub core_count: u64,
    pub archive_count: u64,
    pub relation_count: u64,
    pub agent_count: u64,
    pub vector_index_size: u64,
}

fn build_memory(spec: NewMemory) -> Result<Memory> {
    let now = Utc::now();
    let layer = spec.routed_layer();
    let expires_at = match layer {
        Layer::Working => Some(now + chrono::Duration::hours(48)),
        _ => None,
    };
    let memory = Memory {
        id: new_id(),
        agent_id: spec.agent_id,
        layer,
        category: spec.category,
        content: spec.content,
        importance: spec.importance.clamp(0.0, 1.0),
        confidence: spec.confidence.clamp(0.0, 1.0),
        decay_score: 1.0,
        access_count: 0,
        created_at: now,
        updated_at: now,
        expires_at,
        superseded_by: None,
        is_pinned: spec.is_pinned,
        source: spec.source,
        metadata: spec.metadata,
    };
    memory.check_invariants()?;
    Ok(memory)
}

fn insert_row(conn: &Connection, memory: &Memory) -> Result<()> {
    conn.execute(
        "INSERT INTO memories (id, agent_id, layer, category, content, importance, confidence, decay_score, access_count, created_at, updated_at, expires_at, superseded_by, is_pinned, source, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            memory.id,
            memory.agent_id,
            memory.layer.to_string(),
            memory.category.to_string(),
            memory.content,
            memory.importance,
            memory.confidence,
            memory.decay_score,
            memory.access_count as i64,
            memory.created_at.to_rfc3339(),
            memory.updated_at.to_rfc3339(),
            memory.expires_at.map(|d| d.to_rfc3339()),
            memory.superseded_by,
            memory.is_pinned as i64,
            memory.source,
            memory.metadata.to_string(),
        ],
    )?;
    Ok(())
}

fn update_row(conn: &Connection, memory: &Memory) -> Result<()> {
    conn.execute(
        "UPDATE memories SET
            content = ?2, importance = ?3, confidence = ?4, decay_score = ?5,
            access_count = ?6, updated_at = ?7, expires_at = ?8, superseded_by = ?9,
            is_pinned = ?10, layer = ?11, metadata = ?12
         WHERE id = ?1",
        params![
            memory.id,
            memory.content,
            memory.importance,
            memory.confidence,
            memory.decay_score,
            memory.access_count as i64,
            memory.updated_at.to_rfc3339(),
            memory.expires_at.map(|d| d.to_rfc3339()),
            memory.superseded_by,
            memory.is_pinned as i64,
            memory.layer.to_string(),
            memory.metadata.to_string(),
        ],
    )?;
    Ok(())
}

fn row_to_memory(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let layer: String = row.get("layer")?;
    let category: String = row.get("category")?;
    let metadata_raw: String = row.get("metadata")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let expires_at: Option<String> = row.get("expires_at")?;

    Ok(Memory {
        id: row.get("id")?,
        agent_id: row.get("agent_id")?,
        layer: layer.parse().unwrap_or(Layer::Working),
        category: category.parse().unwrap_or(Category::Fact),
        content: row.get("content")?,
        importance: row.get("importance")?,
        confidence: row.get("confidence")?,
        decay_score: row.get("decay_score")?,
        access_count: row.get::<_, i64>("access_count")? as u64,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
        expires_at: expires_at.map(|s| parse_dt(&s)),
        superseded_by: row.get("superseded_by")?,
        is_pinned: row.get::<_, i64>("is_pinned")? != 0,
        source: row.get("source")?,
        metadata: serde_json::from_str(&metadata_raw).unwrap_or(serde_json::json!({})),
    })
}

fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<Relation> {
    let predicate: String = row.get("predicate")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Relation {
        id: row.get("id")?,
        agent_id: row.get("agent_id")?,
        subject: row.get("subject")?,
        predicate: predicate.parse().unwrap_or(crate::model::Predicate::RelatedTo),
        object: row.get("object")?,
        confidence: row.get("confidence")?,
        memory_id: row.get("memory_id")?,
        expired: row.get::<_, i64>("expired")? != 0,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
    })
}

fn row_to_agent(row: &Row<'_>) -> rusqlite::Result<crate::model::Agent> {
    let overrides_raw: String = row.get("config_overrides")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(crate::model::Agent {
        id: row.get("id")?,
        name: row.get("name")?,
        config_overrides: serde_json::from_str(&overrides_raw).unwrap_or(serde_json::json!({})),
        profile: row.get("profile")?,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
    })
}

fn parse_dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
