//! Schema migrations, applied in order and tracked by an integer `schema_version`
//! row in a `metadata` table (§6 "Schema versioning by integer migration number").

use rusqlite::Connection;

use crate::error::Result;

pub struct Migration {
    pub version: i64,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS memories (
                id             TEXT PRIMARY KEY,
                agent_id       TEXT NOT NULL,
                layer          TEXT NOT NULL,
                category       TEXT NOT NULL,
                content        TEXT NOT NULL,
                importance     REAL NOT NULL,
                confidence     REAL NOT NULL,
                decay_score    REAL NOT NULL,
                access_count   INTEGER NOT NULL DEFAULT 0,
                created_at     TEXT NOT NULL,
                updated_at     TEXT NOT NULL,
                expires_at     TEXT,
                superseded_by  TEXT,
                is_pinned      INTEGER NOT NULL DEFAULT 0,
                source         TEXT NOT NULL,
                metadata       TEXT NOT NULL DEFAULT '{}'
            );

            CREATE INDEX IF NOT EXISTS idx_memories_agent_layer
                ON memories(agent_id, layer);
            CREATE INDEX IF NOT EXISTS idx_memories_agent_category
                ON memories(agent_id, category);
            CREATE INDEX IF NOT EXISTS idx_memories_superseded
                ON memories(superseded_by);

            CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
                content,
                content='memories',
                content_rowid='rowid'
            );

            CREATE TRIGGER IF NOT EXISTS memories_fts_insert AFTER INSERT ON memories BEGIN
                INSERT INTO memories_fts(rowid, content) VALUES (new.rowid, new.content);
            END;
            CREATE TRIGGER IF NOT EXISTS memories_fts_delete AFTER DELETE ON memories BEGIN
                INSERT INTO memories_fts(memories_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
            END;
            CREATE TRIGGER IF NOT EXISTS memories_fts_update AFTER UPDATE ON memories BEGIN
                INSERT INTO memories_fts(memories_fts, rowid, content) VALUES ('delete', old.rowid, old.content);
                INSERT INTO memories_fts(rowid, content) VALUES (new.rowid, new.content);
            END;

            CREATE TABLE IF NOT EXISTS relations (
                id          TEXT PRIMARY KEY,
                agent_id    TEXT NOT NULL,
                subject     TEXT NOT NULL,
                predicate   TEXT NOT NULL,
                object      TEXT NOT NULL,
                confidence  REAL NOT NULL,
                memory_id   TEXT,
                expired     INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_relations_agent ON relations(agent_id);

            CREATE TABLE IF NOT EXISTS extraction_logs (
                id               TEXT PRIMARY KEY,
                agent_id         TEXT NOT NULL,
                session_id       TEXT,
                channel          TEXT NOT NULL,
                exchange_preview TEXT NOT NULL,
                raw_output       TEXT,
                parsed_count     INTEGER NOT NULL,
                written          INTEGER NOT NULL,
                deduplicated     INTEGER NOT NULL,
                smart_updated    INTEGER NOT NULL,
                latency_ms       INTEGER NOT NULL,
                created_at       TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_extraction_logs_agent ON extraction_logs(agent_id);

            CREATE TABLE IF NOT EXISTS agents (
                id               TEXT PRIMARY KEY,
                name             TEXT NOT NULL,
                config_overrides TEXT NOT NULL DEFAULT '{}',
                profile          TEXT NOT NULL DEFAULT '',
                created_at       TEXT NOT NULL,
                updated_at       TEXT NOT NULL
            );
        "#,
    },
];

pub fn apply_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
    )?;

    let current: i64 = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current {
            conn.execute_batch(migration.sql)?;
            conn.execute(
                "INSERT INTO metadata (key, value) VALUES ('schema_version', ?1)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [migration.version.to_string()],
            )?;
        }
    }

    Ok(())
}
