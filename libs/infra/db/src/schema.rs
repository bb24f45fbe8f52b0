// [libs/infra/db/src/schema.rs]
/*!
 * =================================================================
 * APARATO: TACTICAL SCHEMA BOOTSTRAP (V4.0 - IDEMPOTENT DDL)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: MATERIALIZACIÓN DEL ESQUEMA COMPLETO DEL SISTEMA
 *
 * # Logic:
 * DDL idempotente (IF NOT EXISTS) aplicado en cada ignición. Cuatro
 * estratos de tablas: estado de sesión (ventanas, buffers y
 * arrendamientos), registro de conexiones, índice léxico y Ledger
 * de trabajos de forja.
 * =================================================================
 */

use crate::errors::DbError;
use libsql::Connection;
use tracing::info;

const SCHEMA_STATEMENTS: &[&str] = &[
    // --- ESTRATO DE ESTADO DE SESIÓN ---
    r#"
    CREATE TABLE IF NOT EXISTS session_windows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        letter TEXT NOT NULL,
        confidence REAL NOT NULL,
        observed_at REAL NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_session_windows_session
        ON session_windows(session_id, id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS word_buffers (
        session_id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        letters TEXT NOT NULL DEFAULT '',
        last_commit_at REAL,
        created_at REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS session_leases (
        session_id TEXT PRIMARY KEY,
        expires_at REAL NOT NULL
    )
    "#,
    // --- ESTRATO DE REGISTRO DE CONEXIONES ---
    r#"
    CREATE TABLE IF NOT EXISTS connections (
        connection_id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL DEFAULT 'pending',
        connected_at TEXT NOT NULL,
        last_activity TEXT,
        expires_at REAL NOT NULL
    )
    "#,
    // --- ESTRATO DE ÍNDICE LÉXICO ---
    r#"
    CREATE TABLE IF NOT EXISTS lexicon_entries (
        surface TEXT NOT NULL,
        user_id TEXT NOT NULL,
        aliases TEXT NOT NULL,
        confidence_scores TEXT NOT NULL,
        source_job_id TEXT,
        alias_count INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (surface, user_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_lexicon_entries_user
        ON lexicon_entries(user_id)
    "#,
    // --- ESTRATO DEL LEDGER DE FORJA ---
    r#"
    CREATE TABLE IF NOT EXISTS alias_jobs (
        job_id TEXT PRIMARY KEY,
        request_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        bucket TEXT NOT NULL,
        object_key TEXT NOT NULL,
        etag TEXT NOT NULL,
        file_size INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL,
        notification_id TEXT,
        last_polled_at TEXT,
        raw_text_key TEXT,
        error_message TEXT,
        created_at TEXT NOT NULL,
        expires_at REAL NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_alias_jobs_request
        ON alias_jobs(request_id)
    "#,
];

/// Aplica el esquema completo del sistema sobre la conexión dada.
pub async fn apply_full_schema(connection: &Connection) -> Result<(), DbError> {
    for schema_statement in SCHEMA_STATEMENTS {
        connection.execute(schema_statement, ()).await?;
    }
    info!("🏛️  [SCHEMA]: Tactical schema levelized ({} statements).", SCHEMA_STATEMENTS.len());
    Ok(())
}
