// [libs/infra/db/src/repositories/session/queries.rs]
/*!
 * =================================================================
 * APARATO: SESSION SQL STORE (V3.0 - WINDOW & BUFFER DDL)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: SENTENCIAS ATÓMICAS DEL ESTADO DE SESIÓN
 *
 * # Mathematical Proof (FIFO Window):
 * La clave autoincremental 'id' crece con cada inserción; el ORDER BY
 * id ASC reconstruye el orden de arribo exacto, y la poda por
 * observed_at elimina siempre un prefijo (las observaciones llegan
 * con timestamps no decrecientes por sesión).
 * =================================================================
 */

// --- ESTRATO DE VENTANA DESLIZANTE ---

/// Anexa una observación al extremo derecho de la ventana.
pub const WINDOW_PUSH: &str = r#"
    INSERT INTO session_windows (session_id, letter, confidence, observed_at)
    VALUES (?1, ?2, ?3, ?4)
"#;

/// Poda las observaciones anteriores al corte de la ventana W.
pub const WINDOW_PRUNE: &str = r#"
    DELETE FROM session_windows
    WHERE session_id = ?1 AND observed_at < ?2
"#;

/// Ventana completa en orden cronológico de arribo.
pub const WINDOW_GET: &str = r#"
    SELECT letter, confidence, observed_at
    FROM session_windows
    WHERE session_id = ?1
    ORDER BY id ASC
"#;

pub const WINDOW_CLEAR: &str = r#"
    DELETE FROM session_windows WHERE session_id = ?1
"#;

// --- ESTRATO DE BUFFER DE PALABRA ---

/// Materializa el buffer si no existe (sin pisar uno residente).
pub const BUFFER_ENSURE: &str = r#"
    INSERT OR IGNORE INTO word_buffers (session_id, user_id, letters, created_at)
    VALUES (?1, ?2, '', ?3)
"#;

pub const BUFFER_GET: &str = r#"
    SELECT session_id, user_id, letters, last_commit_at, created_at
    FROM word_buffers
    WHERE session_id = ?1
"#;

/// Anexa una letra comprometida y sella el instante de compromiso.
pub const BUFFER_APPEND: &str = r#"
    UPDATE word_buffers
    SET letters = letters || ?2,
        last_commit_at = ?3
    WHERE session_id = ?1
"#;

pub const BUFFER_CLEAR: &str = r#"
    DELETE FROM word_buffers WHERE session_id = ?1
"#;

/// Censo de sesiones con palabra en construcción (barrido de pausa).
pub const ACTIVE_SESSIONS: &str = r#"
    SELECT session_id FROM word_buffers WHERE letters != ''
"#;

// --- ESTRATO DE ARRENDAMIENTOS (TTL) ---

/// Renueva (o crea) el arrendamiento de la sesión.
pub const LEASE_RENEW: &str = r#"
    INSERT INTO session_leases (session_id, expires_at)
    VALUES (?1, ?2)
    ON CONFLICT(session_id) DO UPDATE SET expires_at = excluded.expires_at
"#;

/// Sesiones cuyo arrendamiento expiró (candidatas a purga).
pub const LEASE_EXPIRED: &str = r#"
    SELECT session_id FROM session_leases WHERE expires_at < ?1
"#;

pub const LEASE_DROP: &str = r#"
    DELETE FROM session_leases WHERE session_id = ?1
"#;
