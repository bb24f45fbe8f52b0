// [libs/infra/db/src/repositories/jobs/queries.rs]
/*!
 * =================================================================
 * APARATO: FORGE LEDGER SQL STORE (V3.0 - IDEMPOTENT TRANSITIONS)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: SENTENCIAS ATÓMICAS DEL LEDGER DE FORJA DE ALIAS
 *
 * # Mathematical Proof (Notification Dedup):
 * CLAIM_NOTIFICATION solo sella la notificación cuando el valor
 * residente difiere: una re-entrega con el mismo identificador afecta
 * cero filas y el llamador interpreta la colisión como duplicado.
 * =================================================================
 */

// --- ESTRATO DE IGNICIÓN ---

/// Inicializa una fila del Ledger con su estado de arranque.
pub const INITIALIZE_JOB: &str = r#"
    INSERT INTO alias_jobs (
        job_id, request_id, user_id, bucket, object_key, etag,
        file_size, status, created_at, last_polled_at, expires_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, ?10)
"#;

pub const FETCH_JOB: &str = r#"
    SELECT job_id, request_id, user_id, bucket, object_key, etag,
           file_size, status, notification_id, last_polled_at,
           raw_text_key, error_message, created_at
    FROM alias_jobs
    WHERE job_id = ?1
"#;

/// Búsqueda por ancla de idempotencia de carga.
pub const FETCH_JOB_BY_REQUEST: &str = r#"
    SELECT job_id, request_id, user_id, bucket, object_key, etag,
           file_size, status, notification_id, last_polled_at,
           raw_text_key, error_message, created_at
    FROM alias_jobs
    WHERE request_id = ?1
    ORDER BY created_at DESC
    LIMIT 1
"#;

// --- ESTRATO DE TRANSICIONES ---
// Las transiciones de ingesta sellan la notificación que las produjo:
// la deduplicación lee la fila ANTES de transicionar y una re-entrega
// del mismo identificador se descarta sin efectos.

/// Transición a INGESTED con rastro del texto crudo y notificación.
pub const MARK_INGESTED: &str = r#"
    UPDATE alias_jobs
    SET status = 'INGESTED',
        raw_text_key = ?2,
        notification_id = ?3,
        last_polled_at = ?4
    WHERE job_id = ?1
"#;

/// Transición terminal de éxito.
pub const MARK_COMPLETED: &str = r#"
    UPDATE alias_jobs
    SET status = 'COMPLETED',
        last_polled_at = ?2
    WHERE job_id = ?1
"#;

/// Transición terminal de fallo con diagnóstico y notificación.
pub const MARK_FAILED: &str = r#"
    UPDATE alias_jobs
    SET status = 'FAILED',
        error_message = ?2,
        notification_id = ?3,
        last_polled_at = ?4
    WHERE job_id = ?1
"#;
