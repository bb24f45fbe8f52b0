// [libs/infra/db/src/repositories/lexicon/queries.rs]
/*!
 * =================================================================
 * APARATO: LEXICON SQL STORE (V2.1 - PERSONALIZED PATHS)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: SENTENCIAS DEL ÍNDICE LÉXICO PERSONALIZADO
 * =================================================================
 */

/// Materializa o reemplaza la entrada (surface, user_id).
/// La forja de alias es el único llamador de esta sentencia.
pub const UPSERT_ENTRY: &str = r#"
    INSERT INTO lexicon_entries (
        surface, user_id, aliases, confidence_scores,
        source_job_id, alias_count, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(surface, user_id) DO UPDATE SET
        aliases = excluded.aliases,
        confidence_scores = excluded.confidence_scores,
        source_job_id = excluded.source_job_id,
        alias_count = excluded.alias_count,
        updated_at = excluded.updated_at
"#;

/// Candidatos del usuario para el escrutinio de relevancia local.
pub const FETCH_USER_ENTRIES: &str = r#"
    SELECT surface, user_id, aliases, confidence_scores, source_job_id, updated_at
    FROM lexicon_entries
    WHERE user_id = ?1
"#;

/// Entrada puntual (inspección y suites).
pub const FETCH_ENTRY: &str = r#"
    SELECT surface, user_id, aliases, confidence_scores, source_job_id, updated_at
    FROM lexicon_entries
    WHERE surface = ?1 AND user_id = ?2
"#;
