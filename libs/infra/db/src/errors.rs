// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V4.2 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONFIGURATION AWARENESS: 'ConfigurationError' distingue fallos
 *    de red de variables de entorno vacías en el despliegue.
 * 2. RETRYABLE SEMANTICS: 'DeadlineExceeded' marca plazos agotados
 *    como reintentables; el camino online degrada sin colapsar.
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el sustrato libSQL.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// El plazo explícito de la llamada expiró (reintentable).
    #[error("[L3_DB_DEADLINE_FAULT]: STORE_CALL_EXPIRED -> {0}")]
    DeadlineExceeded(String),

    // --- ESTRATO DE FORJA DE ALIAS (LEDGER) ---

    /// El trabajo solicitado no existe en el Ledger de forja.
    #[error("[L3_FORGE_FAULT]: JOB_NOT_FOUND")]
    JobNotFound,

    /// El trabajo no admite la transición de estado solicitada.
    #[error("[L3_FORGE_FAULT]: INVALID_STATE_TRANSITION")]
    InvalidState,

    // --- ESTRATO DE REGISTRO DE CONEXIONES ---

    /// La conexión solicitada no existe en el registro.
    #[error("[L3_REGISTRY_FAULT]: CONNECTION_NOT_FOUND")]
    ConnectionNotFound,
}

impl DbError {
    /// Mapea el fallo de persistencia al contrato del motor de compromiso.
    pub fn into_session_fault(self) -> glossa_domain_commit::SessionStoreFault {
        use glossa_domain_commit::SessionStoreFault;
        match self {
            DbError::DeadlineExceeded(detail) => SessionStoreFault::DeadlineExceeded(detail),
            DbError::MappingError(detail) => SessionStoreFault::MappingViolation(detail),
            other => SessionStoreFault::Unavailable(other.to_string()),
        }
    }

    /// Mapea el fallo de persistencia al contrato del resolutor.
    pub fn into_lexicon_fault(self) -> glossa_domain_resolver::LexiconIndexFault {
        use glossa_domain_resolver::LexiconIndexFault;
        match self {
            DbError::DeadlineExceeded(detail) => LexiconIndexFault::DeadlineExceeded(detail),
            other => LexiconIndexFault::Unavailable(other.to_string()),
        }
    }
}
