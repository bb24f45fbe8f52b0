// [libs/domain/models/src/job.rs]
/*!
 * =================================================================
 * APARATO: ALIAS JOB LEDGER CONTRACTS (V2.0 - IDEMPOTENT MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CICLO DE VIDA DE TRABAJOS DE FORJA DE ALIAS
 *
 * # Mathematical Proof (At-Most-Once Materialization):
 * La tupla (request_id, notification_id) junto con las transiciones
 * RUNNING → INGESTED → COMPLETED | FAILED garantiza que una carga
 * concreta se materialice a lo sumo una vez por notificación.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use typeshare::typeshare;

/// Estados soberanos del ciclo de vida de un trabajo de forja.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AliasJobStatus {
    /// OCR externo en curso (formatos escaneados).
    Running,
    /// Texto disponible, listo para ingesta (formatos planos u OCR sellado).
    Succeeded,
    /// Colapso del OCR o de la ingesta; requiere re-carga del operador.
    Failed,
    /// Texto y términos emitidos; listo para síntesis de alias.
    Ingested,
    /// Alias validados y materializados en el léxico.
    Completed,
}

impl AliasJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasJobStatus::Running => "RUNNING",
            AliasJobStatus::Succeeded => "SUCCEEDED",
            AliasJobStatus::Failed => "FAILED",
            AliasJobStatus::Ingested => "INGESTED",
            AliasJobStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for AliasJobStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for AliasJobStatus {
    type Err = String;

    fn from_str(raw_status: &str) -> Result<Self, Self::Err> {
        match raw_status {
            "RUNNING" => Ok(AliasJobStatus::Running),
            "SUCCEEDED" => Ok(AliasJobStatus::Succeeded),
            "FAILED" => Ok(AliasJobStatus::Failed),
            "INGESTED" => Ok(AliasJobStatus::Ingested),
            "COMPLETED" => Ok(AliasJobStatus::Completed),
            unknown => Err(format!("UNKNOWN_JOB_STATUS: {unknown}")),
        }
    }
}

/// Fila del Ledger de trabajos de forja (clave: job_id).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasJob {
    pub job_id: String,
    /// SHA-256(bucket|key|etag), primeros 16 hex. Ancla de idempotencia.
    pub request_id: String,
    pub user_id: String,
    pub bucket: String,
    pub object_key: String,
    pub etag: String,
    #[typeshare(serialized_as = "number")]
    pub file_size: u64,
    pub status: AliasJobStatus,
    /// Última notificación de OCR procesada (deduplicación).
    pub notification_id: Option<String>,
    pub last_polled_at: Option<String>,
    /// Clave del texto crudo emitido en el bucket raw.
    pub raw_text_key: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
}

/// Notificación de finalización entregada por el gateway de OCR.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrCompletionNotice {
    /// Identificador único de la notificación (ancla de deduplicación).
    pub notification_id: String,
    /// Trabajo de OCR externo referenciado.
    pub job_id: String,
    /// Estado reportado por el motor de OCR (solo SUCCEEDED se ingesta).
    pub status: String,
    pub bucket: String,
    pub object_key: String,
}

/// Aviso de términos listos emitido tras la ingesta.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsReadyNotice {
    pub job_id: String,
    pub user_id: String,
    /// Clave del listado de términos en el bucket raw.
    pub terms_key: String,
    #[typeshare(serialized_as = "number")]
    pub term_count: u64,
    pub original_file: String,
    pub processed_at: String,
}
