// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TACTICAL PERSISTENCE FACADE (V4.0 - SINGLE STORE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL CLIENTE Y REPOSITORIOS
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::GlossaDbClient;
pub use errors::DbError;

use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Plazo explícito de toda llamada del camino online al almacén.
pub const STORE_CALL_DEADLINE: Duration = Duration::from_secs(5);
/// Intentos totales de una escritura antes de degradar.
const WRITE_RETRY_ATTEMPTS: u32 = 3;
/// Retroceso base entre reintentos de escritura.
const WRITE_RETRY_BASE_MS: u64 = 100;
/// Fracción de jitter uniforme sobre el retroceso de escritura.
const WRITE_RETRY_JITTER_FRACTION: f64 = 0.10;

/// Ejecuta una operación de almacén bajo el plazo explícito.
/// La expiración produce un fallo reintentable, jamás un pánico.
pub async fn with_store_deadline<OperationT, OutputT>(
    operation_label: &str,
    operation: OperationT,
) -> Result<OutputT, DbError>
where
    OperationT: std::future::Future<Output = Result<OutputT, DbError>>,
{
    tokio::time::timeout(STORE_CALL_DEADLINE, operation)
        .await
        .map_err(|_| DbError::DeadlineExceeded(operation_label.to_string()))?
}

/// Ejecuta una escritura con reintentos exponenciales y 10% de jitter.
/// Solo los fallos transitorios reintentan; los semánticos propagan.
pub async fn with_write_retry<OperationFactoryT, OperationT, OutputT>(
    operation_label: &str,
    mut operation_factory: OperationFactoryT,
) -> Result<OutputT, DbError>
where
    OperationFactoryT: FnMut() -> OperationT,
    OperationT: std::future::Future<Output = Result<OutputT, DbError>>,
{
    let mut last_transient_fault: Option<DbError> = None;

    for attempt in 0..WRITE_RETRY_ATTEMPTS {
        if attempt > 0 {
            let exponential_ms = WRITE_RETRY_BASE_MS * 2_u64.pow(attempt - 1);
            let jitter_ms = rand::thread_rng()
                .gen_range(0.0..=exponential_ms as f64 * WRITE_RETRY_JITTER_FRACTION);
            tokio::time::sleep(Duration::from_millis(exponential_ms + jitter_ms as u64)).await;
        }

        match with_store_deadline(operation_label, operation_factory()).await {
            Ok(output) => return Ok(output),
            Err(transient_fault @ (DbError::ConnectionError(_)
            | DbError::QueryError(_)
            | DbError::DeadlineExceeded(_))) => {
                warn!(
                    "⚠️  [STORE_RETRY]: '{}' attempt {} failed: {}",
                    operation_label,
                    attempt + 1,
                    transient_fault
                );
                last_transient_fault = Some(transient_fault);
            }
            Err(semantic_fault) => return Err(semantic_fault),
        }
    }

    Err(last_transient_fault
        .unwrap_or_else(|| DbError::ConnectionError(format!("{operation_label}: retries exhausted"))))
}
