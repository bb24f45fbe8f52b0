// [apps/pipeline/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE LIBRARY ROOT (V6.0 - SPINE EXPOSURE)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LOS APARATOS DEL PROCESO
 * =================================================================
 */

pub mod config;
pub mod handlers;
pub mod kernel;
pub mod routes;
pub mod services;
pub mod stages;
pub mod state;

pub use config::PipelineConfig;
pub use kernel::PipelineKernel;
pub use state::AppState;

use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch en segundos con fracción de milisegundos.
pub fn epoch_seconds_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
