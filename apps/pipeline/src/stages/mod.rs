// [apps/pipeline/src/stages/mod.rs]
/*!
 * =================================================================
 * APARATO: STAGE REGISTRY (V2.0)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN DE LAS ETAPAS DE LA COLUMNA
 * =================================================================
 */

pub mod letter;
pub mod word;

pub use letter::LetterStageProcessor;
pub use word::{WordFinalizer, WordStageProcessor};
