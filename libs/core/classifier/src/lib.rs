// [libs/core/classifier/src/lib.rs]
/*!
 * =================================================================
 * APARATO: KEYPOINT CLASSIFIER CORE (V6.0 - COLD START MASTER)
 * CLASIFICACIÓN: CORE INFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: INFERENCIA DENSA Y REGISTRO DE ETIQUETAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EXPLICIT DEPENDENCY: El clasificador viaja como valor explícito
 *    hacia el puente de letras a través del seam 'LetterClassifier';
 *    la celda global existe solo para reutilización de arranque frío.
 * 2. ARTIFACT DISCIPLINE: Los pesos viven en un artefacto JSON
 *    versionado; su ausencia es un fallo fatal de configuración del
 *    proceso, nunca un fallo por registro.
 * 3. LABEL PARITY: 37 etiquetas (dígitos, letras, pausa) con sidecar
 *    CSV y fallback embebido idéntico al de producción.
 * =================================================================
 */

pub mod labels;
pub mod network;
pub mod runtime;
pub mod weights;

pub use labels::{load_labels, FALLBACK_LABELS};
pub use network::{KeypointClassifier, LetterInference};
pub use runtime::{initialize_global_classifier, global_classifier, teardown_global_classifier};
pub use weights::{Activation, ClassifierArtifact, DenseLayerSpec};

use thiserror::Error;

/// Catálogo semántico de fallos de inferencia.
#[derive(Error, Debug)]
pub enum ClassifierFault {
    /// El artefacto de pesos no existe o no es legible (fatal de arranque).
    #[error("[L1_MODEL_FAULT]: WEIGHT_ARTIFACT_UNREACHABLE -> {0}")]
    ArtifactUnreachable(String),

    /// El artefacto no respeta el contrato de forma (dimensiones encadenadas).
    #[error("[L1_MODEL_FAULT]: TENSOR_SHAPE_VIOLATION -> {0}")]
    ShapeViolation(String),

    /// El vector de entrada no coincide con la dimensionalidad del modelo.
    #[error("[L1_MODEL_FAULT]: INPUT_DIMENSION_MISMATCH -> expected {expected}, got {actual}")]
    InputDimensionMismatch { expected: usize, actual: usize },

    /// El sidecar de etiquetas existe pero no pudo ser decodificado.
    #[error("[L1_MODEL_FAULT]: LABEL_SIDECAR_CORRUPTED -> {0}")]
    LabelSidecarCorrupted(String),

    /// El clasificador global aún no ha sido inicializado.
    #[error("[L1_MODEL_FAULT]: CLASSIFIER_NOT_INITIALIZED")]
    NotInitialized,
}

/// Seam de inferencia consumido por el puente de letras.
/// Las implementaciones reales cargan pesos; los dobles de prueba no.
pub trait LetterClassifier: Send + Sync {
    /// Infiere la clase dominante y su confianza sobre 40 rasgos.
    fn infer(&self, feature_vector: &[f64]) -> Result<LetterInference, ClassifierFault>;

    /// Etiqueta asociada al índice de clase, si es conocido.
    fn label_for(&self, class_index: usize) -> Option<&str>;
}
