// [libs/core/landmarks/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HOLISTIC HAND EXTRACTION CORE (V5.1 - SINGLE HAND LAW)
 * CLASIFICACIÓN: CORE GEOMETRY (ESTRATO L1)
 * RESPONSABILIDAD: POLÍTICA DE MANO DOMINANTE Y NORMALIZACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE HAND LAW: El deletreo es de mano única. Dos manos activas
 *    implican seña a nivel de palabra y el fotograma se descarta con
 *    rastro explícito; cero manos activas se descarta igual.
 * 2. WRIST ANCHOR: La normalización traslada por la muñeca (punto 0)
 *    y escala por el máximo absoluto, produciendo un vector de 40
 *    características invariante a posición y escala.
 * 3. ZERO ALLOCATION WASTE: Operaciones sobre slices fijos del vector
 *    holístico sin copias intermedias del fotograma completo.
 *
 * # Mathematical Proof (Feature Dimensionality):
 * 21 puntos × 2 coordenadas = 42 valores relativos; las dos primeras
 * posiciones son idénticamente cero tras la traslación por la muñeca,
 * por lo que el descarte de ambas preserva toda la información y
 * entrega exactamente 40 características al clasificador.
 * =================================================================
 */

pub mod extractor;
pub mod normalizer;

pub use extractor::{extract_dominant_hand, HandExtraction};
pub use normalizer::normalize_hand_points;

use thiserror::Error;

/// Cantidad de puntos de referencia por mano.
pub const HAND_LANDMARK_POINTS: usize = 21;
/// Offset del bloque de mano izquierda dentro del vector holístico.
pub const LEFT_HAND_OFFSET: usize = 1536;
/// Offset del bloque de mano derecha dentro del vector holístico.
pub const RIGHT_HAND_OFFSET: usize = 1599;
/// Magnitud mínima para considerar una mano como activa.
pub const HAND_ACTIVITY_THRESHOLD: f64 = 0.01;
/// Cardinalidad del vector de características entregado al clasificador.
pub const FEATURE_VECTOR_VALUES: usize = 40;

/// Catálogo semántico de fallos geométricos.
#[derive(Error, Debug)]
pub enum GeometryFault {
    /// El fotograma no respeta la cardinalidad holística de 1662 valores.
    #[error("[L1_GEOMETRY_FAULT]: HOLISTIC_CARDINALITY_VIOLATION -> expected 1662, got {0}")]
    InvalidFrameCardinality(usize),

    /// El bloque de mano no contiene los 21 puntos esperados.
    #[error("[L1_GEOMETRY_FAULT]: HAND_BLOCK_VIOLATION -> expected 21 points, got {0}")]
    InvalidHandBlock(usize),
}
