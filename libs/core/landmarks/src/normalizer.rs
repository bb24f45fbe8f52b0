// [libs/core/landmarks/src/normalizer.rs]
/*!
 * =================================================================
 * APARATO: WRIST-RELATIVE NORMALIZER (V3.0 - SCALE INVARIANT)
 * CLASIFICACIÓN: CORE GEOMETRY (ESTRATO L1)
 * RESPONSABILIDAD: NORMALIZACIÓN DE PUNTOS DE MANO A 40 RASGOS
 *
 * # Mathematical Proof (Scale Guard):
 * Tras la traslación por la muñeca, el máximo absoluto de las
 * coordenadas relativas es el radio de la mano en el plano imagen.
 * La división por ese radio acota todos los rasgos a [-1, 1]; si el
 * radio es cero (mano degenerada en un punto), el vector completo es
 * cero y se entrega tal cual en lugar de dividir por cero.
 * =================================================================
 */

use crate::{GeometryFault, FEATURE_VECTOR_VALUES, HAND_LANDMARK_POINTS};
use tracing::debug_span;

/// Normaliza 21 puntos (x, y) de mano al vector de 40 características:
/// traslación por la muñeca (punto 0), aplanado a 42 valores, escala
/// por el máximo absoluto y descarte de los dos primeros (cero por
/// construcción).
///
/// # Errors:
/// - `GeometryFault::InvalidHandBlock` si no llegan exactamente 21 puntos.
pub fn normalize_hand_points(hand_points: &[[f64; 2]]) -> Result<Vec<f64>, GeometryFault> {
    let _normalization_span =
        debug_span!("landmark_preprocessing", input_points = hand_points.len()).entered();

    if hand_points.len() != HAND_LANDMARK_POINTS {
        return Err(GeometryFault::InvalidHandBlock(hand_points.len()));
    }

    let wrist_anchor_x = hand_points[0][0];
    let wrist_anchor_y = hand_points[0][1];

    // Coordenadas relativas a la muñeca, aplanadas: [x0,y0,x1,y1,...].
    let mut relative_flat: Vec<f64> = Vec::with_capacity(HAND_LANDMARK_POINTS * 2);
    for point in hand_points {
        relative_flat.push(point[0] - wrist_anchor_x);
        relative_flat.push(point[1] - wrist_anchor_y);
    }

    let max_absolute_value = relative_flat
        .iter()
        .fold(0.0_f64, |running_max, value| running_max.max(value.abs()));

    if max_absolute_value != 0.0 {
        for value in relative_flat.iter_mut() {
            *value /= max_absolute_value;
        }
    }

    // Los dos primeros valores son la muñeca relativa a sí misma: cero.
    let feature_vector: Vec<f64> = relative_flat.split_off(2);
    debug_assert_eq!(feature_vector.len(), FEATURE_VECTOR_VALUES);

    Ok(feature_vector)
}
