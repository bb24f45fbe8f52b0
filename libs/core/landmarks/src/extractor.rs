// [libs/core/landmarks/src/extractor.rs]
/*!
 * =================================================================
 * APARATO: DOMINANT HAND EXTRACTOR (V5.1 - POLICY SEALED)
 * CLASIFICACIÓN: CORE GEOMETRY (ESTRATO L1)
 * RESPONSABILIDAD: RESOLUCIÓN DE LA POLÍTICA MULTI-MANO / SIN-MANO
 *
 * # Logic:
 * El vector holístico es posicional: la mano izquierda vive en
 * [1536, 1599) y la derecha en [1599, 1662), cada una como 21 tríos
 * (x, y, z). Una mano está activa si cualquier magnitud de su bloque
 * supera 0.01. La coordenada z se descarta: el clasificador es 2D.
 * =================================================================
 */

use crate::{
    GeometryFault, HAND_ACTIVITY_THRESHOLD, HAND_LANDMARK_POINTS, LEFT_HAND_OFFSET,
    RIGHT_HAND_OFFSET,
};
use glossa_domain_models::{Handedness, HOLISTIC_FRAME_VALUES};
use tracing::debug_span;

/// Veredicto de la política de mano única sobre un fotograma.
#[derive(Debug, Clone, PartialEq)]
pub enum HandExtraction {
    /// Ambas manos activas: probable seña a nivel de palabra. Descartar.
    MultiHand,
    /// Ninguna mano detectada. Descartar.
    NoHands,
    /// Exactamente una mano activa: 21 puntos (x, y) listos para normalizar.
    SingleHand {
        handedness: Handedness,
        points: Vec<[f64; 2]>,
    },
}

/// Extrae la mano dominante del vector holístico aplicando la política
/// de mano única. La mano derecha gana el orden de inspección.
///
/// # Errors:
/// - `GeometryFault::InvalidFrameCardinality` si el vector no mide 1662.
pub fn extract_dominant_hand(
    holistic_landmarks: &[f64],
) -> Result<HandExtraction, GeometryFault> {
    let _extraction_span = debug_span!(
        "hand_extraction",
        holistic_values = holistic_landmarks.len()
    )
    .entered();

    if holistic_landmarks.len() != HOLISTIC_FRAME_VALUES {
        return Err(GeometryFault::InvalidFrameCardinality(
            holistic_landmarks.len(),
        ));
    }

    let left_hand_block = &holistic_landmarks[LEFT_HAND_OFFSET..RIGHT_HAND_OFFSET];
    let right_hand_block = &holistic_landmarks[RIGHT_HAND_OFFSET..HOLISTIC_FRAME_VALUES];

    let left_hand_active = block_has_activity(left_hand_block);
    let right_hand_active = block_has_activity(right_hand_block);

    // Política de mano única: dos manos → palabra, cero manos → vacío.
    if left_hand_active && right_hand_active {
        return Ok(HandExtraction::MultiHand);
    }

    let (selected_block, handedness) = if right_hand_active {
        (right_hand_block, Handedness::Right)
    } else if left_hand_active {
        (left_hand_block, Handedness::Left)
    } else {
        return Ok(HandExtraction::NoHands);
    };

    // 63 valores → 21 puntos (x, y); la z se descarta para el modelo 2D.
    let planar_points: Vec<[f64; 2]> = selected_block
        .chunks_exact(3)
        .map(|triple| [triple[0], triple[1]])
        .collect();

    debug_assert_eq!(planar_points.len(), HAND_LANDMARK_POINTS);

    Ok(HandExtraction::SingleHand {
        handedness,
        points: planar_points,
    })
}

/// Una mano se considera activa si cualquier magnitud supera el umbral.
fn block_has_activity(hand_block: &[f64]) -> bool {
    hand_block
        .iter()
        .any(|value| value.abs() > HAND_ACTIVITY_THRESHOLD)
}
