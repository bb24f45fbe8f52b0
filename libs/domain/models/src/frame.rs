// [libs/domain/models/src/frame.rs]
/*!
 * =================================================================
 * APARATO: LANDMARK FRAME CONTRACTS (V2.1 - HOLISTIC ALIGNED)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE REGISTRO DEL FLUJO DE LANDMARKS
 *
 * # Mathematical Proof (Layout Invariance):
 * El vector holístico es posicional: pose (33×4) + cara (468×3) +
 * mano izquierda (21×3) + mano derecha (21×3) = 1662 valores. Todo
 * registro que viole esta cardinalidad es rechazado en el ingreso,
 * por lo que los estratos inferiores operan sin re-validación.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Cardinalidad exacta del vector holístico por fotograma.
pub const HOLISTIC_FRAME_VALUES: usize = 1662;

/// Metadatos de procedencia adjuntos a cada registro del bus.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Origen del fotograma (gateway, replay, sintético).
    pub source: String,
    /// Marca temporal del gateway en milisegundos epoch, si existe.
    #[typeshare(serialized_as = "number")]
    pub event_time: Option<i64>,
}

/// Registro soberano del flujo de landmarks, particionado por sesión.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkRecord {
    /// Identificador de sesión (clave de partición del bus).
    pub session_id: String,
    /// Identificador de conexión del gateway externo.
    pub connection_id: String,
    /// Marca temporal ISO-8601 del ingreso.
    pub timestamp: String,
    /// Vector holístico completo (1662 reales finitos).
    pub landmarks: Vec<f64>,
    pub metadata: SourceMeta,
}

impl LandmarkRecord {
    /// Verifica la cardinalidad y finitud del vector holístico.
    pub fn has_valid_geometry(&self) -> bool {
        self.landmarks.len() == HOLISTIC_FRAME_VALUES
            && self.landmarks.iter().all(|value| value.is_finite())
    }
}
