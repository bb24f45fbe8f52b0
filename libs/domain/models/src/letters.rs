// [libs/domain/models/src/letters.rs]
/*!
 * =================================================================
 * APARATO: LETTER STREAM CONTRACTS (V3.2 - TAGGED UNION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DEL FLUJO DE LETRAS Y ESTADO DE SESIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TAGGED UNION: El alambre dinámico se materializa como unión
 *    etiquetada ('prediction' | 'skip') y se desestructura por
 *    pattern matching en todos los estratos descendentes.
 * 2. NOMINAL PURITY: Nomenclatura nominal absoluta en observaciones,
 *    candidatos y buffers de palabra.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Mano dominante detectada en el fotograma.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

/// Motivo de descarte de inferencia para un fotograma.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Ambas manos activas: probable seña a nivel de palabra.
    MultiHand,
    /// Ninguna mano detectada en el fotograma.
    NoHands,
}

/// Evento soberano del flujo de letras, particionado por sesión.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LetterEvent {
    /// Predicción de letra de mano única.
    Prediction {
        session_id: String,
        connection_id: String,
        /// Marca temporal ISO-8601 de emisión.
        timestamp: String,
        /// Símbolo del alfabeto de reconocimiento.
        prediction: String,
        confidence: f64,
        handedness: Handedness,
        /// Siempre false para predicciones (mano única por contrato).
        multi_hand: bool,
        processing_time_ms: f64,
        #[serde(default)]
        metadata: Option<serde_json::Value>,
    },
    /// Fotograma descartado con su motivo.
    Skip {
        session_id: String,
        connection_id: String,
        timestamp: String,
        skip_reason: SkipReason,
        multi_hand: bool,
        processing_time_ms: f64,
        #[serde(default)]
        metadata: Option<serde_json::Value>,
    },
}

impl LetterEvent {
    /// Clave de partición del evento en el bus.
    pub fn session_identifier(&self) -> &str {
        match self {
            LetterEvent::Prediction { session_id, .. } => session_id,
            LetterEvent::Skip { session_id, .. } => session_id,
        }
    }
}

/// Observación individual dentro de la ventana deslizante de sesión.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterObservation {
    /// Símbolo observado (alfabeto de 37 posiciones).
    pub char: char,
    /// Confianza del clasificador en [0, 1].
    pub confidence: f64,
    /// Epoch en segundos (fracción = milisegundos).
    pub timestamp: f64,
}

/// Candidato agregado de la votación ponderada por confianza.
/// Computado, nunca persistido.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitCandidate {
    pub char: char,
    /// Σ de confianzas del carácter en la ventana filtrada.
    pub aggregate_confidence: f64,
    /// Primera aparición del carácter (epoch segundos).
    pub first_seen: f64,
    /// Última aparición del carácter (epoch segundos).
    pub last_seen: f64,
    pub count: u32,
}

impl CommitCandidate {
    /// Duración de dominancia del candidato en milisegundos.
    pub fn stability_duration_ms(&self) -> f64 {
        (self.last_seen - self.first_seen) * 1000.0
    }
}

/// Palabra en construcción a partir de letras comprometidas.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordBuffer {
    pub session_id: String,
    pub user_id: String,
    /// Letras comprometidas por el motor, en orden de compromiso.
    pub letters: Vec<char>,
    /// Epoch en segundos del último compromiso.
    pub last_commit_time: Option<f64>,
    pub created_at: f64,
}

impl WordBuffer {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>, created_at: f64) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            letters: Vec::new(),
            last_commit_time: None,
            created_at,
        }
    }

    /// Palabra cruda acumulada hasta el momento.
    pub fn current_word(&self) -> String {
        self.letters.iter().collect()
    }

    /// Milisegundos transcurridos desde el último compromiso.
    pub fn time_since_last_commit_ms(&self, now_epoch_seconds: f64) -> Option<f64> {
        self.last_commit_time
            .map(|last_commit| (now_epoch_seconds - last_commit) * 1000.0)
    }
}
