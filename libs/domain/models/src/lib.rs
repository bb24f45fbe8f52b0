// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS REGISTRY (V3.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE CONTRATOS SOBERANOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE SOURCE OF TRUTH: Todos los estratos (ingreso, motor de
 *    letras, motor de palabras, forja de alias) consumen los mismos
 *    contratos serde, eliminando la deriva de tipos en el bus.
 * 2. TYPESHARE SYNERGY: Mapeo determinista hacia el Dashboard
 *    frontend, garantizando paridad en la Tríada.
 * =================================================================
 */

pub mod frame;
pub mod job;
pub mod letters;
pub mod lexicon;
pub mod resolution;

#[cfg(test)]
mod tests_serialization;

pub use frame::{LandmarkRecord, SourceMeta, HOLISTIC_FRAME_VALUES};
pub use job::{AliasJob, AliasJobStatus, OcrCompletionNotice, TermsReadyNotice};
pub use letters::{
    CommitCandidate, Handedness, LetterEvent, LetterObservation, SkipReason, WordBuffer,
};
pub use lexicon::LexiconEntry;
pub use resolution::{ResolvedWord, SearchMethod, SearchResult, RESOLUTION_TOP_RESULTS};

/// Alfabeto soberano de 37 símbolos del clasificador de deletreo.
/// Orden canónico: dígitos, letras, pausa.
pub const RECOGNITION_ALPHABET: [char; 37] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J',
    'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z', '_',
];

/// Determina si un símbolo pertenece al alfabeto de reconocimiento.
pub fn is_alphabet_symbol(candidate_symbol: char) -> bool {
    RECOGNITION_ALPHABET.contains(&candidate_symbol)
}
