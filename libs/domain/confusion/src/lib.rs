// [libs/domain/confusion/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ASL CONFUSION SCIENCE (V4.0 - EMPIRICAL STRATA)
 * CLASIFICACIÓN: DOMAIN SCIENCE (ESTRATO L2)
 * RESPONSABILIDAD: MATRIZ DE CONFUSIÓN, DISTANCIA Y VALIDACIÓN DE ALIAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EMPIRICAL GROUND TRUTH: La matriz 37×37 proviene de conteos
 *    reales de confusiones carácter→carácter del clasificador en
 *    producción; las filas normalizadas definen probabilidades.
 * 2. CURATED FLOOR: Pares de confusión conocidos con probabilidad
 *    de matriz < 0.3 reciben un piso de 0.4, reflejando evidencia
 *    empírica que el dataset subrepresenta.
 * 3. SINGLE GATE: Un alias se acepta solo si supera el patrón
 *    sintáctico, la distancia de edición ≤ 2 (espacios y guiones
 *    removidos) y el score ponderado ≥ 0.5.
 * =================================================================
 */

pub mod matrix;
pub mod scoring;

pub use matrix::{
    char_to_matrix_index, confusion_probability, is_known_confusion, matrix_index_to_char,
    CONFUSION_MATRIX, MATRIX_DIMENSION,
};
pub use scoring::{
    confusion_weighted_score, levenshtein_distance, strip_separators, validate_alias,
    AliasVerdict, ALIAS_MAX_SCORE_THRESHOLD, KNOWN_CONFUSION_FLOOR,
};
