// [libs/domain/confusion/src/scoring.rs]
/*!
 * =================================================================
 * APARATO: ALIAS VALIDATION ENGINE (V3.1 - CURATED FLOOR)
 * CLASIFICACIÓN: DOMAIN SCIENCE (ESTRATO L2)
 * RESPONSABILIDAD: DISTANCIA DE EDICIÓN Y SCORE PONDERADO DE ALIAS
 *
 * # Mathematical Proof (Score Bounds):
 * El recorrido alineado suma a lo sumo 1.0 por posición durante
 * min(|surface|, |alias|) posiciones y divide por |surface|, por lo
 * que el score vive en [0, 1]. Un alias idéntico a su superficie
 * obtiene exactamente 1.0.
 * =================================================================
 */

use crate::matrix::{confusion_probability, is_known_confusion};
use once_cell::sync::Lazy;
use regex::Regex;

/// Score mínimo para aceptar un alias sintetizado.
pub const ALIAS_MAX_SCORE_THRESHOLD: f64 = 0.5;
/// Piso de probabilidad para pares curados subrepresentados en la matriz.
pub const KNOWN_CONFUSION_FLOOR: f64 = 0.4;
/// Probabilidad de matriz bajo la cual se aplica el piso curado.
const FLOOR_ACTIVATION_THRESHOLD: f64 = 0.3;
/// Distancia de edición máxima entre alias y superficie (separadores removidos).
const MAX_ALIAS_EDIT_DISTANCE: usize = 2;

/// Patrón sintáctico de alias: mayúsculas, dígitos, guiones y espacios.
static ALIAS_SYNTAX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9\-\s]{2,40}$").expect("FATAL: alias pattern malformed"));

/// Veredicto de validación de un alias candidato.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasVerdict {
    pub accepted: bool,
    /// Score ponderado por confusión, presente también en rechazos por score.
    pub score: f64,
}

/// Remueve espacios y guiones (los separadores de deletreo permitidos).
pub fn strip_separators(term: &str) -> String {
    term.chars().filter(|symbol| *symbol != ' ' && *symbol != '-').collect()
}

/// Distancia de Levenshtein clásica sobre caracteres.
pub fn levenshtein_distance(first_term: &str, second_term: &str) -> usize {
    let first_symbols: Vec<char> = first_term.chars().collect();
    let second_symbols: Vec<char> = second_term.chars().collect();

    if first_symbols.is_empty() {
        return second_symbols.len();
    }
    if second_symbols.is_empty() {
        return first_symbols.len();
    }

    let mut previous_row: Vec<usize> = (0..=second_symbols.len()).collect();

    for (first_index, first_symbol) in first_symbols.iter().enumerate() {
        let mut current_row = vec![first_index + 1];

        for (second_index, second_symbol) in second_symbols.iter().enumerate() {
            let insertion_cost = previous_row[second_index + 1] + 1;
            let deletion_cost = current_row[second_index] + 1;
            let substitution_cost =
                previous_row[second_index] + usize::from(first_symbol != second_symbol);

            current_row.push(insertion_cost.min(deletion_cost).min(substitution_cost));
        }

        previous_row = current_row;
    }

    previous_row[second_symbols.len()]
}

/// Score ponderado por confusión entre superficie y alias.
///
/// Recorre el prefijo alineado del más corto (separadores removidos):
/// coincidencias aportan 1.0; discrepancias aportan la probabilidad de
/// confusión de la matriz, con piso de 0.4 para pares curados cuya
/// probabilidad empírica queda bajo 0.3. Normaliza por |surface|.
pub fn confusion_weighted_score(surface: &str, alias: &str) -> f64 {
    let surface_clean = strip_separators(surface);
    let alias_clean = strip_separators(alias);

    if levenshtein_distance(&surface_clean, &alias_clean) > MAX_ALIAS_EDIT_DISTANCE {
        return 0.0;
    }

    let surface_symbols: Vec<char> = surface_clean.chars().collect();
    let alias_symbols: Vec<char> = alias_clean.chars().collect();
    let aligned_prefix = surface_symbols.len().min(alias_symbols.len());

    let mut accumulated_score = 0.0;
    for position in 0..aligned_prefix {
        if surface_symbols[position] == alias_symbols[position] {
            accumulated_score += 1.0;
            continue;
        }

        let mut substitution_probability =
            confusion_probability(surface_symbols[position], alias_symbols[position]);

        // Evidencia empírica subrepresentada: piso curado.
        if substitution_probability < FLOOR_ACTIVATION_THRESHOLD
            && is_known_confusion(surface_symbols[position], alias_symbols[position])
        {
            substitution_probability = substitution_probability.max(KNOWN_CONFUSION_FLOOR);
        }

        accumulated_score += substitution_probability;
    }

    if surface_symbols.is_empty() {
        return 0.0;
    }

    accumulated_score / surface_symbols.len() as f64
}

/// Valida un alias candidato contra su superficie.
///
/// Puertas en orden: longitud 2–40, patrón sintáctico, distancia de
/// edición ≤ 2 (separadores removidos), score ponderado ≥ 0.5.
pub fn validate_alias(surface: &str, alias: &str) -> AliasVerdict {
    let normalized_alias = alias.trim().to_uppercase();
    let normalized_surface = surface.trim().to_uppercase();

    if normalized_alias.len() < 2 || normalized_alias.len() > 40 {
        return AliasVerdict { accepted: false, score: 0.0 };
    }

    if !ALIAS_SYNTAX_PATTERN.is_match(&normalized_alias) {
        return AliasVerdict { accepted: false, score: 0.0 };
    }

    let clean_surface = strip_separators(&normalized_surface);
    let clean_alias = strip_separators(&normalized_alias);

    if levenshtein_distance(&clean_surface, &clean_alias) > MAX_ALIAS_EDIT_DISTANCE {
        return AliasVerdict { accepted: false, score: 0.0 };
    }

    let score = confusion_weighted_score(&normalized_surface, &normalized_alias);

    AliasVerdict { accepted: score >= ALIAS_MAX_SCORE_THRESHOLD, score }
}
