// [libs/domain/resolver/src/resolver.rs]
/*!
 * =================================================================
 * APARATO: HYBRID RANKING RESOLVER (V5.0 - DEGRADED NEVER DEAD)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: ESTRATEGIA ADAPTATIVA, MATCH DE ALIAS Y RANKING
 *
 * # Mathematical Proof (Total Deterministic Order):
 * El ranking ordena por hybrid descendente con desempate por
 * superficie ascendente; ambas claves son totales sobre los
 * candidatos, por lo que el top-5 entregado es único para un
 * conjunto de hits dado.
 * =================================================================
 */

use crate::{LexiconHit, LexiconIndex, AUTOCOMPLETE_MAX_QUERY_LENGTH, SEARCH_CANDIDATE_LIMIT};
use glossa_domain_confusion::{levenshtein_distance, strip_separators};
use glossa_domain_models::{
    ResolvedWord, SearchMethod, SearchResult, RESOLUTION_TOP_RESULTS,
};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Distancia de edición máxima para considerar un alias como match.
const ALIAS_MATCH_MAX_EDITS: usize = 2;

/// Resolutor de palabras deletreadas sobre el índice léxico abstracto.
pub struct WordResolver {
    lexicon_index: Arc<dyn LexiconIndex>,
}

impl WordResolver {
    pub fn new(lexicon_index: Arc<dyn LexiconIndex>) -> Self {
        Self { lexicon_index }
    }

    /// Resuelve una palabra cruda contra el léxico personalizado.
    ///
    /// Nunca falla: la indisponibilidad del índice degrada a una
    /// resolución vacía que el llamador entrega igualmente.
    pub async fn resolve_word(
        &self,
        session_id: &str,
        user_id: &str,
        raw_word: &str,
        search_method: SearchMethod,
        resolved_at_iso: &str,
    ) -> ResolvedWord {
        if raw_word.is_empty() {
            warn!("⚠️  [RESOLVER]: Empty word for session [{}].", session_id);
            return ResolvedWord::unresolved(session_id, user_id, "", search_method, resolved_at_iso);
        }

        info!(
            "🔍 [RESOLVER]: Resolving '{}' ({}, method: {:?}).",
            raw_word, session_id, search_method
        );

        // Estrategia adaptativa: prefijos cortos vs. palabras completas.
        let use_autocomplete = raw_word.len() <= AUTOCOMPLETE_MAX_QUERY_LENGTH;
        let search_outcome = if use_autocomplete {
            self.lexicon_index
                .search_autocomplete(raw_word, user_id, SEARCH_CANDIDATE_LIMIT)
                .await
        } else {
            self.lexicon_index
                .search_fuzzy(raw_word, user_id, SEARCH_CANDIDATE_LIMIT)
                .await
        };

        let candidate_hits = match search_outcome {
            Ok(hits) => hits,
            Err(index_fault) => {
                warn!(
                    "⚠️  [RESOLVER_DEGRADED]: Lexicon index unreachable for '{}': {}",
                    raw_word, index_fault
                );
                return ResolvedWord::unresolved(
                    session_id, user_id, raw_word, search_method, resolved_at_iso,
                );
            }
        };

        debug!(
            "📇 [RESOLVER]: Index returned {} candidate(s) for '{}' (strategy: {}).",
            candidate_hits.len(),
            raw_word,
            if use_autocomplete { "autocomplete" } else { "fuzzy" }
        );

        if candidate_hits.is_empty() {
            info!("❌ [RESOLVER]: No results for '{}'.", raw_word);
            return ResolvedWord::unresolved(
                session_id, user_id, raw_word, search_method, resolved_at_iso,
            );
        }

        // Re-ranking híbrido local sobre los candidatos del índice.
        let mut ranked_results: Vec<SearchResult> = candidate_hits
            .iter()
            .map(|hit| score_candidate(raw_word, hit))
            .collect();

        ranked_results.sort_by(|left, right| {
            right
                .hybrid_score
                .partial_cmp(&left.hybrid_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.surface.cmp(&right.surface))
        });
        ranked_results.truncate(RESOLUTION_TOP_RESULTS);

        info!(
            "✓ [RESOLVER]: '{}' resolved with {} result(s). Top: {}.",
            raw_word,
            ranked_results.len(),
            ranked_results
                .first()
                .map(|result| result.surface.as_str())
                .unwrap_or("∅")
        );

        ResolvedWord {
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            raw_word: raw_word.to_string(),
            all_results: ranked_results,
            timestamp: resolved_at_iso.to_string(),
            search_method,
        }
    }

}

/// Computa el resultado rankeado de un candidato del índice.
fn score_candidate(raw_query: &str, hit: &LexiconHit) -> SearchResult {
    let matched_alias = find_best_matching_alias(raw_query, &hit.entry.aliases)
        .unwrap_or_else(|| hit.entry.surface.clone());

    let alias_confidence = hit.entry.confidence_for(&matched_alias);
    let hybrid_score = SearchResult::hybrid_of(hit.atlas_score, alias_confidence);

    SearchResult {
        surface: hit.entry.surface.clone(),
        atlas_score: hit.atlas_score,
        alias_confidence,
        hybrid_score,
        matched_via: Some(matched_alias),
    }
}

/// Mejor alias para la consulta: match exacto (el alias literal gana
/// sobre variantes con separadores), luego prefijo/contención con menor
/// delta de longitud, luego menor distancia de edición ≤ 2.
pub fn find_best_matching_alias(raw_query: &str, aliases: &[String]) -> Option<String> {
    if aliases.is_empty() {
        return None;
    }

    let query_upper = raw_query.to_uppercase();
    let query_clean = strip_separators(&query_upper);
    let mut exact_variant: Option<&String> = None;
    let mut best_alias: Option<&String> = None;
    let mut best_distance = usize::MAX;

    for alias in aliases {
        let alias_upper = alias.to_uppercase();
        let alias_clean = strip_separators(&alias_upper);

        // (a) Match exacto. El alias literal retorna de inmediato; una
        // variante espaciada/guionada queda como candidata exacta.
        if alias_clean == query_clean {
            if alias_upper == query_upper {
                return Some(alias.clone());
            }
            exact_variant.get_or_insert(alias);
            continue;
        }

        // (b) Match de prefijo o contención (autocompletado).
        if alias_clean.starts_with(&query_clean) || alias_clean.contains(&query_clean) {
            let length_delta = alias_clean.len().abs_diff(query_clean.len());
            if length_delta < best_distance {
                best_distance = length_delta;
                best_alias = Some(alias);
            }
            continue;
        }

        // (c) Match por distancia de edición acotada.
        let edit_distance = levenshtein_distance(&alias_clean, &query_clean);
        if edit_distance <= ALIAS_MATCH_MAX_EDITS && edit_distance < best_distance {
            best_distance = edit_distance;
            best_alias = Some(alias);
        }
    }

    exact_variant.or(best_alias).cloned()
}
