// [libs/infra/db/src/repositories/lexicon/mod.rs]
/*!
 * =================================================================
 * APARATO: LEXICON REPOSITORY (V4.2 - ADAPTIVE SEARCH ENGINE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: UPSERT DEL LÉXICO Y BÚSQUEDA ADAPTATIVA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TWO-PHASE SEARCH: SQL prefiltra por usuario; el escrutinio de
 *    relevancia (prefijo con 1 edición / difusa con 2 ediciones sobre
 *    superficie y alias conjuntamente) corre en el repositorio y
 *    produce el score opaco que consume el resolutor.
 * 2. WRITER MONOPOLY: La forja de alias es el único escritor; el
 *    camino online es estrictamente de lectura.
 *
 * # Mathematical Proof (Relevance Monotonicity):
 * score(consulta, valor) = ((L − d) / L) · (1 + 1/(1 + Δlen)) con
 * L = max(|consulta|, |valor|): decrece con la distancia d y con el
 * delta de longitud, y alcanza su máximo 2.0 en el match exacto.
 * =================================================================
 */

pub mod queries;

use crate::client::GlossaDbClient;
use crate::errors::DbError;
use crate::with_store_deadline;
use async_trait::async_trait;
use glossa_domain_confusion::{levenshtein_distance, strip_separators};
use glossa_domain_models::LexiconEntry;
use glossa_domain_resolver::{LexiconHit, LexiconIndex, LexiconIndexFault};
use libsql::params;
use self::queries as sql_registry;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Ediciones toleradas por la estrategia de autocompletado.
const AUTOCOMPLETE_MAX_EDITS: usize = 1;
/// Ediciones toleradas por la búsqueda difusa.
const FUZZY_MAX_EDITS: usize = 2;

/// Repositorio del índice léxico personalizado.
pub struct LexiconRepository {
    database_client: GlossaDbClient,
}

impl LexiconRepository {
    pub fn new(database_client: GlossaDbClient) -> Self {
        Self { database_client }
    }

    /// Materializa (o reemplaza) una entrada del léxico.
    pub async fn upsert_entry(&self, entry: &LexiconEntry) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;

        let aliases_json = serde_json::to_string(&entry.aliases)
            .map_err(|encode_fault| DbError::MappingError(encode_fault.to_string()))?;
        let scores_json = serde_json::to_string(&entry.confidence_scores)
            .map_err(|encode_fault| DbError::MappingError(encode_fault.to_string()))?;

        connection
            .execute(
                sql_registry::UPSERT_ENTRY,
                params![
                    entry.surface.as_str(),
                    entry.user_id.as_str(),
                    aliases_json,
                    scores_json,
                    entry.source_job_id.clone().unwrap_or_default(),
                    entry.aliases.len() as i64,
                    entry.updated_at.as_str()
                ],
            )
            .await?;

        info!(
            "📚 [LEXICON]: Entry [{}] materialized for user [{}] ({} aliases).",
            entry.surface,
            entry.user_id,
            entry.aliases.len()
        );
        Ok(())
    }

    /// Entrada puntual del léxico (inspección y suites).
    pub async fn fetch_entry(
        &self,
        surface: &str,
        user_id: &str,
    ) -> Result<Option<LexiconEntry>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut entry_rows = connection
            .query(sql_registry::FETCH_ENTRY, params![surface, user_id])
            .await?;

        match entry_rows.next().await? {
            Some(entry_row) => Ok(Some(map_row_to_entry(&entry_row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_user_entries(&self, user_id: &str) -> Result<Vec<LexiconEntry>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut entry_rows = connection
            .query(sql_registry::FETCH_USER_ENTRIES, params![user_id])
            .await?;

        let mut entries = Vec::new();
        while let Some(entry_row) = entry_rows.next().await? {
            entries.push(map_row_to_entry(&entry_row)?);
        }
        Ok(entries)
    }

    async fn execute_search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
        prefix_mode: bool,
    ) -> Result<Vec<LexiconHit>, DbError> {
        let candidate_entries = self.fetch_user_entries(user_id).await?;
        let normalized_query = strip_separators(&query.to_uppercase());

        let mut scored_hits: Vec<LexiconHit> = candidate_entries
            .into_iter()
            .filter_map(|entry| {
                let relevance = best_relevance_over_paths(&normalized_query, &entry, prefix_mode);
                relevance.map(|atlas_score| LexiconHit { entry, atlas_score })
            })
            .collect();

        scored_hits.sort_by(|left, right| {
            right
                .atlas_score
                .partial_cmp(&left.atlas_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.entry.surface.cmp(&right.entry.surface))
        });
        scored_hits.truncate(limit);

        debug!(
            "🔎 [LEXICON]: '{}' → {} hit(s) (strategy: {}).",
            query,
            scored_hits.len(),
            if prefix_mode { "autocomplete" } else { "fuzzy" }
        );
        Ok(scored_hits)
    }
}

#[async_trait]
impl LexiconIndex for LexiconRepository {
    async fn search_autocomplete(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<LexiconHit>, LexiconIndexFault> {
        with_store_deadline(
            "lexicon_autocomplete",
            self.execute_search(query, user_id, limit, true),
        )
        .await
        .map_err(DbError::into_lexicon_fault)
    }

    async fn search_fuzzy(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<LexiconHit>, LexiconIndexFault> {
        with_store_deadline(
            "lexicon_fuzzy",
            self.execute_search(query, user_id, limit, false),
        )
        .await
        .map_err(DbError::into_lexicon_fault)
    }
}

/// Mejor relevancia de la consulta sobre los caminos surface + aliases.
/// None si ningún camino satisface la tolerancia de la estrategia.
fn best_relevance_over_paths(
    normalized_query: &str,
    entry: &LexiconEntry,
    prefix_mode: bool,
) -> Option<f64> {
    let mut search_paths: Vec<String> = Vec::with_capacity(entry.aliases.len() + 1);
    search_paths.push(strip_separators(&entry.surface.to_uppercase()));
    search_paths
        .extend(entry.aliases.iter().map(|alias| strip_separators(&alias.to_uppercase())));

    search_paths
        .into_iter()
        .filter_map(|path_value| {
            if prefix_mode {
                prefix_relevance(normalized_query, &path_value)
            } else {
                fuzzy_relevance(normalized_query, &path_value)
            }
        })
        .fold(None, |best, candidate| match best {
            Some(current) if current >= candidate => Some(current),
            _ => Some(candidate),
        })
}

/// Relevancia de autocompletado: la consulta contra el prefijo del
/// valor de su misma longitud, tolerando 1 edición.
fn prefix_relevance(normalized_query: &str, path_value: &str) -> Option<f64> {
    if normalized_query.is_empty() || path_value.is_empty() {
        return None;
    }

    let prefix_length = normalized_query.chars().count().min(path_value.chars().count());
    let value_prefix: String = path_value.chars().take(prefix_length).collect();

    let edit_distance = levenshtein_distance(normalized_query, &value_prefix);
    if edit_distance > AUTOCOMPLETE_MAX_EDITS {
        return None;
    }

    Some(relevance_score(normalized_query, path_value, edit_distance))
}

/// Relevancia difusa: la consulta contra el valor completo, tolerando
/// 2 ediciones (prefixLength = 0: sin ancla obligatoria).
fn fuzzy_relevance(normalized_query: &str, path_value: &str) -> Option<f64> {
    if normalized_query.is_empty() || path_value.is_empty() {
        return None;
    }

    let edit_distance = levenshtein_distance(normalized_query, path_value);
    if edit_distance > FUZZY_MAX_EDITS {
        return None;
    }

    Some(relevance_score(normalized_query, path_value, edit_distance))
}

/// Score de relevancia opaco entregado al resolutor.
fn relevance_score(normalized_query: &str, path_value: &str, edit_distance: usize) -> f64 {
    let query_length = normalized_query.chars().count();
    let value_length = path_value.chars().count();
    let aligned_length = query_length.max(value_length) as f64;

    let closeness = (aligned_length - edit_distance as f64) / aligned_length;
    let length_affinity = 1.0 + 1.0 / (1.0 + query_length.abs_diff(value_length) as f64);

    closeness * length_affinity
}

fn map_row_to_entry(entry_row: &libsql::Row) -> Result<LexiconEntry, DbError> {
    let aliases_json: String = entry_row.get(2)?;
    let scores_json: String = entry_row.get(3)?;

    let aliases: Vec<String> = serde_json::from_str(&aliases_json)
        .map_err(|decode_fault| DbError::MappingError(decode_fault.to_string()))?;
    let confidence_scores: BTreeMap<String, f64> = serde_json::from_str(&scores_json)
        .map_err(|decode_fault| DbError::MappingError(decode_fault.to_string()))?;

    let source_job_id: Option<String> =
        entry_row.get::<String>(4).ok().filter(|job_id| !job_id.is_empty());

    Ok(LexiconEntry {
        surface: entry_row.get(0)?,
        user_id: entry_row.get(1)?,
        aliases,
        confidence_scores,
        source_job_id,
        updated_at: entry_row.get(5)?,
    })
}
