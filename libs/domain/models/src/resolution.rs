// [libs/domain/models/src/resolution.rs]
/*!
 * =================================================================
 * APARATO: WORD RESOLUTION CONTRACTS (V2.4 - HYBRID RANK SEALED)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DE RESOLUCIÓN Y RANKING HÍBRIDO
 *
 * # Mathematical Proof (Hybrid Ordering):
 * hybrid = 0.7·atlas + 0.3·alias_confidence es monótono en ambos
 * componentes; el orden descendente con desempate por superficie
 * ascendente produce un ranking total determinista.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Ponderación del score opaco del índice en el ranking híbrido.
pub const HYBRID_ATLAS_WEIGHT: f64 = 0.7;
/// Ponderación de la confianza del alias en el ranking híbrido.
pub const HYBRID_ALIAS_WEIGHT: f64 = 0.3;
/// Cardinalidad máxima de resultados entregados al cliente.
pub const RESOLUTION_TOP_RESULTS: usize = 5;

/// Estrategia de búsqueda aplicada sobre el léxico.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Búsqueda difusa estándar (palabras completas con errores).
    Fuzzy,
    /// Finalización disparada por eventos de descarte (pausa larga).
    SkipEvent,
}

/// Resultado individual del índice léxico con su ranking híbrido.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Forma canónica de la entrada del léxico.
    pub surface: String,
    /// Score de relevancia opaco entregado por el índice.
    pub atlas_score: f64,
    /// Confianza almacenada del alias que produjo el match (0 si no hay).
    pub alias_confidence: f64,
    /// 0.7·atlas_score + 0.3·alias_confidence.
    pub hybrid_score: f64,
    /// Alias concreto que enlazó la consulta, si se identificó.
    pub matched_via: Option<String>,
}

impl SearchResult {
    /// Computa el score híbrido canónico a partir de sus componentes.
    pub fn hybrid_of(atlas_score: f64, alias_confidence: f64) -> f64 {
        atlas_score * HYBRID_ATLAS_WEIGHT + alias_confidence * HYBRID_ALIAS_WEIGHT
    }
}

/// Palabra finalizada con sus candidatos rankeados (top 5).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedWord {
    pub session_id: String,
    pub user_id: String,
    /// Secuencia cruda de letras comprometidas.
    pub raw_word: String,
    /// Resultados ordenados por score híbrido descendente.
    pub all_results: Vec<SearchResult>,
    /// Marca temporal ISO-8601 de la resolución.
    pub timestamp: String,
    pub search_method: SearchMethod,
}

impl ResolvedWord {
    /// Resolución vacía (degradación controlada del camino online).
    pub fn unresolved(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        raw_word: impl Into<String>,
        search_method: SearchMethod,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            raw_word: raw_word.into(),
            all_results: Vec::new(),
            timestamp: timestamp.into(),
            search_method,
        }
    }
}
