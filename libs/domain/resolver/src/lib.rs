// [libs/domain/resolver/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORD RESOLVER FACADE (V3.2 - ADAPTIVE SEARCH LAW)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL ÍNDICE LÉXICO Y CAPACIDAD DE SALIDA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ADAPTIVE SEARCH LAW: Consultas cortas (≤ 3 símbolos) usan
 *    autocompletado con maxEdits=1; consultas largas usan búsqueda
 *    difusa con maxEdits=2 sobre superficies y alias conjuntamente.
 * 2. READ ONLY ONLINE: El resolutor jamás muta el léxico; la forja
 *    de alias es el único escritor.
 * 3. SINK CAPABILITY: El resolutor entrega palabras resueltas a una
 *    capacidad abstracta de salida; nada del transporte saliente se
 *    filtra hacia el motor de compromiso.
 * =================================================================
 */

pub mod resolver;

pub use resolver::{find_best_matching_alias, WordResolver};

use async_trait::async_trait;
use glossa_domain_models::{LexiconEntry, ResolvedWord};
use thiserror::Error;

/// Longitud máxima de consulta para la estrategia de autocompletado.
pub const AUTOCOMPLETE_MAX_QUERY_LENGTH: usize = 3;
/// Candidatos solicitados al índice para el re-ranking híbrido local.
pub const SEARCH_CANDIDATE_LIMIT: usize = 20;

/// Catálogo semántico de fallos del índice léxico.
#[derive(Error, Debug)]
pub enum LexiconIndexFault {
    /// El índice no responde (el camino online degrada a resolución vacía).
    #[error("[L2_LEXICON_FAULT]: INDEX_UNAVAILABLE -> {0}")]
    Unavailable(String),

    /// La consulta agotó su plazo explícito.
    #[error("[L2_LEXICON_FAULT]: INDEX_DEADLINE_EXCEEDED -> {0}")]
    DeadlineExceeded(String),
}

/// Candidato devuelto por el índice con su score de relevancia opaco.
#[derive(Debug, Clone)]
pub struct LexiconHit {
    pub entry: LexiconEntry,
    /// Relevancia opaca del índice (componente 0.7 del ranking híbrido).
    pub atlas_score: f64,
}

/// Contrato de búsqueda adaptativa sobre el léxico personalizado.
#[async_trait]
pub trait LexiconIndex: Send + Sync {
    /// Autocompletado con tolerancia de 1 edición sobre prefijos de
    /// alias o superficie, restringido por usuario.
    async fn search_autocomplete(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<LexiconHit>, LexiconIndexFault>;

    /// Búsqueda difusa (≤ 2 ediciones) sobre alias y superficie
    /// conjuntamente, restringida por usuario.
    async fn search_fuzzy(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<LexiconHit>, LexiconIndexFault>;
}

/// Capacidad abstracta de entrega de palabras resueltas.
/// El despachador saliente la implementa en producción; las suites
/// capturan las entregas en RAM.
#[async_trait]
pub trait ResolutionSink: Send + Sync {
    /// Entrega asíncrona sin contrato de respuesta.
    async fn deliver(&self, resolved_word: &ResolvedWord);
}
