// [libs/domain/models/src/lexicon.rs]
/*!
 * =================================================================
 * APARATO: LEXICON CONTRACTS (V1.8 - PERSONALIZED STRATA)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE ENTRADAS DEL LÉXICO PERSONALIZADO
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use typeshare::typeshare;

/// Entrada del léxico personalizado, única por (surface, user_id).
/// La forja de alias es su único escritor; el camino online solo lee.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Forma canónica en mayúsculas.
    pub surface: String,
    /// Variantes de deletreo en mayúsculas (nunca contienen '_').
    pub aliases: Vec<String>,
    /// Mapa alias → score de confusión validado en [0, 1].
    pub confidence_scores: BTreeMap<String, f64>,
    pub user_id: String,
    /// Trabajo de forja que materializó esta entrada.
    pub source_job_id: Option<String>,
    /// Marca temporal ISO-8601 de la última materialización.
    pub updated_at: String,
}

impl LexiconEntry {
    /// Confianza almacenada para un alias concreto (0 si no existe).
    pub fn confidence_for(&self, alias: &str) -> f64 {
        self.confidence_scores.get(alias).copied().unwrap_or(0.0)
    }
}
