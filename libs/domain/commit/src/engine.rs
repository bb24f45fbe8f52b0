// [libs/domain/commit/src/engine.rs]
/*!
 * =================================================================
 * APARATO: SLIDING WINDOW COMMIT ENGINE (V6.2 - GATE TRINITY)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: VOTACIÓN, PUERTAS DE COMPROMISO Y PAUSA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. GATE TRINITY: Confianza promedio (θ_commit), estabilidad (S_ms)
 *    y anti-repetición (R_max) se evalúan en ese orden; la primera
 *    puerta que falla cancela el compromiso sin efectos secundarios.
 * 2. DETERMINISTIC TIME: El reloj viaja como parámetro explícito
 *    (epoch segundos); el motor jamás consulta el reloj del sistema.
 * 3. VOTE PREFERENCE: Empates de Σconf se resuelven por last_seen
 *    más reciente y luego lexicográficamente.
 *
 * # Mathematical Proof (Commit Soundness):
 * Toda letra anexada al buffer satisface Σconf/count ≥ θ_commit y
 * last_seen − first_seen ≥ S_ms sobre la ventana filtrada por
 * conf ≥ θ_vote: las tres puertas se evalúan sobre el mismo snapshot
 * de ventana obtenido tras la poda, sin releer estado intermedio.
 * =================================================================
 */

use crate::{CommitConfig, SessionStore, SessionStoreFault};
use glossa_domain_models::{is_alphabet_symbol, CommitCandidate, LetterObservation, WordBuffer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Motor de compromiso de letras sobre el almacén de sesión abstracto.
pub struct CommitEngine {
    session_store: Arc<dyn SessionStore>,
    config: CommitConfig,
}

impl CommitEngine {
    pub fn new(session_store: Arc<dyn SessionStore>, config: CommitConfig) -> Self {
        Self { session_store, config }
    }

    pub fn config(&self) -> &CommitConfig {
        &self.config
    }

    /// Procesa una predicción entrante y potencialmente compromete una letra.
    ///
    /// Devuelve el buffer actualizado si hubo compromiso, None si alguna
    /// puerta lo canceló.
    ///
    /// # Errors:
    /// Propaga fallos del almacén; el llamador degrada sin matar la sesión.
    pub async fn process_prediction(
        &self,
        session_id: &str,
        user_id: &str,
        predicted_char: char,
        confidence: f64,
        observed_at: f64,
        now: f64,
    ) -> Result<Option<WordBuffer>, SessionStoreFault> {
        // Guardia de alfabeto: símbolos desconocidos jamás entran a la ventana.
        if !is_alphabet_symbol(predicted_char) {
            warn!(
                "⚠️  [COMMIT_ENGINE]: Foreign symbol '{}' rejected for session [{}].",
                predicted_char, session_id
            );
            return Ok(None);
        }

        // 1. Anexar a la ventana deslizante (renueva TTL de sesión).
        let observation = LetterObservation {
            char: predicted_char,
            confidence,
            timestamp: observed_at,
        };
        self.session_store.window_push(session_id, observation).await?;

        // 2. Podar observaciones fuera de la ventana W.
        let window_cutoff = now - (self.config.window_duration_ms as f64 / 1000.0);
        self.session_store.window_prune(session_id, window_cutoff).await?;

        // 3. Ventana activa.
        let active_window = self.session_store.window_get(session_id).await?;
        if active_window.is_empty() {
            debug!("💤 [COMMIT_ENGINE]: Empty window for [{}].", session_id);
            return Ok(None);
        }

        // 4. Candidato superior por votación ponderada.
        let Some(top_candidate) =
            find_top_candidate(&active_window, self.config.vote_min_confidence)
        else {
            debug!("💤 [COMMIT_ENGINE]: No valid candidate for [{}].", session_id);
            return Ok(None);
        };

        debug!(
            "🗳️  [COMMIT_ENGINE]: Top candidate '{}' (Σconf: {:.2}, stability: {:.0}ms) for [{}].",
            top_candidate.char,
            top_candidate.aggregate_confidence,
            top_candidate.stability_duration_ms(),
            session_id
        );

        // 5. Puerta de confianza promedio.
        let average_confidence =
            top_candidate.aggregate_confidence / top_candidate.count as f64;
        if average_confidence < self.config.commit_min_confidence {
            debug!(
                "🚪 [GATE_CONFIDENCE]: '{}' below threshold ({:.2} < {:.2}).",
                top_candidate.char, average_confidence, self.config.commit_min_confidence
            );
            return Ok(None);
        }

        // 6. Puerta de estabilidad.
        if top_candidate.stability_duration_ms() < self.config.stability_duration_ms as f64 {
            debug!(
                "🚪 [GATE_STABILITY]: '{}' unstable ({:.0}ms < {}ms).",
                top_candidate.char,
                top_candidate.stability_duration_ms(),
                self.config.stability_duration_ms
            );
            return Ok(None);
        }

        // 7. Puerta anti-repetición sobre las últimas R_max letras.
        let current_buffer = self.session_store.buffer_get(session_id, user_id, now).await?;
        let repeat_arity = self.config.max_consecutive_repeats;
        if repeat_arity > 0 && current_buffer.letters.len() >= repeat_arity {
            let trailing_letters = &current_buffer.letters[current_buffer.letters.len() - repeat_arity..];
            if trailing_letters.iter().all(|letter| *letter == top_candidate.char) {
                debug!(
                    "🚪 [GATE_REPETITION]: '{}' already {}× consecutive in [{}].",
                    top_candidate.char, repeat_arity, session_id
                );
                return Ok(None);
            }
        }

        // 8. COMPROMISO.
        let updated_buffer = self
            .session_store
            .buffer_append(session_id, user_id, top_candidate.char, now)
            .await?;

        info!(
            "✓ [COMMITTED]: '{}' (conf={:.2}, stability={:.0}ms) → word '{}' ({}).",
            top_candidate.char,
            average_confidence,
            top_candidate.stability_duration_ms(),
            updated_buffer.current_word(),
            session_id
        );

        Ok(Some(updated_buffer))
    }

    /// Determina si la sesión acumula silencio suficiente (≥ P_ms) con
    /// buffer no vacío: la palabra debe finalizarse.
    pub async fn should_finalize(
        &self,
        session_id: &str,
        now: f64,
    ) -> Result<bool, SessionStoreFault> {
        let Some(resident_buffer) = self.session_store.buffer_peek(session_id).await? else {
            return Ok(false);
        };

        if resident_buffer.letters.is_empty() {
            return Ok(false);
        }

        let Some(silence_ms) = resident_buffer.time_since_last_commit_ms(now) else {
            return Ok(false);
        };

        if silence_ms >= self.config.pause_duration_ms as f64 {
            info!(
                "⏸️  [PAUSE_DETECTED]: {:.0}ms ≥ {}ms for [{}].",
                silence_ms, self.config.pause_duration_ms, session_id
            );
            return Ok(true);
        }

        Ok(false)
    }
}

/// Candidato superior de la ventana por votación ponderada por confianza.
///
/// Filtra observaciones con conf ≥ θ_vote, agrega Σconf / count /
/// first_seen / last_seen por carácter y selecciona el máximo Σconf.
/// Empates: last_seen más reciente, luego orden lexicográfico.
pub fn find_top_candidate(
    window: &[LetterObservation],
    vote_min_confidence: f64,
) -> Option<CommitCandidate> {
    let mut per_character_aggregates: HashMap<char, CommitCandidate> = HashMap::new();

    for observation in window {
        if observation.confidence < vote_min_confidence {
            continue;
        }

        per_character_aggregates
            .entry(observation.char)
            .and_modify(|aggregate| {
                aggregate.aggregate_confidence += observation.confidence;
                aggregate.count += 1;
                aggregate.first_seen = aggregate.first_seen.min(observation.timestamp);
                aggregate.last_seen = aggregate.last_seen.max(observation.timestamp);
            })
            .or_insert_with(|| CommitCandidate {
                char: observation.char,
                aggregate_confidence: observation.confidence,
                first_seen: observation.timestamp,
                last_seen: observation.timestamp,
                count: 1,
            });
    }

    per_character_aggregates.into_values().max_by(|left, right| {
        left.aggregate_confidence
            .partial_cmp(&right.aggregate_confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                left.last_seen
                    .partial_cmp(&right.last_seen)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            // max_by devuelve el último máximo: invertimos el orden de
            // caracteres para que gane el lexicográficamente menor.
            .then_with(|| right.char.cmp(&left.char))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(char: char, confidence: f64, timestamp: f64) -> LetterObservation {
        LetterObservation { char, confidence, timestamp }
    }

    #[test]
    fn low_confidence_observations_do_not_vote() {
        let window = vec![observation('A', 0.2, 1.0), observation('A', 0.1, 1.1)];
        assert!(find_top_candidate(&window, 0.3).is_none());
    }

    #[test]
    fn aggregate_confidence_beats_raw_count() {
        // A: 0.6+0.6 = 1.2 en dos votos; B: 0.9+0.8+0.7 = 2.4 en tres.
        let window = vec![
            observation('A', 0.6, 1.00),
            observation('B', 0.9, 1.01),
            observation('A', 0.6, 1.05),
            observation('B', 0.8, 1.10),
            observation('B', 0.7, 1.15),
        ];
        let candidate = find_top_candidate(&window, 0.3).expect("VOTE_FAULT");
        assert_eq!(candidate.char, 'B');
        assert!((candidate.aggregate_confidence - 2.4).abs() < 1e-12);
        assert_eq!(candidate.count, 3);
    }

    #[test]
    fn aggregates_track_first_and_last_appearance() {
        let window = vec![
            observation('K', 0.5, 2.0),
            observation('K', 0.5, 2.2),
            observation('K', 0.5, 2.1),
        ];
        let candidate = find_top_candidate(&window, 0.3).expect("VOTE_FAULT");
        assert_eq!(candidate.first_seen, 2.0);
        assert_eq!(candidate.last_seen, 2.2);
        assert!(candidate.last_seen >= candidate.first_seen);
        assert!((candidate.stability_duration_ms() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn confidence_ties_break_by_recency_then_lexicographic() {
        // Σconf idéntica (0.9); B es más reciente que A.
        let recency_window = vec![observation('A', 0.9, 1.0), observation('B', 0.9, 1.5)];
        assert_eq!(find_top_candidate(&recency_window, 0.3).unwrap().char, 'B');

        // Σconf y last_seen idénticos: gana el lexicográficamente menor.
        let lexical_window = vec![observation('C', 0.9, 1.0), observation('B', 0.9, 1.0)];
        assert_eq!(find_top_candidate(&lexical_window, 0.3).unwrap().char, 'B');
    }

    #[test]
    fn empty_window_has_no_candidate() {
        assert!(find_top_candidate(&[], 0.3).is_none());
    }
}
