// [apps/pipeline/src/stages/word.rs]
/*!
 * =================================================================
 * APARATO: WORD STAGE PROCESSOR (V6.2 - FINALIZATION ATOMICITY)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: EVENTOS DE LETRAS → COMPROMISOS Y FINALIZACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TAGGED DISPATCH: La unión etiquetada del flujo de letras se
 *    desestructura una vez; predicciones alimentan el motor y los
 *    descartes solo consultan el detector de pausa.
 * 2. FINALIZATION ATOMICITY: Tras emitir una resolución, ventana y
 *    buffer quedan vacíos; la sesión renace con el siguiente frame.
 * 3. DEGRADED NEVER DEAD: Fallos del almacén omiten el compromiso del
 *    evento en curso y el enlace del shard continúa.
 * =================================================================
 */

use crate::epoch_seconds_now;
use async_trait::async_trait;
use chrono::Utc;
use glossa_domain_commit::{CommitEngine, SessionStore};
use glossa_domain_models::{LetterEvent, SearchMethod};
use glossa_domain_resolver::{ResolutionSink, WordResolver};
use glossa_infra_stream::{RecordProcessor, StreamRecord};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Finalizador de palabras: resuelve, entrega y limpia la sesión.
/// Compartido entre la etapa de palabras y el barrido de pausa.
pub struct WordFinalizer {
    session_store: Arc<dyn SessionStore>,
    word_resolver: Arc<WordResolver>,
    resolution_sink: Arc<dyn ResolutionSink>,
}

impl WordFinalizer {
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        word_resolver: Arc<WordResolver>,
        resolution_sink: Arc<dyn ResolutionSink>,
    ) -> Self {
        Self { session_store, word_resolver, resolution_sink }
    }

    /// Finaliza la palabra de una sesión: resolución, entrega y limpieza
    /// de ventana + buffer. Idempotente sobre sesiones sin palabra.
    pub async fn finalize_word(&self, session_id: &str, search_method: SearchMethod) {
        let resident_buffer = match self.session_store.buffer_peek(session_id).await {
            Ok(Some(buffer)) if !buffer.letters.is_empty() => buffer,
            Ok(_) => {
                debug!("💤 [FINALIZER]: No word to finalize for [{}].", session_id);
                return;
            }
            Err(store_fault) => {
                warn!("⚠️  [FINALIZER]: Buffer peek failed for [{}]: {}", session_id, store_fault);
                return;
            }
        };

        let raw_word = resident_buffer.current_word();
        info!("📤 [FINALIZER]: Finalizing word '{}' ({}).", raw_word, session_id);

        let resolved_word = self
            .word_resolver
            .resolve_word(
                session_id,
                &resident_buffer.user_id,
                &raw_word,
                search_method,
                &Utc::now().to_rfc3339(),
            )
            .await;

        if resolved_word.all_results.is_empty() {
            info!("📤 [FINALIZER]: '{}' → UNRESOLVED ({}).", raw_word, session_id);
        } else {
            info!("📤 [FINALIZER]: Top {} result(s) for '{}':", resolved_word.all_results.len(), raw_word);
            for (rank, result) in resolved_word.all_results.iter().enumerate() {
                info!(
                    "     {}. {:<20} (atlas: {:.3}, alias_conf: {:.3}, hybrid: {:.3})",
                    rank + 1,
                    result.surface,
                    result.atlas_score,
                    result.alias_confidence,
                    result.hybrid_score
                );
            }
        }

        // La entrega es fire-and-forget; jamás bloquea la limpieza.
        self.resolution_sink.deliver(&resolved_word).await;

        // Atomicidad de finalización: ventana y buffer quedan vacíos.
        if let Err(store_fault) = self.session_store.buffer_clear(session_id).await {
            warn!("⚠️  [FINALIZER]: Buffer clear failed for [{}]: {}", session_id, store_fault);
        }
        if let Err(store_fault) = self.session_store.window_clear(session_id).await {
            warn!("⚠️  [FINALIZER]: Window clear failed for [{}]: {}", session_id, store_fault);
        }
    }
}

/// Procesador de la etapa de palabras sobre el flujo de letras.
pub struct WordStageProcessor {
    commit_engine: Arc<CommitEngine>,
    finalizer: Arc<WordFinalizer>,
}

impl WordStageProcessor {
    pub fn new(commit_engine: Arc<CommitEngine>, finalizer: Arc<WordFinalizer>) -> Self {
        Self { commit_engine, finalizer }
    }

    async fn check_pause_and_finalize(&self, session_id: &str, search_method: SearchMethod) {
        let now = epoch_seconds_now();
        match self.commit_engine.should_finalize(session_id, now).await {
            Ok(true) => self.finalizer.finalize_word(session_id, search_method).await,
            Ok(false) => {}
            Err(store_fault) => {
                warn!("⚠️  [WORD_STAGE]: Pause check failed for [{}]: {}", session_id, store_fault);
            }
        }
    }
}

#[async_trait]
impl RecordProcessor for WordStageProcessor {
    async fn process_record(&self, record: StreamRecord) -> anyhow::Result<()> {
        let arrival_timestamp = record.arrival_timestamp;
        let letter_event: LetterEvent = serde_json::from_value(record.payload)?;

        match letter_event {
            LetterEvent::Prediction { session_id, prediction, confidence, .. } => {
                // Predicciones multi-símbolo ("Unknown") jamás votan.
                let mut prediction_symbols = prediction.chars();
                let (Some(predicted_symbol), None) =
                    (prediction_symbols.next(), prediction_symbols.next())
                else {
                    debug!(
                        "❓ [WORD_STAGE]: Non-atomic prediction '{}' ignored for [{}].",
                        prediction, session_id
                    );
                    return Ok(());
                };

                let now = epoch_seconds_now();
                let commit_outcome = self
                    .commit_engine
                    .process_prediction(
                        &session_id,
                        // La sesión actúa como usuario hasta que el gateway
                        // propague identidad propia.
                        &session_id,
                        predicted_symbol,
                        confidence,
                        arrival_timestamp,
                        now,
                    )
                    .await;

                if let Err(store_fault) = commit_outcome {
                    warn!(
                        "⚠️  [WORD_STAGE]: Commit skipped for [{}] (store degraded): {}",
                        session_id, store_fault
                    );
                }

                self.check_pause_and_finalize(&session_id, SearchMethod::Fuzzy).await;
            }
            LetterEvent::Skip { session_id, skip_reason, .. } => {
                debug!("⏭️  [WORD_STAGE]: Skip event ({:?}) for [{}].", skip_reason, session_id);
                // Los descartes no mutan la ventana: solo consultan la pausa.
                self.check_pause_and_finalize(&session_id, SearchMethod::SkipEvent).await;
            }
        }

        Ok(())
    }
}
