// [apps/pipeline/src/stages/letter.rs]
/*!
 * =================================================================
 * APARATO: LETTER STAGE PROCESSOR (V6.1 - CLASSIFIER BRIDGE)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: FOTOGRAMA HOLÍSTICO → EVENTO DEL FLUJO DE LETRAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. POLICY FIRST: La política de mano única decide antes de tocar el
 *    clasificador; fotogramas multi-mano o vacíos emiten eventos de
 *    descarte con su motivo y jamás mutan estado de sesión.
 * 2. UNKNOWN IS ZERO: Índices de clase fuera del registro de etiquetas
 *    degradan a "Unknown" con confianza 0; la puerta de votos del
 *    motor los neutraliza aguas abajo.
 * 3. SCOPED SPANS: Extracción, preprocesamiento e inferencia corren en
 *    spans explícitos que degradan a no-op con el filtro apagado.
 * =================================================================
 */

use async_trait::async_trait;
use chrono::Utc;
use glossa_core_classifier::LetterClassifier;
use glossa_core_landmarks::{extract_dominant_hand, normalize_hand_points, HandExtraction};
use glossa_domain_models::{Handedness, LandmarkRecord, LetterEvent, SkipReason};
use glossa_infra_stream::{RecordProcessor, StreamBus, StreamRecord};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Procesador de la etapa de letras: consume el flujo de landmarks y
/// produce el flujo de letras, particionado por la misma sesión.
pub struct LetterStageProcessor {
    classifier: Arc<dyn LetterClassifier>,
    stream_bus: Arc<StreamBus>,
    letters_stream_name: String,
}

impl LetterStageProcessor {
    pub fn new(
        classifier: Arc<dyn LetterClassifier>,
        stream_bus: Arc<StreamBus>,
        letters_stream_name: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            stream_bus,
            letters_stream_name: letters_stream_name.into(),
        }
    }

    /// Clasifica un fotograma y construye su evento de letras.
    ///
    /// # Errors:
    /// Propaga violaciones de geometría (el registro se reporta y se
    /// descarta; el enlace del shard continúa).
    pub fn classify_frame(&self, frame: &LandmarkRecord) -> anyhow::Result<LetterEvent> {
        let processing_start = Instant::now();
        let inference_span = info_span!(
            "letter_inference",
            session = %frame.session_id,
            holistic_values = frame.landmarks.len()
        );
        let _span_guard = inference_span.enter();

        let extraction_verdict = extract_dominant_hand(&frame.landmarks)?;

        let (handedness, hand_points) = match extraction_verdict {
            HandExtraction::MultiHand => {
                debug!("🙌 [LETTER_STAGE]: Multi-hand frame vetoed for [{}].", frame.session_id);
                return Ok(self.build_skip_event(frame, SkipReason::MultiHand, true, processing_start));
            }
            HandExtraction::NoHands => {
                debug!("🫥 [LETTER_STAGE]: Empty frame vetoed for [{}].", frame.session_id);
                return Ok(self.build_skip_event(frame, SkipReason::NoHands, false, processing_start));
            }
            HandExtraction::SingleHand { handedness, points } => (handedness, points),
        };

        let feature_vector = normalize_hand_points(&hand_points)?;
        let inference_verdict = self.classifier.infer(&feature_vector)?;

        // Índice desconocido → "Unknown" con confianza 0 (contrato).
        let (predicted_label, confidence) =
            match self.classifier.label_for(inference_verdict.class_index) {
                Some(known_label) => (known_label.to_string(), inference_verdict.confidence),
                None => {
                    warn!(
                        "❓ [LETTER_STAGE]: Unknown class index {} for [{}].",
                        inference_verdict.class_index, frame.session_id
                    );
                    ("Unknown".to_string(), 0.0)
                }
            };

        let processing_time_ms = processing_start.elapsed().as_secs_f64() * 1000.0;

        info!(
            "🔤 [LETTER_STAGE]: '{}' (conf {:.2}, {} hand, {:.1}ms) for [{}].",
            predicted_label,
            confidence,
            match handedness {
                Handedness::Left => "left",
                Handedness::Right => "right",
            },
            processing_time_ms,
            frame.session_id
        );

        Ok(LetterEvent::Prediction {
            session_id: frame.session_id.clone(),
            connection_id: frame.connection_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            prediction: predicted_label,
            confidence,
            handedness,
            multi_hand: false,
            processing_time_ms,
            metadata: Some(json!({
                "source": "letter-engine",
                "model_type": "keypoint_classifier",
                "fingerspelling": true
            })),
        })
    }

    fn build_skip_event(
        &self,
        frame: &LandmarkRecord,
        skip_reason: SkipReason,
        multi_hand: bool,
        processing_start: Instant,
    ) -> LetterEvent {
        LetterEvent::Skip {
            session_id: frame.session_id.clone(),
            connection_id: frame.connection_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            skip_reason,
            multi_hand,
            processing_time_ms: processing_start.elapsed().as_secs_f64() * 1000.0,
            metadata: Some(json!({
                "source": "letter-engine",
                "message": match skip_reason {
                    SkipReason::MultiHand => "Multi-hand detected - likely word-level sign",
                    SkipReason::NoHands => "No hands detected",
                }
            })),
        }
    }
}

#[async_trait]
impl RecordProcessor for LetterStageProcessor {
    async fn process_record(&self, record: StreamRecord) -> anyhow::Result<()> {
        let frame: LandmarkRecord = serde_json::from_value(record.payload)?;

        if frame.landmarks.is_empty() {
            debug!("💤 [LETTER_STAGE]: Record without landmarks for [{}].", frame.session_id);
            return Ok(());
        }

        let letter_event = self.classify_frame(&frame)?;

        self.stream_bus.put_record(
            &self.letters_stream_name,
            letter_event.session_identifier(),
            &letter_event,
        )?;

        Ok(())
    }
}
