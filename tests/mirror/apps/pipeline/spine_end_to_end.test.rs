// [tests/mirror/apps/pipeline/spine_end_to_end.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE LA COLUMNA VERTEBRAL (V3.0 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: FOTOGRAMA → LETRAS → COMPROMISO → RESOLUCIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FULL SPINE: Los fotogramas atraviesan el bus real, el fan-out
 *    real y ambas etapas; solo el clasificador y el índice léxico son
 *    dobles deterministas.
 * 2. POLICY PROOF: El fotograma multi-mano produce un evento de
 *    descarte y deja la ventana intacta (Ley de Mano Única).
 * 3. ATOMIC FINALE: Tras la resolución capturada, ventana y buffer
 *    de la sesión quedan vacíos.
 * =================================================================
 */

use async_trait::async_trait;
use glossa_core_classifier::{ClassifierFault, LetterClassifier, LetterInference, FALLBACK_LABELS};
use glossa_domain_commit::{CommitConfig, CommitEngine, InMemorySessionStore, SessionStore};
use glossa_domain_models::{
    LandmarkRecord, LetterEvent, ResolvedWord, SkipReason, SourceMeta, HOLISTIC_FRAME_VALUES,
};
use glossa_domain_resolver::{
    LexiconHit, LexiconIndex, LexiconIndexFault, ResolutionSink, WordResolver,
};
use glossa_infra_stream::{EnhancedFanoutConsumer, RecordProcessor, StreamBus, StreamConfig};
use glossa_pipeline::stages::{LetterStageProcessor, WordFinalizer, WordStageProcessor};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Doble determinista: todo fotograma de mano única es la letra 'A'.
struct AlwaysLetterA;

impl LetterClassifier for AlwaysLetterA {
    fn infer(&self, feature_vector: &[f64]) -> Result<LetterInference, ClassifierFault> {
        assert_eq!(feature_vector.len(), 40, "BRIDGE_FAULT: feature vector drifted");
        // Índice 10 = 'A' en el registro de 37 etiquetas.
        Ok(LetterInference { class_index: 10, confidence: 0.95 })
    }

    fn label_for(&self, class_index: usize) -> Option<&str> {
        FALLBACK_LABELS.get(class_index).copied()
    }
}

/// Índice léxico vacío: la resolución degrada sin candidatos.
struct EmptyIndex;

#[async_trait]
impl LexiconIndex for EmptyIndex {
    async fn search_autocomplete(
        &self,
        _query: &str,
        _user_id: &str,
        _limit: usize,
    ) -> Result<Vec<LexiconHit>, LexiconIndexFault> {
        Ok(Vec::new())
    }

    async fn search_fuzzy(
        &self,
        _query: &str,
        _user_id: &str,
        _limit: usize,
    ) -> Result<Vec<LexiconHit>, LexiconIndexFault> {
        Ok(Vec::new())
    }
}

/// Sumidero capturador de resoluciones entregadas.
#[derive(Default)]
struct CapturingSink {
    deliveries: Mutex<Vec<ResolvedWord>>,
}

#[async_trait]
impl ResolutionSink for CapturingSink {
    async fn deliver(&self, resolved_word: &ResolvedWord) {
        self.deliveries.lock().unwrap().push(resolved_word.clone());
    }
}

fn single_right_hand_frame(session: &str) -> LandmarkRecord {
    let mut landmarks = vec![0.0; HOLISTIC_FRAME_VALUES];
    for (offset, slot) in landmarks[1599..1662].iter_mut().enumerate() {
        *slot = 0.2 + (offset as f64) * 0.005;
    }
    frame_of(session, landmarks)
}

fn multi_hand_frame(session: &str) -> LandmarkRecord {
    let mut landmarks = vec![0.0; HOLISTIC_FRAME_VALUES];
    for block_offset in [1536, 1599] {
        for slot in landmarks[block_offset..block_offset + 63].iter_mut() {
            *slot = 0.3;
        }
    }
    frame_of(session, landmarks)
}

fn empty_hands_frame(session: &str) -> LandmarkRecord {
    frame_of(session, vec![0.0; HOLISTIC_FRAME_VALUES])
}

fn frame_of(session: &str, landmarks: Vec<f64>) -> LandmarkRecord {
    LandmarkRecord {
        session_id: session.into(),
        connection_id: format!("conn-{session}"),
        timestamp: "2026-02-11T12:00:00Z".into(),
        landmarks,
        metadata: SourceMeta { source: "audit".into(), event_time: None },
    }
}

#[tokio::test]
async fn frames_flow_through_both_stages_into_a_captured_resolution() {
    println!("\n🏔️  [INICIO]: Auditoría de extremo a extremo de la columna...");

    // --- 1. SETUP: bus real con dos flujos y arrendamientos amplios ---
    let stream_bus = Arc::new(StreamBus::new());
    for stream_name in ["landmarks", "letters"] {
        stream_bus
            .create_stream(StreamConfig {
                name: stream_name.into(),
                shard_count: 2,
                retention_records_per_shard: 256,
                subscription_lease: Duration::from_secs(30),
                heartbeat_interval: Duration::from_millis(100),
            })
            .expect("BUS_FAULT");
    }

    // Motor calibrado para la cadencia de la suite: estabilidad 50 ms,
    // pausa 300 ms (el reloj es el de pared en este estrato).
    let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let commit_engine = Arc::new(CommitEngine::new(
        Arc::clone(&session_store),
        CommitConfig {
            window_duration_ms: 5000,
            stability_duration_ms: 50,
            vote_min_confidence: 0.3,
            commit_min_confidence: 0.4,
            pause_duration_ms: 300,
            max_consecutive_repeats: 1,
            session_ttl_seconds: 300,
        },
    ));

    let capturing_sink = Arc::new(CapturingSink::default());
    let word_resolver = Arc::new(WordResolver::new(Arc::new(EmptyIndex)));
    let word_finalizer = Arc::new(WordFinalizer::new(
        Arc::clone(&session_store),
        word_resolver,
        Arc::clone(&capturing_sink) as Arc<dyn ResolutionSink>,
    ));

    let (shutdown_sender, shutdown_signal) = watch::channel(false);

    // --- 2. IGNICIÓN DE AMBAS ETAPAS SOBRE EL FAN-OUT REAL ---
    let letter_supervisor = EnhancedFanoutConsumer::ignite(
        Arc::clone(&stream_bus),
        "landmarks",
        "letter-engine-audit",
        Arc::new(LetterStageProcessor::new(
            Arc::new(AlwaysLetterA),
            Arc::clone(&stream_bus),
            "letters",
        )) as Arc<dyn RecordProcessor>,
        shutdown_signal.clone(),
    )
    .await
    .expect("FANOUT_FAULT");

    let word_supervisor = EnhancedFanoutConsumer::ignite(
        Arc::clone(&stream_bus),
        "letters",
        "word-engine-audit",
        Arc::new(WordStageProcessor::new(commit_engine, Arc::clone(&word_finalizer)))
            as Arc<dyn RecordProcessor>,
        shutdown_signal.clone(),
    )
    .await
    .expect("FANOUT_FAULT");

    tokio::time::sleep(Duration::from_millis(100)).await;

    // --- 3. FASE MULTI-MANO: descarte sin mutación de ventana ---
    println!("   🧪 Fase 1: Fotograma multi-mano (Ley de Mano Única)...");
    stream_bus
        .put_record("landmarks", "sess-spine", &multi_hand_frame("sess-spine"))
        .expect("BUS_FAULT");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(
        session_store.window_get("sess-spine").await.expect("STORE_FAULT").is_empty(),
        "POLICY_FAULT: multi-hand frame mutated the window"
    );

    // --- 4. FASE DE COMPROMISO: ráfaga estable de 'A' ---
    println!("   🧪 Fase 2: Ráfaga estable de mano derecha...");
    for _ in 0..4 {
        stream_bus
            .put_record("landmarks", "sess-spine", &single_right_hand_frame("sess-spine"))
            .expect("BUS_FAULT");
        tokio::time::sleep(Duration::from_millis(40)).await;
    }

    // --- 5. FASE DE PAUSA: silencio + evento de descarte como gatillo ---
    println!("   🧪 Fase 3: Pausa y finalización...");
    tokio::time::sleep(Duration::from_millis(400)).await;
    stream_bus
        .put_record("landmarks", "sess-spine", &empty_hands_frame("sess-spine"))
        .expect("BUS_FAULT");

    // Drenaje de la resolución capturada.
    let mut captured: Option<ResolvedWord> = None;
    for _ in 0..40 {
        if let Some(delivery) = capturing_sink.deliveries.lock().unwrap().first().cloned() {
            captured = Some(delivery);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    shutdown_sender.send(true).expect("SHUTDOWN_FAULT");
    letter_supervisor.join().await;
    word_supervisor.join().await;

    // --- 6. SENTENCIA ---
    let resolved = captured.expect("SPINE_FAULT: no resolution was delivered");
    assert_eq!(resolved.session_id, "sess-spine");
    assert_eq!(resolved.raw_word, "A", "SPINE_FAULT: unexpected committed word");
    assert!(resolved.all_results.is_empty(), "INDEX_FAULT: empty index produced hits");

    // Atomicidad de finalización sobre el almacén compartido.
    assert!(session_store.window_get("sess-spine").await.expect("STORE_FAULT").is_empty());
    assert!(session_store.buffer_peek("sess-spine").await.expect("STORE_FAULT").is_none());

    println!("🏁 [INFORME]: Columna certificada de extremo a extremo.");
}

#[tokio::test]
async fn classifier_bridge_emits_tagged_skip_events() {
    // Certificación directa del puente: ambos motivos de descarte.
    let stream_bus = Arc::new(StreamBus::new());
    stream_bus.create_stream(StreamConfig::nominal("letters")).expect("BUS_FAULT");

    let bridge = LetterStageProcessor::new(Arc::new(AlwaysLetterA), stream_bus, "letters");

    match bridge.classify_frame(&multi_hand_frame("sess-skip")).expect("BRIDGE_FAULT") {
        LetterEvent::Skip { skip_reason, multi_hand, .. } => {
            assert_eq!(skip_reason, SkipReason::MultiHand);
            assert!(multi_hand);
        }
        other => panic!("POLICY_FAULT: expected skip, got {other:?}"),
    }

    match bridge.classify_frame(&empty_hands_frame("sess-skip")).expect("BRIDGE_FAULT") {
        LetterEvent::Skip { skip_reason, multi_hand, .. } => {
            assert_eq!(skip_reason, SkipReason::NoHands);
            assert!(!multi_hand);
        }
        other => panic!("POLICY_FAULT: expected skip, got {other:?}"),
    }

    match bridge.classify_frame(&single_right_hand_frame("sess-skip")).expect("BRIDGE_FAULT") {
        LetterEvent::Prediction { prediction, confidence, multi_hand, .. } => {
            assert_eq!(prediction, "A");
            assert!((confidence - 0.95).abs() < 1e-12);
            assert!(!multi_hand);
        }
        other => panic!("BRIDGE_FAULT: expected prediction, got {other:?}"),
    }
}
