// [tests/mirror/libs/domain/commit/commit_scenarios.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE ESCENARIOS DE COMPROMISO (V3.0 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: AUDITORÍA DE PUERTAS, VOTACIÓN Y PAUSA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DETERMINISTIC CHRONOLOGY: El reloj viaja como parámetro; los
 *    escenarios reproducen cronologías exactas sin dormir el reactor.
 * 2. GATE ARITHMETIC IS LAW: La aritmética de §gates (θ_vote 0.3,
 *    θ_commit 0.4, estabilidad S, ventana W) se certifica contra
 *    cronologías de referencia del sistema en producción.
 * =================================================================
 */

use glossa_domain_commit::{CommitConfig, CommitEngine, InMemorySessionStore, SessionStore};
use std::sync::Arc;

/// Epoch base de las cronologías simuladas.
const T0: f64 = 1000.0;

fn engine_with(config: CommitConfig) -> (CommitEngine, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let engine = CommitEngine::new(store.clone() as Arc<dyn SessionStore>, config);
    (engine, store)
}

fn reference_config() -> CommitConfig {
    CommitConfig {
        window_duration_ms: 300,
        stability_duration_ms: 200,
        vote_min_confidence: 0.3,
        commit_min_confidence: 0.4,
        pause_duration_ms: 2000,
        max_consecutive_repeats: 1,
        session_ttl_seconds: 300,
    }
}

/// Conduce un compromiso de 'letter' sellado en commit_time: tres
/// observaciones a −250 ms, −120 ms y 0 ms del instante de compromiso
/// (span 250 ms ≥ S, confianza 0.9).
async fn drive_commit(engine: &CommitEngine, session: &str, letter: char, commit_time: f64) {
    for offset in [-0.25, -0.12, 0.0] {
        let observed_at = commit_time + offset;
        engine
            .process_prediction(session, session, letter, 0.9, observed_at, observed_at)
            .await
            .expect("STORE_FAULT");
    }
}

#[tokio::test]
async fn scenario_stable_letter_commits_after_the_fourth_observation() {
    println!("\n🗳️  [ESCENARIO 1]: Compromiso de 'A' estable...");

    // El span de la cronología de referencia es 150 ms: la puerta se
    // pina en 150 ms para el caso de compromiso.
    let mut config = reference_config();
    config.stability_duration_ms = 150;
    let (engine, _) = engine_with(config);

    let chronology = [(0.000, 0.9), (0.050, 0.8), (0.100, 0.9), (0.150, 0.9)];
    let mut commit_outcomes = Vec::new();

    for (offset, confidence) in chronology {
        let timestamp = T0 + offset;
        let outcome = engine
            .process_prediction("sess-1", "user-1", 'A', confidence, timestamp, timestamp)
            .await
            .expect("STORE_FAULT");
        commit_outcomes.push(outcome);
    }

    assert!(commit_outcomes[0].is_none(), "GATE_FAULT: first observation committed");
    assert!(commit_outcomes[1].is_none());
    assert!(commit_outcomes[2].is_none(), "GATE_FAULT: 100ms span passed a 150ms gate");

    let final_buffer = commit_outcomes[3].as_ref().expect("COMMIT_FAULT: stable A rejected");
    assert_eq!(final_buffer.current_word(), "A");
    println!("   ✅ Compromiso único de 'A' tras la 4ª observación.");
}

#[tokio::test]
async fn scenario_same_window_fails_the_production_stability_gate() {
    // Compañero del escenario 1: con S = 200 ms el mismo span de
    // 150 ms NO compromete (la aritmética de la puerta es normativa).
    let (engine, _) = engine_with(reference_config());

    for (offset, confidence) in [(0.000, 0.9), (0.050, 0.8), (0.100, 0.9), (0.150, 0.9)] {
        let timestamp = T0 + offset;
        let outcome = engine
            .process_prediction("sess-1b", "user-1", 'A', confidence, timestamp, timestamp)
            .await
            .expect("STORE_FAULT");
        assert!(outcome.is_none(), "GATE_FAULT: 150ms span passed a 200ms gate");
    }
}

#[tokio::test]
async fn scenario_unstable_prediction_is_rejected() {
    println!("\n🚪 [ESCENARIO 2]: Rechazo por inestabilidad...");
    let (engine, _) = engine_with(reference_config());

    for offset in [0.000, 0.050] {
        let timestamp = T0 + offset;
        let outcome = engine
            .process_prediction("sess-2", "user-2", 'A', 0.9, timestamp, timestamp)
            .await
            .expect("STORE_FAULT");
        assert!(outcome.is_none(), "GATE_FAULT: 50ms of dominance committed");
    }
    println!("   ✅ 50 ms de dominancia no comprometen con S = 200 ms.");
}

#[tokio::test]
async fn scenario_vote_prefers_the_aggregate_confidence_winner() {
    println!("\n🗳️  [ESCENARIO 3]: Preferencia de voto por Σconf...");
    let (engine, store) = engine_with(reference_config());

    let chronology = [('A', 0.6, 0.000), ('B', 0.9, 0.030), ('A', 0.6, 0.070), ('B', 0.8, 0.110), ('B', 0.7, 0.150)];
    for (letter, confidence, offset) in chronology {
        let timestamp = T0 + offset;
        let outcome = engine
            .process_prediction("sess-3", "user-3", letter, confidence, timestamp, timestamp)
            .await
            .expect("STORE_FAULT");
        // B domina el Σconf pero su dominancia (120 ms) no pasa S = 200 ms.
        assert!(outcome.is_none());
    }

    let window = store.window_get("sess-3").await.expect("STORE_FAULT");
    let candidate = glossa_domain_commit::find_top_candidate(&window, 0.3).expect("VOTE_FAULT");
    assert_eq!(candidate.char, 'B', "VOTE_FAULT: aggregate confidence ignored");
    assert!((candidate.aggregate_confidence - 2.4).abs() < 1e-9);
    println!("   ✅ 'B' es el candidato (Σ 2.4 vs 1.2); las puertas deciden el compromiso.");
}

#[tokio::test]
async fn scenario_anti_repetition_blocks_the_immediate_double() {
    println!("\n🔁 [ESCENARIO 4]: Anti-repetición con R_max = 1...");
    let (engine, store) = engine_with(reference_config());

    drive_commit(&engine, "sess-4", 'A', T0).await;
    let buffer = store.buffer_peek("sess-4").await.expect("STORE_FAULT").expect("BUFFER_FAULT");
    assert_eq!(buffer.current_word(), "A");

    // Una segunda 'A' estable sin letras intermedias debe rechazarse.
    drive_commit(&engine, "sess-4", 'A', T0 + 1.0).await;
    let buffer = store.buffer_peek("sess-4").await.expect("STORE_FAULT").expect("BUFFER_FAULT");
    assert_eq!(buffer.current_word(), "A", "REPETITION_FAULT: AA slipped through R_max=1");
    println!("   ✅ El doblete inmediato queda vetado.");
}

#[tokio::test]
async fn anti_repetition_arity_two_allows_the_double_but_not_the_triple() {
    // Regla documentada del origen ("AA sí, AAA no") bajo R_max = 2.
    let mut config = reference_config();
    config.max_consecutive_repeats = 2;
    let (engine, store) = engine_with(config);

    drive_commit(&engine, "sess-4b", 'A', T0).await;
    drive_commit(&engine, "sess-4b", 'A', T0 + 1.0).await;
    drive_commit(&engine, "sess-4b", 'A', T0 + 2.0).await;

    let buffer = store.buffer_peek("sess-4b").await.expect("STORE_FAULT").expect("BUFFER_FAULT");
    assert_eq!(buffer.current_word(), "AA", "REPETITION_FAULT: arity-2 rule broken");
}

#[tokio::test]
async fn scenario_pause_finalizes_the_word_and_clears_the_session() {
    println!("\n⏸️  [ESCENARIO 5]: Finalización por pausa...");
    let (engine, store) = engine_with(reference_config());

    // Compromisos de A, W, S sellados en 0 / 300 / 600 ms.
    drive_commit(&engine, "sess-5", 'A', T0 + 0.0).await;
    drive_commit(&engine, "sess-5", 'W', T0 + 0.3).await;
    drive_commit(&engine, "sess-5", 'S', T0 + 0.6).await;

    let buffer = store.buffer_peek("sess-5").await.expect("STORE_FAULT").expect("BUFFER_FAULT");
    assert_eq!(buffer.current_word(), "AWS", "COMMIT_FAULT: chronology broke the word");

    // A 2.1 s del último compromiso la pausa de 2 s está agotada.
    assert!(!engine.should_finalize("sess-5", T0 + 1.5).await.expect("STORE_FAULT"));
    assert!(engine.should_finalize("sess-5", T0 + 2.7).await.expect("STORE_FAULT"));

    // Atomicidad de finalización: ventana y buffer quedan vacíos.
    store.buffer_clear("sess-5").await.expect("STORE_FAULT");
    store.window_clear("sess-5").await.expect("STORE_FAULT");
    assert!(store.buffer_peek("sess-5").await.expect("STORE_FAULT").is_none());
    assert!(store.window_get("sess-5").await.expect("STORE_FAULT").is_empty());
    println!("   ✅ 'AWS' finaliza a los 2.7 s y la sesión queda limpia.");
}

#[tokio::test]
async fn replaying_a_committed_record_yields_no_second_commit() {
    // At-least-once: el mismo registro re-entregado no re-compromete
    // mientras el almacén conserve el resultado.
    let (engine, store) = engine_with(reference_config());

    drive_commit(&engine, "sess-6", 'K', T0).await;
    let buffer = store.buffer_peek("sess-6").await.expect("STORE_FAULT").expect("BUFFER_FAULT");
    assert_eq!(buffer.current_word(), "K");

    // Re-entrega exacta de la última observación.
    let replay_outcome = engine
        .process_prediction("sess-6", "sess-6", 'K', 0.9, T0, T0)
        .await
        .expect("STORE_FAULT");
    assert!(replay_outcome.is_none(), "IDEMPOTENCE_FAULT: replay double-committed");

    let buffer = store.buffer_peek("sess-6").await.expect("STORE_FAULT").expect("BUFFER_FAULT");
    assert_eq!(buffer.current_word(), "K");
}

#[tokio::test]
async fn foreign_symbols_never_enter_the_window() {
    let (engine, store) = engine_with(reference_config());

    let outcome = engine
        .process_prediction("sess-7", "user-7", '?', 0.99, T0, T0)
        .await
        .expect("STORE_FAULT");
    assert!(outcome.is_none());
    assert!(store.window_get("sess-7").await.expect("STORE_FAULT").is_empty());
}

#[tokio::test]
async fn window_pruning_respects_the_configured_span() {
    // Invariante de ventana: tras la poda, max(ts) − min(ts) ≤ W.
    let (engine, store) = engine_with(reference_config());

    for offset in [0.0, 0.1, 0.2, 0.4, 0.5] {
        let timestamp = T0 + offset;
        engine
            .process_prediction("sess-8", "user-8", 'C', 0.35, timestamp, timestamp)
            .await
            .expect("STORE_FAULT");
    }

    let window = store.window_get("sess-8").await.expect("STORE_FAULT");
    let window_span = window.last().unwrap().timestamp - window.first().unwrap().timestamp;
    assert!(window_span <= 0.3 + 1e-9, "WINDOW_FAULT: span {window_span}s exceeds W=300ms");
    assert!(window.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}
