// [apps/pipeline/src/services/pause_sweeper.rs]
/*!
 * =================================================================
 * APARATO: PAUSE SWEEPER DAEMON (V3.1 - SILENT SESSION GUARD)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: FINALIZACIÓN DE PALABRAS EN SESIONES SILENCIOSAS
 *
 * # Logic:
 * La detección de pausa es dirigida por eventos con esta red de
 * seguridad periódica (≥ 1 Hz): sesiones que dejaron de emitir
 * fotogramas finalizan su palabra a lo sumo un periodo de barrido
 * después de agotar P_ms.
 * =================================================================
 */

use crate::epoch_seconds_now;
use crate::stages::WordFinalizer;
use glossa_domain_commit::{CommitEngine, SessionStore};
use glossa_domain_models::SearchMethod;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Enciende el barrido perpetuo de pausa en el reactor de Tokio.
pub fn spawn_pause_sweeper(
    session_store: Arc<dyn SessionStore>,
    commit_engine: Arc<CommitEngine>,
    finalizer: Arc<WordFinalizer>,
    sweep_interval: Duration,
    mut shutdown_signal: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let mut sweep_ticker = interval(sweep_interval);

    tokio::spawn(async move {
        info!("⏱️  [PAUSE_SWEEPER]: Silent session guard initiated ({:?} cadence).", sweep_interval);

        loop {
            tokio::select! {
                _ = sweep_ticker.tick() => {}
                _ = shutdown_signal.changed() => {
                    if *shutdown_signal.borrow() {
                        info!("⏱️  [PAUSE_SWEEPER]: Shutdown observed. Guard retiring.");
                        return;
                    }
                }
            }

            let active_census = match session_store.active_sessions().await {
                Ok(census) => census,
                Err(store_fault) => {
                    warn!("⚠️  [PAUSE_SWEEPER]: Census failed: {}", store_fault);
                    continue;
                }
            };

            if active_census.is_empty() {
                continue;
            }
            debug!("⏱️  [PAUSE_SWEEPER]: Auditing {} active session(s).", active_census.len());

            let now = epoch_seconds_now();
            for session_id in active_census {
                match commit_engine.should_finalize(&session_id, now).await {
                    Ok(true) => {
                        finalizer.finalize_word(&session_id, SearchMethod::Fuzzy).await;
                    }
                    Ok(false) => {}
                    Err(store_fault) => {
                        warn!(
                            "⚠️  [PAUSE_SWEEPER]: Pause check failed for [{}]: {}",
                            session_id, store_fault
                        );
                    }
                }
            }
        }
    })
}
