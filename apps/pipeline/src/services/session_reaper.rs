// [apps/pipeline/src/services/session_reaper.rs]
/*!
 * =================================================================
 * APARATO: SESSION REAPER DAEMON (V3.0 - LEASE HYGIENE)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: PURGA DE SESIONES CON ARRENDAMIENTO EXPIRADO
 *
 * # Logic:
 * El TTL de sesión (300 s renovados en cada escritura) protege contra
 * sesiones filtradas por desconexiones abruptas. El ciclo de 60 s
 * está sintonizado para minimizar el jitter en los enlaces de shard
 * mientras mantiene el almacén libre de estado huérfano.
 * =================================================================
 */

use crate::epoch_seconds_now;
use glossa_domain_commit::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

/// Enciende el daemon de higiene de arrendamientos.
pub fn spawn_session_reaper(
    session_store: Arc<dyn SessionStore>,
    reap_interval: Duration,
    mut shutdown_signal: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let mut maintenance_ticker = interval(reap_interval);

    tokio::spawn(async move {
        info!("💀 [SESSION_REAPER]: Lease hygiene daemon initiated.");

        loop {
            tokio::select! {
                _ = maintenance_ticker.tick() => {}
                _ = shutdown_signal.changed() => {
                    if *shutdown_signal.borrow() {
                        info!("💀 [SESSION_REAPER]: Shutdown observed. Daemon retiring.");
                        return;
                    }
                }
            }

            match session_store.purge_expired(epoch_seconds_now()).await {
                Ok(0) => {}
                Ok(reaped_count) => {
                    info!("💀 [SESSION_REAPER]: Evicted {} expired session(s).", reaped_count);
                }
                Err(store_fault) => {
                    warn!("⚠️  [SESSION_REAPER]: Purge failed: {}", store_fault);
                }
            }
        }
    })
}
