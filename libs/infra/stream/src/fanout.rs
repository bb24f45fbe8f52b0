// [libs/infra/stream/src/fanout.rs]
/*!
 * =================================================================
 * APARATO: ENHANCED FANOUT CONSUMER (V6.0 - CONTINUATION MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS POR SHARD Y RE-SUSCRIPCIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ONE TASK PER SHARD: Cada shard vive en su propia tarea con su
 *    secuencia de continuación; el orden de arribo por shard se
 *    preserva de extremo a extremo.
 * 2. CONTINUATION MASTER: LATEST en la primera suscripción y
 *    AFTER_SEQUENCE tras cada expiración; sin duplicados dentro de
 *    una vida útil del proceso (at-least-once entre reinicios).
 * 3. BACKOFF DISCIPLINE: Fallos transitorios aplican retroceso
 *    exponencial con 10% de jitter, techo de 60 s y contador que se
 *    reinicia al lograr suscripción.
 * 4. COOPERATIVE SHUTDOWN: La bandera de apagado se observa en la
 *    cabeza de cada bucle; el supervisor da de baja al consumidor
 *    nominado antes de morir.
 *
 * Máquina de estados por shard:
 *   IDLE → SUBSCRIBING → ACTIVE ─(batch/heartbeat)─▶ ACTIVE
 *            │                │
 *            │                ├─(expiry)→ RESUBSCRIBING(AFTER_SEQ)
 *            │                └─(shutdown)→ STOPPED
 *            └─(transient failure)→ BACKOFF → SUBSCRIBING
 * =================================================================
 */

use crate::bus::{ConsumerHandle, StreamBus};
use crate::shard::StartingPosition;
use crate::subscription::SubscriptionEvent;
use crate::{StreamError, StreamRecord};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Retroceso base ante fallo transitorio.
const BACKOFF_BASE_SECONDS: f64 = 2.0;
/// Techo del retroceso exponencial.
const BACKOFF_CEILING_SECONDS: f64 = 60.0;
/// Fracción de jitter uniforme aplicada sobre el retroceso.
const BACKOFF_JITTER_FRACTION: f64 = 0.10;

/// Procesador de registros inyectado en cada tarea de shard.
/// El consumidor no posee estado de clasificación ni de sesión.
#[async_trait]
pub trait RecordProcessor: Send + Sync {
    /// Procesa un registro en orden de arribo. Un error se registra y
    /// el registro se descarta; el enlace del shard continúa.
    async fn process_record(&self, record: StreamRecord) -> anyhow::Result<()>;
}

/// Consumidor de fan-out mejorado: una tarea por shard del flujo.
pub struct EnhancedFanoutConsumer;

impl EnhancedFanoutConsumer {
    /// Registra el consumidor nominado y enciende una tarea por shard.
    ///
    /// # Errors:
    /// Propaga fallos de registro o censo de shards (fatales de ignición).
    pub async fn ignite(
        stream_bus: Arc<StreamBus>,
        stream_name: &str,
        consumer_name: &str,
        processor: Arc<dyn RecordProcessor>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<FanoutSupervisor, StreamError> {
        let consumer_handle = stream_bus.register_consumer(stream_name, consumer_name)?;
        let shard_census = stream_bus.list_shards(stream_name)?;

        info!(
            "🚀 [FANOUT]: Consumer [{}] igniting {} shard task(s) on [{}].",
            consumer_name,
            shard_census.len(),
            stream_name
        );

        let shard_workers: Vec<JoinHandle<()>> = shard_census
            .into_iter()
            .map(|shard_id| {
                let worker = ShardWorker {
                    stream_bus: Arc::clone(&stream_bus),
                    consumer_handle: consumer_handle.clone(),
                    shard_id,
                    processor: Arc::clone(&processor),
                    shutdown_signal: shutdown_signal.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        Ok(FanoutSupervisor {
            stream_bus,
            consumer_handle,
            shard_workers,
        })
    }
}

/// Supervisor de las tareas de shard de un consumidor encendido.
pub struct FanoutSupervisor {
    stream_bus: Arc<StreamBus>,
    consumer_handle: ConsumerHandle,
    shard_workers: Vec<JoinHandle<()>>,
}

impl FanoutSupervisor {
    /// Espera la terminación cooperativa de todas las tareas de shard y
    /// da de baja el consumidor nominado.
    pub async fn join(self) {
        for worker in self.shard_workers {
            if let Err(join_fault) = worker.await {
                error!("💀 [FANOUT]: Shard task collapsed: {}", join_fault);
            }
        }

        if let Err(deregistration_fault) = self.stream_bus.deregister_consumer(
            &self.consumer_handle.stream_name,
            &self.consumer_handle.consumer_name,
        ) {
            warn!("⚠️  [FANOUT]: Deregistration failed: {}", deregistration_fault);
        } else {
            info!(
                "👋 [FANOUT]: Consumer [{}] deregistered from [{}].",
                self.consumer_handle.consumer_name, self.consumer_handle.stream_name
            );
        }
    }
}

/// Tarea soberana de un shard: suscripción, continuación y retroceso.
struct ShardWorker {
    stream_bus: Arc<StreamBus>,
    consumer_handle: ConsumerHandle,
    shard_id: String,
    processor: Arc<dyn RecordProcessor>,
    shutdown_signal: watch::Receiver<bool>,
}

impl ShardWorker {
    async fn run(mut self) {
        let mut continuation_sequence: Option<u64> = None;
        let mut transient_retry_count: u32 = 0;
        let mut records_processed: u64 = 0;

        info!("[{}] Starting push subscription loop (LATEST mode)...", self.shard_id);

        while !*self.shutdown_signal.borrow() {
            let starting_position = match continuation_sequence {
                Some(sequence) => StartingPosition::AfterSequence(sequence),
                None => StartingPosition::Latest,
            };

            match self.stream_bus.subscribe_to_shard(
                &self.consumer_handle,
                &self.shard_id,
                starting_position,
            ) {
                Ok(mut subscription) => {
                    debug!("[{}] Subscription active, awaiting records...", self.shard_id);
                    transient_retry_count = 0;

                    // Bucle ACTIVE: ráfagas, latidos o expiración.
                    loop {
                        tokio::select! {
                            shutdown_change = self.shutdown_signal.changed() => {
                                if shutdown_change.is_err() || *self.shutdown_signal.borrow() {
                                    info!(
                                        "[{}] Shutdown requested, ending subscription. Total: {} record(s).",
                                        self.shard_id, records_processed
                                    );
                                    return;
                                }
                            }
                            subscription_event = subscription.next_event() => {
                                match subscription_event {
                                    Some(SubscriptionEvent::Batch { records, continuation_sequence: batch_continuation }) => {
                                        for record in records {
                                            if *self.shutdown_signal.borrow() {
                                                return;
                                            }
                                            if let Err(processing_fault) =
                                                self.processor.process_record(record).await
                                            {
                                                error!(
                                                    "❌ [{}] Record processing failed: {}",
                                                    self.shard_id, processing_fault
                                                );
                                            }
                                            records_processed += 1;
                                        }
                                        continuation_sequence = Some(batch_continuation);
                                    }
                                    Some(SubscriptionEvent::Heartbeat) => {
                                        debug!("[{}] Heartbeat event (link alive).", self.shard_id);
                                    }
                                    Some(SubscriptionEvent::Expired { continuation_sequence: expiry_continuation }) => {
                                        continuation_sequence =
                                            expiry_continuation.or(continuation_sequence);
                                        info!(
                                            "[{}] Subscription expired, re-subscribing from continuation point...",
                                            self.shard_id
                                        );
                                        break;
                                    }
                                    None => {
                                        warn!("[{}] Subscription channel closed unexpectedly.", self.shard_id);
                                        break;
                                    }
                                }
                            }
                        }
                    }
                }
                Err(subscription_fault) => {
                    if *self.shutdown_signal.borrow() {
                        break;
                    }

                    transient_retry_count += 1;
                    let retry_delay = backoff_with_jitter(transient_retry_count);

                    warn!(
                        "⚠️  [{}] Subscription fault: {}. Retry {} in {:.1}s...",
                        self.shard_id,
                        subscription_fault,
                        transient_retry_count,
                        retry_delay.as_secs_f64()
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(retry_delay) => {}
                        _ = self.shutdown_signal.changed() => {}
                    }
                }
            }
        }

        info!(
            "[{}] Subscription loop ended. Total processed: {} record(s).",
            self.shard_id, records_processed
        );
    }
}

/// Retroceso exponencial con 10% de jitter y techo de 60 s.
fn backoff_with_jitter(retry_count: u32) -> Duration {
    let exponential_delay =
        (BACKOFF_BASE_SECONDS * 2.0_f64.powi(retry_count as i32)).min(BACKOFF_CEILING_SECONDS);
    let jitter = rand::thread_rng().gen_range(0.0..=exponential_delay * BACKOFF_JITTER_FRACTION);
    Duration::from_secs_f64(exponential_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_and_respects_the_ceiling() {
        for retry_count in 1..=10 {
            let delay = backoff_with_jitter(retry_count).as_secs_f64();
            let nominal = (BACKOFF_BASE_SECONDS * 2.0_f64.powi(retry_count as i32))
                .min(BACKOFF_CEILING_SECONDS);
            assert!(delay >= nominal);
            assert!(delay <= nominal * (1.0 + BACKOFF_JITTER_FRACTION) + 1e-9);
        }

        // El techo domina a partir del quinto reintento (2·2⁵ = 64 > 60).
        let capped = backoff_with_jitter(9).as_secs_f64();
        assert!(capped <= BACKOFF_CEILING_SECONDS * (1.0 + BACKOFF_JITTER_FRACTION) + 1e-9);
    }
}
