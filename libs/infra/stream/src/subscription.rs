// [libs/infra/stream/src/subscription.rs]
/*!
 * =================================================================
 * APARATO: PUSH SUBSCRIPTION PUMP (V4.2 - LEASE DISCIPLINE)
 * CLASIFICACIÓN: INFRASTRUCTURE TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: ENTREGA PUSH CON LATIDOS Y EXPIRACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LEASE DISCIPLINE: Toda suscripción expira en su arrendamiento y
 *    entrega la secuencia de continuación en el evento terminal; el
 *    consumidor re-suscribe AFTER_SEQUENCE sin releer registros.
 * 2. HEARTBEAT PULSE: Silencios prolongados emiten latidos para que
 *    el consumidor distinga enlace vivo de enlace colapsado.
 * 3. BACKPRESSURE BY CHANNEL: El canal acotado transfiere la presión
 *    al anillo del shard; el pump jamás acumula ráfagas en RAM.
 * =================================================================
 */

use crate::shard::{ShardLog, StartingPosition};
use crate::StreamRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// Capacidad del canal de eventos hacia el consumidor.
const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 32;

/// Evento entregado por una suscripción push.
#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    /// Ráfaga de registros en orden de secuencia estricto.
    Batch {
        records: Vec<StreamRecord>,
        /// Última secuencia entregada (punto de continuación).
        continuation_sequence: u64,
    },
    /// Latido de enlace vivo sin registros.
    Heartbeat,
    /// Arrendamiento agotado. Re-suscribir AFTER_SEQUENCE si hay continuación.
    Expired { continuation_sequence: Option<u64> },
}

/// Extremo de consumo de una suscripción push sobre un shard.
pub struct ShardSubscription {
    pub shard_id: String,
    event_channel: mpsc::Receiver<SubscriptionEvent>,
}

impl ShardSubscription {
    /// Siguiente evento de la suscripción. None = canal cerrado.
    pub async fn next_event(&mut self) -> Option<SubscriptionEvent> {
        self.event_channel.recv().await
    }
}

/// Lanza el pump de entrega push de un shard en el reactor de Tokio.
pub fn spawn_subscription_pump(
    shard: Arc<ShardLog>,
    position: StartingPosition,
    lease_duration: Duration,
    heartbeat_interval: Duration,
) -> ShardSubscription {
    let (event_sender, event_receiver) = mpsc::channel(SUBSCRIPTION_CHANNEL_CAPACITY);
    let shard_identifier = shard.shard_id().to_string();

    tokio::spawn(async move {
        let lease_deadline = Instant::now() + lease_duration;
        let mut read_cursor = shard.resolve_cursor(position);
        let mut last_delivered: Option<u64> = match position {
            StartingPosition::AfterSequence(sequence) => Some(sequence),
            _ => None,
        };
        let mut heartbeat_ticker = tokio::time::interval_at(
            Instant::now() + heartbeat_interval,
            heartbeat_interval,
        );

        loop {
            if Instant::now() >= lease_deadline {
                let _ = event_sender
                    .send(SubscriptionEvent::Expired { continuation_sequence: last_delivered })
                    .await;
                debug!("⌛ [SUBSCRIPTION]: Lease expired on [{}].", shard.shard_id());
                return;
            }

            // Armar la señal de arribo ANTES de inspeccionar el anillo
            // cierra la ventana de despertar perdido.
            let arrival_notified = shard.arrival_notified();

            let pending_batch = shard.collect_from(read_cursor);
            if !pending_batch.is_empty() {
                let continuation_sequence =
                    pending_batch.last().map(|record| record.sequence_number).unwrap_or(read_cursor);
                read_cursor = continuation_sequence + 1;
                last_delivered = Some(continuation_sequence);

                if event_sender
                    .send(SubscriptionEvent::Batch {
                        records: pending_batch,
                        continuation_sequence,
                    })
                    .await
                    .is_err()
                {
                    // Suscriptor desconectado: pump finaliza en silencio.
                    return;
                }
                continue;
            }

            tokio::select! {
                _ = arrival_notified => {}
                _ = heartbeat_ticker.tick() => {
                    if event_sender.send(SubscriptionEvent::Heartbeat).await.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep_until(lease_deadline) => {
                    let _ = event_sender
                        .send(SubscriptionEvent::Expired { continuation_sequence: last_delivered })
                        .await;
                    return;
                }
            }
        }
    });

    ShardSubscription { shard_id: shard_identifier, event_channel: event_receiver }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_shard() -> Arc<ShardLog> {
        Arc::new(ShardLog::new("shardId-000000000000".into(), 128))
    }

    #[tokio::test]
    async fn latest_subscription_sees_only_future_records() {
        let shard = test_shard();
        shard.append("sess", json!("old"), 0.0);

        let mut subscription = spawn_subscription_pump(
            Arc::clone(&shard),
            StartingPosition::Latest,
            Duration::from_secs(30),
            Duration::from_secs(30),
        );

        shard.append("sess", json!("fresh"), 1.0);

        match subscription.next_event().await {
            Some(SubscriptionEvent::Batch { records, continuation_sequence }) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].payload, json!("fresh"));
                assert_eq!(continuation_sequence, 1);
            }
            other => panic!("PUMP_FAULT: expected batch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn after_sequence_subscription_replays_the_retained_suffix() {
        let shard = test_shard();
        for index in 0..4 {
            shard.append("sess", json!(index), 0.0);
        }

        let mut subscription = spawn_subscription_pump(
            Arc::clone(&shard),
            StartingPosition::AfterSequence(1),
            Duration::from_secs(30),
            Duration::from_secs(30),
        );

        match subscription.next_event().await {
            Some(SubscriptionEvent::Batch { records, continuation_sequence }) => {
                let sequences: Vec<u64> =
                    records.iter().map(|record| record.sequence_number).collect();
                assert_eq!(sequences, vec![2, 3]);
                assert_eq!(continuation_sequence, 3);
            }
            other => panic!("PUMP_FAULT: expected replay batch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lease_expiry_delivers_the_continuation_sequence() {
        let shard = test_shard();
        shard.append("sess", json!(0), 0.0);

        let mut subscription = spawn_subscription_pump(
            Arc::clone(&shard),
            StartingPosition::TrimHorizon,
            Duration::from_millis(150),
            Duration::from_secs(30),
        );

        let mut delivered_continuation = None;
        while let Some(event) = subscription.next_event().await {
            match event {
                SubscriptionEvent::Batch { continuation_sequence, .. } => {
                    delivered_continuation = Some(continuation_sequence);
                }
                SubscriptionEvent::Expired { continuation_sequence } => {
                    assert_eq!(continuation_sequence, delivered_continuation);
                    return;
                }
                SubscriptionEvent::Heartbeat => {}
            }
        }
        panic!("PUMP_FAULT: channel closed without expiry event");
    }

    #[tokio::test]
    async fn silent_link_emits_heartbeats() {
        let shard = test_shard();
        let mut subscription = spawn_subscription_pump(
            shard,
            StartingPosition::Latest,
            Duration::from_secs(5),
            Duration::from_millis(50),
        );

        match subscription.next_event().await {
            Some(SubscriptionEvent::Heartbeat) => {}
            other => panic!("PUMP_FAULT: expected heartbeat, got {other:?}"),
        }
    }
}
