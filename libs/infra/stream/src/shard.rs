// [libs/infra/stream/src/shard.rs]
/*!
 * =================================================================
 * APARATO: SHARD RING LOG (V4.1 - MONOTONIC SEQUENCES)
 * CLASIFICACIÓN: INFRASTRUCTURE TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: ANILLO DE RETENCIÓN Y CURSORES DE LECTURA
 *
 * # Mathematical Proof (Sequence Monotonicity):
 * Cada shard asigna secuencias desde un contador monotónico bajo su
 * cerrojo. El anillo retiene un sufijo contiguo del log; todo cursor
 * c entrega exactamente los registros con secuencia ≥ c que aún
 * residen en el anillo, en orden estricto de secuencia.
 * =================================================================
 */

use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// Máximo de registros entregados en una ráfaga de suscripción.
pub const SUBSCRIPTION_BATCH_LIMIT: usize = 100;

/// Posición inicial de una suscripción sobre un shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartingPosition {
    /// Solo registros que arriben después de la suscripción.
    Latest,
    /// Desde el registro más antiguo aún retenido.
    TrimHorizon,
    /// Estrictamente después de la secuencia dada (continuación).
    AfterSequence(u64),
}

/// Registro soberano residente en un shard del bus.
#[derive(Debug, Clone)]
pub struct StreamRecord {
    pub shard_id: String,
    /// Secuencia monotónica dentro del shard.
    pub sequence_number: u64,
    pub partition_key: String,
    pub payload: serde_json::Value,
    /// Epoch en segundos del arribo al bus.
    pub arrival_timestamp: f64,
}

#[derive(Debug)]
struct ShardState {
    records: VecDeque<StreamRecord>,
    next_sequence: u64,
}

/// Log en anillo de un shard con notificación de arribos.
pub struct ShardLog {
    shard_id: String,
    retention_limit: usize,
    state: Mutex<ShardState>,
    arrival_signal: Notify,
}

impl ShardLog {
    pub fn new(shard_id: String, retention_limit: usize) -> Self {
        Self {
            shard_id,
            retention_limit,
            state: Mutex::new(ShardState { records: VecDeque::new(), next_sequence: 0 }),
            arrival_signal: Notify::new(),
        }
    }

    pub fn shard_id(&self) -> &str {
        &self.shard_id
    }

    /// Anexa un registro, asigna su secuencia y despierta suscriptores.
    /// El anillo descarta el registro más antiguo al exceder la retención.
    pub fn append(
        &self,
        partition_key: &str,
        payload: serde_json::Value,
        arrival_timestamp: f64,
    ) -> u64 {
        let assigned_sequence = {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let assigned_sequence = state.next_sequence;
            state.next_sequence += 1;

            state.records.push_back(StreamRecord {
                shard_id: self.shard_id.clone(),
                sequence_number: assigned_sequence,
                partition_key: partition_key.to_string(),
                payload,
                arrival_timestamp,
            });

            while state.records.len() > self.retention_limit {
                state.records.pop_front();
            }

            assigned_sequence
        };

        self.arrival_signal.notify_waiters();
        assigned_sequence
    }

    /// Resuelve el cursor inicial de una posición de suscripción.
    pub fn resolve_cursor(&self, position: StartingPosition) -> u64 {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match position {
            StartingPosition::Latest => state.next_sequence,
            StartingPosition::TrimHorizon => state
                .records
                .front()
                .map(|oldest| oldest.sequence_number)
                .unwrap_or(state.next_sequence),
            StartingPosition::AfterSequence(sequence) => sequence + 1,
        }
    }

    /// Registros retenidos con secuencia ≥ cursor, acotados por ráfaga.
    pub fn collect_from(&self, cursor: u64) -> Vec<StreamRecord> {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state
            .records
            .iter()
            .filter(|record| record.sequence_number >= cursor)
            .take(SUBSCRIPTION_BATCH_LIMIT)
            .cloned()
            .collect()
    }

    /// Futuro de notificación de arribo (armar antes de inspeccionar).
    pub fn arrival_notified(&self) -> tokio::sync::futures::Notified<'_> {
        self.arrival_signal.notified()
    }
}
