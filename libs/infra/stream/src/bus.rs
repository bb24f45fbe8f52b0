// [libs/infra/stream/src/bus.rs]
/*!
 * =================================================================
 * APARATO: STREAM BUS ORCHESTRATOR (V5.0 - SIP PARTITION LAW)
 * CLASIFICACIÓN: INFRASTRUCTURE TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: FLUJOS NOMINADOS, PARTICIONADO Y CONSUMIDORES
 *
 * # Mathematical Proof (Per-Session Ordering):
 * SipHash-1-3 con claves fijas es una función determinista de la
 * clave de partición; toda sesión mapea siempre al mismo shard y
 * hereda el orden total de su anillo. El orden entre shards no se
 * garantiza, por contrato.
 * =================================================================
 */

use crate::shard::{ShardLog, StartingPosition};
use crate::subscription::{spawn_subscription_pump, ShardSubscription};
use crate::StreamError;
use siphasher::sip::SipHasher13;
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Claves fijas del particionador SipHash (estables entre procesos).
const PARTITION_HASH_KEY_0: u64 = 0x6C61_6E64_6D61_726B;
const PARTITION_HASH_KEY_1: u64 = 0x676C_6F73_7361_0001;

/// Configuración soberana de un flujo nominado.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub name: String,
    pub shard_count: usize,
    /// Registros retenidos por shard (anillo acotado).
    pub retention_records_per_shard: usize,
    /// Arrendamiento de cada suscripción push.
    pub subscription_lease: Duration,
    /// Cadencia de latidos en enlaces silenciosos.
    pub heartbeat_interval: Duration,
}

impl StreamConfig {
    /// Configuración nominal de producción (4 shards, lease de 5 min).
    pub fn nominal(stream_name: impl Into<String>) -> Self {
        Self {
            name: stream_name.into(),
            shard_count: 4,
            retention_records_per_shard: 4096,
            subscription_lease: Duration::from_secs(300),
            heartbeat_interval: Duration::from_secs(5),
        }
    }
}

/// Recibo de escritura: shard y secuencia asignados al registro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    pub shard_id: String,
    pub sequence_number: u64,
}

/// Credencial de un consumidor nominado registrado sobre un flujo.
#[derive(Debug, Clone)]
pub struct ConsumerHandle {
    pub stream_name: String,
    pub consumer_name: String,
    /// true si el registro reutilizó un consumidor existente.
    pub reused: bool,
}

struct StreamLog {
    config: StreamConfig,
    shards: Vec<Arc<ShardLog>>,
    registered_consumers: Mutex<HashSet<String>>,
}

/// Bus de flujo embebido con flujos nominados y shards particionados.
pub struct StreamBus {
    streams: RwLock<HashMap<String, Arc<StreamLog>>>,
}

impl StreamBus {
    pub fn new() -> Self {
        Self { streams: RwLock::new(HashMap::new()) }
    }

    /// Materializa un flujo nominado con sus shards.
    ///
    /// # Errors:
    /// - `StreamAlreadyExists` si el nombre ya está tomado.
    pub fn create_stream(&self, config: StreamConfig) -> Result<(), StreamError> {
        let mut streams = self.streams.write().unwrap_or_else(|poisoned| poisoned.into_inner());

        if streams.contains_key(&config.name) {
            return Err(StreamError::StreamAlreadyExists(config.name));
        }

        let shards: Vec<Arc<ShardLog>> = (0..config.shard_count)
            .map(|shard_index| {
                Arc::new(ShardLog::new(
                    format!("shardId-{shard_index:012}"),
                    config.retention_records_per_shard,
                ))
            })
            .collect();

        info!(
            "🌊 [STREAM_BUS]: Stream [{}] online with {} shard(s).",
            config.name, config.shard_count
        );

        streams.insert(
            config.name.clone(),
            Arc::new(StreamLog {
                config,
                shards,
                registered_consumers: Mutex::new(HashSet::new()),
            }),
        );
        Ok(())
    }

    /// Escribe un registro particionado por clave. Devuelve su recibo.
    pub fn put_record<PayloadT: serde::Serialize>(
        &self,
        stream_name: &str,
        partition_key: &str,
        payload: &PayloadT,
    ) -> Result<PutReceipt, StreamError> {
        let stream = self.stream(stream_name)?;

        let encoded_payload = serde_json::to_value(payload)
            .map_err(|encode_fault| StreamError::PayloadEncodingRejected(encode_fault.to_string()))?;

        let shard_index = partition_shard_index(partition_key, stream.shards.len());
        let shard = &stream.shards[shard_index];

        let arrival_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0);

        let sequence_number = shard.append(partition_key, encoded_payload, arrival_timestamp);

        debug!(
            "📨 [STREAM_BUS]: Record sealed in {}/{} seq {}.",
            stream_name,
            shard.shard_id(),
            sequence_number
        );

        Ok(PutReceipt { shard_id: shard.shard_id().to_string(), sequence_number })
    }

    /// Identificadores de shard del flujo, en orden nominal.
    pub fn list_shards(&self, stream_name: &str) -> Result<Vec<String>, StreamError> {
        let stream = self.stream(stream_name)?;
        Ok(stream.shards.iter().map(|shard| shard.shard_id().to_string()).collect())
    }

    /// Registra (o reutiliza) un consumidor nominado sobre el flujo.
    pub fn register_consumer(
        &self,
        stream_name: &str,
        consumer_name: &str,
    ) -> Result<ConsumerHandle, StreamError> {
        let stream = self.stream(stream_name)?;
        let mut consumers = stream
            .registered_consumers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let reused = !consumers.insert(consumer_name.to_string());
        if reused {
            info!("♻️  [STREAM_BUS]: Consumer [{}] reused on [{}].", consumer_name, stream_name);
        } else {
            info!("🤝 [STREAM_BUS]: Consumer [{}] registered on [{}].", consumer_name, stream_name);
        }

        Ok(ConsumerHandle {
            stream_name: stream_name.to_string(),
            consumer_name: consumer_name.to_string(),
            reused,
        })
    }

    /// Da de baja un consumidor nominado (apagado ordenado).
    pub fn deregister_consumer(
        &self,
        stream_name: &str,
        consumer_name: &str,
    ) -> Result<(), StreamError> {
        let stream = self.stream(stream_name)?;
        let mut consumers = stream
            .registered_consumers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if consumers.remove(consumer_name) {
            info!("👋 [STREAM_BUS]: Consumer [{}] deregistered from [{}].", consumer_name, stream_name);
        }
        Ok(())
    }

    /// Abre una suscripción push sobre un shard para un consumidor
    /// registrado. El pump expira al agotar el arrendamiento del flujo.
    pub fn subscribe_to_shard(
        &self,
        consumer: &ConsumerHandle,
        shard_id: &str,
        position: StartingPosition,
    ) -> Result<ShardSubscription, StreamError> {
        let stream = self.stream(&consumer.stream_name)?;

        {
            let consumers = stream
                .registered_consumers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !consumers.contains(&consumer.consumer_name) {
                return Err(StreamError::ConsumerNotRegistered(consumer.consumer_name.clone()));
            }
        }

        let shard = stream
            .shards
            .iter()
            .find(|candidate| candidate.shard_id() == shard_id)
            .ok_or_else(|| StreamError::ShardNotFound(shard_id.to_string()))?;

        Ok(spawn_subscription_pump(
            Arc::clone(shard),
            position,
            stream.config.subscription_lease,
            stream.config.heartbeat_interval,
        ))
    }

    fn stream(&self, stream_name: &str) -> Result<Arc<StreamLog>, StreamError> {
        let streams = self.streams.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        streams
            .get(stream_name)
            .cloned()
            .ok_or_else(|| StreamError::StreamNotFound(stream_name.to_string()))
    }
}

impl Default for StreamBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Índice de shard determinista para una clave de partición.
fn partition_shard_index(partition_key: &str, shard_count: usize) -> usize {
    let mut hasher = SipHasher13::new_with_keys(PARTITION_HASH_KEY_0, PARTITION_HASH_KEY_1);
    hasher.write(partition_key.as_bytes());
    (hasher.finish() % shard_count as u64) as usize
}
