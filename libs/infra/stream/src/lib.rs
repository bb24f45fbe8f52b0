// [libs/infra/stream/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PARTITIONED STREAM BUS (V5.0 - SIGNAL SPINE)
 * CLASIFICACIÓN: INFRASTRUCTURE TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: FLUJOS NOMINADOS, SHARDS Y FAN-OUT MEJORADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PARTITION LAW: La clave de partición determina el shard por
 *    SipHash estable; los registros de una misma sesión conservan
 *    orden total dentro de su shard.
 * 2. PUSH LEASE: Las suscripciones son push con arrendamiento; la
 *    expiración entrega la secuencia de continuación y el consumidor
 *    re-suscribe AFTER_SEQUENCE sin duplicados en su vida útil.
 * 3. BOUNDED MEMORY: Retención en anillo acotado por shard; el rezago
 *    de un consumidor lento se manifiesta como lag de iterador,
 *    jamás como crecimiento de memoria.
 * =================================================================
 */

pub mod bus;
pub mod fanout;
pub mod shard;
pub mod subscription;

pub use bus::{ConsumerHandle, PutReceipt, StreamBus, StreamConfig};
pub use fanout::{EnhancedFanoutConsumer, FanoutSupervisor, RecordProcessor};
pub use shard::{StartingPosition, StreamRecord};
pub use subscription::{ShardSubscription, SubscriptionEvent};

use thiserror::Error;

/// Catálogo semántico de fallos del bus de flujo.
#[derive(Error, Debug)]
pub enum StreamError {
    /// El flujo nominado no existe en el bus.
    #[error("[L3_STREAM_FAULT]: STREAM_NOT_FOUND -> {0}")]
    StreamNotFound(String),

    /// El shard solicitado no pertenece al flujo.
    #[error("[L3_STREAM_FAULT]: SHARD_NOT_FOUND -> {0}")]
    ShardNotFound(String),

    /// El flujo ya existe con otra configuración.
    #[error("[L3_STREAM_FAULT]: STREAM_ALREADY_EXISTS -> {0}")]
    StreamAlreadyExists(String),

    /// El consumidor nominado no está registrado (o fue dado de baja).
    #[error("[L3_STREAM_FAULT]: CONSUMER_NOT_REGISTERED -> {0}")]
    ConsumerNotRegistered(String),

    /// El payload no pudo serializarse hacia el registro del bus.
    #[error("[L3_STREAM_FAULT]: PAYLOAD_ENCODING_REJECTED -> {0}")]
    PayloadEncodingRejected(String),

    /// Colapso interno de canal (condición catastrófica).
    #[error("[L3_STREAM_FAULT]: CHANNEL_COLLAPSE -> {0}")]
    ChannelCollapse(String),
}
