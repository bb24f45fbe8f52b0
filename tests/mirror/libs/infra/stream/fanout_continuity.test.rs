// [tests/mirror/libs/infra/stream/fanout_continuity.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE FAN-OUT MEJORADO (V2.1 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: ORDEN POR SHARD, CONTINUACIÓN Y APAGADO
 *
 * # Mathematical Proof (No Duplicates In-Lifetime):
 * Con arrendamientos cortos la suite fuerza múltiples expiraciones;
 * si la re-suscripción AFTER_SEQUENCE fallara, los contadores por
 * sesión mostrarían duplicados o huecos en la secuencia entregada.
 * =================================================================
 */

use async_trait::async_trait;
use glossa_infra_stream::{
    EnhancedFanoutConsumer, RecordProcessor, StreamBus, StreamConfig, StreamRecord,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Procesador que captura los payloads en orden de entrega por sesión.
#[derive(Default)]
struct CapturingProcessor {
    deliveries: Mutex<HashMap<String, Vec<i64>>>,
}

impl CapturingProcessor {
    fn deliveries_for(&self, session: &str) -> Vec<i64> {
        self.deliveries.lock().unwrap().get(session).cloned().unwrap_or_default()
    }

    fn total_deliveries(&self) -> usize {
        self.deliveries.lock().unwrap().values().map(|values| values.len()).sum()
    }
}

#[async_trait]
impl RecordProcessor for CapturingProcessor {
    async fn process_record(&self, record: StreamRecord) -> anyhow::Result<()> {
        let session = record.partition_key.clone();
        let payload_index = record.payload["index"].as_i64().unwrap_or(-1);
        self.deliveries.lock().unwrap().entry(session).or_default().push(payload_index);
        Ok(())
    }
}

fn short_lease_bus(stream_name: &str, shard_count: usize, lease_ms: u64) -> Arc<StreamBus> {
    let bus = Arc::new(StreamBus::new());
    bus.create_stream(StreamConfig {
        name: stream_name.into(),
        shard_count,
        retention_records_per_shard: 512,
        subscription_lease: Duration::from_millis(lease_ms),
        heartbeat_interval: Duration::from_millis(50),
    })
    .expect("BUS_FAULT: stream creation rejected");
    bus
}

#[tokio::test]
async fn per_session_order_survives_lease_expiry_without_duplicates() {
    println!("\n🌊 [INICIO]: Auditoría de continuidad del fan-out mejorado...");

    // Arrendamiento de 150 ms: la suite fuerza varias expiraciones.
    let bus = short_lease_bus("letters", 4, 150);
    let processor = Arc::new(CapturingProcessor::default());
    let (shutdown_sender, shutdown_signal) = watch::channel(false);

    let supervisor = EnhancedFanoutConsumer::ignite(
        Arc::clone(&bus),
        "letters",
        "word-engine-audit",
        Arc::clone(&processor) as Arc<dyn RecordProcessor>,
        shutdown_signal,
    )
    .await
    .expect("FANOUT_FAULT: ignition rejected");

    // Las suscripciones LATEST deben estar activas antes de escribir.
    tokio::time::sleep(Duration::from_millis(100)).await;

    // 3 sesiones × 30 registros, intercalados a través de expiraciones.
    let audited_sessions = ["sess-alpha", "sess-beta", "sess-gamma"];
    for index in 0..30_i64 {
        for session in audited_sessions {
            bus.put_record("letters", session, &json!({ "index": index }))
                .expect("BUS_FAULT: put rejected");
        }
        if index % 10 == 9 {
            // Pausa que atraviesa al menos una expiración de arrendamiento.
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    // Drenaje: esperar la entrega completa con techo temporal.
    let expected_total = 30 * audited_sessions.len();
    for _ in 0..50 {
        if processor.total_deliveries() >= expected_total {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // Apagado cooperativo y baja del consumidor nominado.
    shutdown_sender.send(true).expect("SHUTDOWN_FAULT");
    supervisor.join().await;

    let mut anomalies_detected = 0;
    for session in audited_sessions {
        let delivered = processor.deliveries_for(session);
        println!("   📦 [{}]: {} registro(s) entregados.", session, delivered.len());

        if delivered.len() != 30 {
            anomalies_detected += 1;
            println!("      ❌ Entrega incompleta o duplicada: {} ≠ 30.", delivered.len());
        }
        if delivered != (0..30).collect::<Vec<i64>>() {
            anomalies_detected += 1;
            println!("      ❌ Orden por sesión violado: {delivered:?}");
        }
    }

    // Tras la baja, el nombre del consumidor queda libre.
    let re_registration = bus.register_consumer("letters", "word-engine-audit").unwrap();
    assert!(!re_registration.reused, "DEREGISTRATION_FAULT: consumer survived shutdown");

    println!("🏁 [INFORME]: Continuidad certificada. Anomalías: {anomalies_detected}.");
    assert_eq!(anomalies_detected, 0, "La continuidad del fan-out ha sido comprometida.");
}

#[tokio::test]
async fn cross_shard_partitioning_isolates_sessions() {
    let bus = short_lease_bus("landmarks", 4, 30_000);

    // La misma clave aterriza siempre en el mismo shard.
    let first_receipt = bus.put_record("landmarks", "sess-pin", &json!({"index": 0})).unwrap();
    for index in 1..8 {
        let receipt = bus.put_record("landmarks", "sess-pin", &json!({ "index": index })).unwrap();
        assert_eq!(receipt.shard_id, first_receipt.shard_id, "PARTITION_FAULT: session migrated shards");
    }
}
