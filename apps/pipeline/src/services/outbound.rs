// [apps/pipeline/src/services/outbound.rs]
/*!
 * =================================================================
 * APARATO: OUTBOUND DISPATCHER (V4.0 - DETACHED DELIVERY)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: ENTREGA DESACOPLADA DE PALABRAS RESUELTAS
 *
 * # Logic:
 * La entrega viaja en una tarea desprendida del reactor: el camino de
 * compromiso jamás espera al worker externo ni conoce el resultado.
 * El worker localiza la conexión vigente en el registro y escribe el
 * payload al cliente.
 * =================================================================
 */

use async_trait::async_trait;
use glossa_domain_models::ResolvedWord;
use glossa_domain_resolver::ResolutionSink;
use glossa_infra_uplink::PushWorkerClient;
use tracing::debug;

/// Despachador saliente sobre el worker de entrega externo.
pub struct OutboundDispatcher {
    push_worker_client: PushWorkerClient,
}

impl OutboundDispatcher {
    pub fn new(push_worker_client: PushWorkerClient) -> Self {
        Self { push_worker_client }
    }
}

#[async_trait]
impl ResolutionSink for OutboundDispatcher {
    async fn deliver(&self, resolved_word: &ResolvedWord) {
        let detached_client = self.push_worker_client.clone();
        let detached_payload = resolved_word.clone();

        debug!(
            "📮 [OUTBOUND]: Detaching delivery of '{}' for [{}].",
            detached_payload.raw_word, detached_payload.session_id
        );

        tokio::spawn(async move {
            detached_client.dispatch_resolved_word(&detached_payload).await;
        });
    }
}
