// [libs/infra/uplink/src/push.rs]
/*!
 * =================================================================
 * APARATO: PUSH WORKER UPLINK (V3.0 - FIRE AND FORGET)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: ENTREGA ASÍNCRONA DE PALABRAS RESUELTAS
 *
 * # Logic:
 * El worker externo localiza la conexión vigente de la sesión en el
 * registro y escribe el payload al cliente. No hay contrato de
 * respuesta: el resolutor no espera ni conoce el resultado de la
 * entrega.
 * =================================================================
 */

use crate::UplinkError;
use glossa_domain_models::ResolvedWord;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Serialize)]
struct DeliveryPayload<'resolved> {
    session_id: &'resolved str,
    resolved_word: &'resolved ResolvedWord,
}

/// Cliente del worker de entrega saliente.
#[derive(Clone)]
pub struct PushWorkerClient {
    network_uplink_client: Client,
    worker_endpoint: String,
}

impl PushWorkerClient {
    /// # Errors:
    /// - `ConfigurationVoid` si el endpoint llega vacío.
    pub fn new(worker_endpoint_url: &str) -> Result<Self, UplinkError> {
        if worker_endpoint_url.is_empty() {
            return Err(UplinkError::ConfigurationVoid("PUSH_WORKER_URL".into()));
        }

        Ok(Self {
            network_uplink_client: Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent("Glossa-Outbound-Dispatcher/V3.0")
                .build()
                .map_err(UplinkError::Network)?,
            worker_endpoint: worker_endpoint_url.trim_end_matches('/').to_string(),
        })
    }

    /// Invocación asíncrona única hacia el worker. Sin contrato de
    /// respuesta: un 2xx se registra, todo lo demás se reporta y muere.
    pub async fn dispatch_resolved_word(&self, resolved_word: &ResolvedWord) {
        let delivery_payload = DeliveryPayload {
            session_id: &resolved_word.session_id,
            resolved_word,
        };

        match self
            .network_uplink_client
            .post(format!("{}/deliver", self.worker_endpoint))
            .json(&delivery_payload)
            .send()
            .await
        {
            Ok(network_response) if network_response.status().is_success() => {
                info!(
                    "📤 [OUTBOUND]: Resolved word '{}' dispatched for session [{}].",
                    resolved_word.raw_word, resolved_word.session_id
                );
            }
            Ok(network_response) => {
                error!(
                    "❌ [OUTBOUND]: Push worker rejection HTTP_{} for session [{}].",
                    network_response.status().as_u16(),
                    resolved_word.session_id
                );
            }
            Err(network_fault) => {
                error!(
                    "❌ [OUTBOUND]: Physical link failure for session [{}]: {}",
                    resolved_word.session_id, network_fault
                );
            }
        }

        debug!("📤 [OUTBOUND]: Dispatch cycle closed for [{}].", resolved_word.session_id);
    }
}
