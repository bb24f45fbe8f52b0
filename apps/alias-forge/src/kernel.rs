// [apps/alias-forge/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: FORGE KERNEL (V4.0 - OFFLINE COMPOSITION ROOT)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: ENSAMBLE DE ALMACENES Y ENLACES DE LA FORJA
 *
 * # Logic:
 * Los enlaces externos (OCR, LLM) son opcionales en el ensamble: cada
 * fase exige el suyo al ejecutarse. Una fase invocada sin su enlace
 * configurado aborta con fallo de configuración, nunca con pánico.
 * =================================================================
 */

use glossa_infra_blobstore::BlobStore;
use glossa_infra_db::repositories::{AliasJobRepository, LexiconRepository};
use glossa_infra_db::GlossaDbClient;
use glossa_infra_uplink::{LlmGatewayClient, OcrGatewayClient};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Placa base de la forja: almacenes y enlaces compartidos por fase.
pub struct ForgeKernel {
    pub database_client: GlossaDbClient,
    pub blob_store: BlobStore,
    pub ocr_gateway: Option<OcrGatewayClient>,
    pub llm_gateway: Option<LlmGatewayClient>,
}

impl ForgeKernel {
    /// Ensambla la forja desde las coordenadas del entorno.
    pub async fn ignite(
        database_connection_url: &str,
        database_access_token: Option<String>,
        blob_store_root: &str,
    ) -> anyhow::Result<Self> {
        let database_client =
            GlossaDbClient::connect(database_connection_url, database_access_token).await?;
        let blob_store = BlobStore::open(blob_store_root).await?;

        let ocr_gateway = std::env::var("OCR_GATEWAY_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(|url| OcrGatewayClient::new(&url))
            .transpose()?;

        let llm_gateway = std::env::var("LLM_GATEWAY_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(|url| LlmGatewayClient::new(&url, std::env::var("LLM_GATEWAY_TOKEN").ok()))
            .transpose()?;

        info!(
            "🔥 [FORGE]: Kernel assembled (OCR: {}, LLM: {}).",
            if ocr_gateway.is_some() { "linked" } else { "absent" },
            if llm_gateway.is_some() { "linked" } else { "absent" }
        );

        Ok(Self { database_client, blob_store, ocr_gateway, llm_gateway })
    }

    pub fn job_repository(&self) -> AliasJobRepository {
        AliasJobRepository::new(self.database_client.clone())
    }

    pub fn lexicon_repository(&self) -> LexiconRepository {
        LexiconRepository::new(self.database_client.clone())
    }

    /// Epoch en segundos del reloj del sistema.
    pub fn epoch_seconds_now() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }
}
