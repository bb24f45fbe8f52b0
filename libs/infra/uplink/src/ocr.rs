// [libs/infra/uplink/src/ocr.rs]
/*!
 * =================================================================
 * APARATO: OCR GATEWAY UPLINK (V2.2 - ASYNC ANALYSIS)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: IGNICIÓN DE ANÁLISIS Y RECUPERACIÓN DE LÍNEAS
 *
 * # Logic:
 * El OCR es un colaborador externo asíncrono: 'start_analysis' inicia
 * el trabajo sobre un objeto del bucket y el gateway notifica la
 * finalización por su propio canal; 'fetch_extracted_lines' recupera
 * las líneas cuando la notificación declara SUCCEEDED.
 * =================================================================
 */

use crate::UplinkError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct AnalysisStartPayload<'object> {
    bucket: &'object str,
    object_key: &'object str,
}

/// Recibo de ignición de un análisis asíncrono.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrAnalysisStart {
    /// Identificador del trabajo de OCR externo.
    pub job_id: String,
}

/// Líneas extraídas de un trabajo sellado.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrExtractedLines {
    pub status: String,
    pub lines: Vec<String>,
}

/// Cliente endurecido del gateway de OCR.
pub struct OcrGatewayClient {
    network_uplink_client: Client,
    gateway_base_endpoint: String,
}

impl OcrGatewayClient {
    /// # Errors:
    /// - `ConfigurationVoid` si el endpoint llega vacío.
    pub fn new(gateway_base_url: &str) -> Result<Self, UplinkError> {
        if gateway_base_url.is_empty() {
            return Err(UplinkError::ConfigurationVoid("OCR_GATEWAY_URL".into()));
        }

        Ok(Self {
            network_uplink_client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent("Glossa-Alias-Forge/V2.2")
                .build()
                .map_err(UplinkError::Network)?,
            gateway_base_endpoint: gateway_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Inicia el análisis asíncrono de un documento escaneado.
    pub async fn start_analysis(
        &self,
        bucket: &str,
        object_key: &str,
    ) -> Result<OcrAnalysisStart, UplinkError> {
        info!("📄 [OCR_UPLINK]: Starting analysis of s3-style object [{}/{}].", bucket, object_key);

        let network_response = self
            .network_uplink_client
            .post(format!("{}/analysis", self.gateway_base_endpoint))
            .json(&AnalysisStartPayload { bucket, object_key })
            .send()
            .await?;

        let http_status = network_response.status();
        if !http_status.is_success() {
            return Err(UplinkError::RemoteRejection(http_status.as_u16()));
        }

        Ok(network_response.json::<OcrAnalysisStart>().await?)
    }

    /// Recupera las líneas extraídas de un trabajo de OCR sellado.
    ///
    /// # Errors:
    /// - `ContractViolation` si el gateway reporta un estado no SUCCEEDED.
    pub async fn fetch_extracted_lines(
        &self,
        ocr_job_id: &str,
    ) -> Result<Vec<String>, UplinkError> {
        debug!("📄 [OCR_UPLINK]: Fetching lines for job [{}].", ocr_job_id);

        let network_response = self
            .network_uplink_client
            .get(format!("{}/analysis/{}/lines", self.gateway_base_endpoint, ocr_job_id))
            .send()
            .await?;

        let http_status = network_response.status();
        if !http_status.is_success() {
            return Err(UplinkError::RemoteRejection(http_status.as_u16()));
        }

        let extracted = network_response.json::<OcrExtractedLines>().await?;
        if extracted.status != "SUCCEEDED" {
            return Err(UplinkError::ContractViolation(format!(
                "OCR_STATUS_{} for job [{}]",
                extracted.status, ocr_job_id
            )));
        }

        info!("📄 [OCR_UPLINK]: {} line(s) recovered for job [{}].", extracted.lines.len(), ocr_job_id);
        Ok(extracted.lines)
    }
}
