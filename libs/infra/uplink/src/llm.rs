// [libs/infra/uplink/src/llm.rs]
/*!
 * =================================================================
 * APARATO: LLM SYNTHESIS UPLINK (V4.1 - CONSTRAINED PROMPT)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: INVOCACIÓN DEL GATEWAY LLM Y EXTRACCIÓN DE JSON
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CLOSED SUBSTITUTION SET: El prompt de sistema restringe al modelo
 *    al conjunto cerrado de confusiones ASL; todo lo demás lo descarta
 *    el validador de la matriz aguas abajo.
 * 2. ROBUST EXTRACTION: La completación puede traer prosa residual; el
 *    extractor recorta el primer arreglo JSON balanceado ([ ... ]).
 * =================================================================
 */

use crate::UplinkError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Temperatura nominal de síntesis (variantes conservadoras).
const SYNTHESIS_TEMPERATURE: f64 = 0.2;

/// Prompt de sistema del sintetizador de alias. Conjunto CERRADO de
/// confusiones ASL; el modelo no puede inventar sustituciones.
pub const ALIAS_SYNTHESIS_SYSTEM_PROMPT: &str = r#"
TASK
Generate spelling-level alias variants for ASL fingerspelling, using ONLY the confusion pairs listed below.

OUTPUT (JSON ONLY)
Return an UPPERCASE JSON array of objects. No prose, no markdown. Example:
[
  {"surface":"AWS","aliases":["AW6","A W S"]}
]
Constraints:
- surface: UPPERCASE, 2-40 chars
- aliases: array of UPPERCASE strings (2-40 chars), max 50 per surface, minimum 10 per surface
- Return valid JSON only

ALLOWED CONFUSIONS (ONLY THESE)

1) Digit <-> Letter swaps
- W <-> 6
- W <-> 3
- V <-> 2
- F <-> 9
- D <-> 1
- O <-> 0

2) Compact-fist look-alikes (A / E / S / T / M / N)
- A <-> E, A <-> T    (NOT A <-> S)
- E <-> S, E <-> T, E <-> A, E <-> N, E <-> M
- T <-> A, T <-> E, T <-> M   (NOT T <-> S)
- S <-> N, S <-> T
- N <-> M

3) Orientation / mirror / pointing-finger
- H <-> U, H <-> V, H <-> 7
- R <-> U, R <-> V
- U <-> V, U <-> 7
- V <-> 7, V <-> 2

4) Circle or thumb-contact shapes
- C <-> O, C <-> 0
- D <-> 1
- O <-> 0

5) Dynamic / motion-dependent / similar shapes
- J <-> Z
- J <-> I
- Z <-> 1

STRUCTURAL EDITS
- Allow minor repetition or deletion of one character ("WW" <-> "W").
- Allow spacing/hyphenation ("AWS" -> "A W S", "A-W-S").
- Disallow any alias with edit distance > 2 from surface or length < 2.

RULES
- Apply substitutions anywhere (first/middle/last character).
- Do NOT modify any character unless it appears in the allowed lists above.
- Ignore "_" (pause); never emit it.
- Output JSON ONLY in uppercase; do not add explanations.
"#;

/// Objeto de síntesis del modelo: superficie con sus variantes crudas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceAliases {
    pub surface: String,
    pub aliases: Vec<String>,
}

#[derive(Serialize)]
struct SynthesisRequestPayload<'prompt> {
    system: &'prompt str,
    prompt: String,
    temperature: f64,
}

#[derive(Deserialize)]
struct SynthesisResponseEnvelope {
    completion: String,
}

/// Cliente endurecido del gateway LLM de síntesis de alias.
pub struct LlmGatewayClient {
    network_uplink_client: Client,
    gateway_base_endpoint: String,
}

impl LlmGatewayClient {
    /// Inicializa el cliente desde el endpoint del gateway.
    ///
    /// # Errors:
    /// - `ConfigurationVoid` si el endpoint llega vacío (fatal de arranque).
    pub fn new(gateway_base_url: &str, access_token: Option<String>) -> Result<Self, UplinkError> {
        if gateway_base_url.is_empty() {
            return Err(UplinkError::ConfigurationVoid("LLM_GATEWAY_URL".into()));
        }

        let mut client_builder = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("Glossa-Alias-Forge/V4.1");

        if let Some(token) = access_token {
            let mut header_map = reqwest::header::HeaderMap::new();
            let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| UplinkError::ConfigurationVoid("LLM_GATEWAY_TOKEN".into()))?;
            header_map.insert(reqwest::header::AUTHORIZATION, auth_value);
            client_builder = client_builder.default_headers(header_map);
        }

        Ok(Self {
            network_uplink_client: client_builder
                .build()
                .map_err(UplinkError::Network)?,
            gateway_base_endpoint: gateway_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sintetiza variantes de alias para una ráfaga de términos.
    ///
    /// # Errors:
    /// Propaga fallos de red y violaciones del contrato JSON; el llamador
    /// decide continuar con la siguiente ráfaga.
    pub async fn synthesize_alias_batch(
        &self,
        term_batch: &[String],
    ) -> Result<Vec<SurfaceAliases>, UplinkError> {
        let batch_listing = serde_json::to_string(term_batch)
            .map_err(|encode_fault| UplinkError::ContractViolation(encode_fault.to_string()))?;

        let request_payload = SynthesisRequestPayload {
            system: ALIAS_SYNTHESIS_SYSTEM_PROMPT,
            prompt: format!("Generate aliases for these terms:\n{batch_listing}"),
            temperature: SYNTHESIS_TEMPERATURE,
        };

        debug!("🧪 [LLM_UPLINK]: Dispatching batch of {} term(s).", term_batch.len());

        let network_response = self
            .network_uplink_client
            .post(format!("{}/invoke", self.gateway_base_endpoint))
            .json(&request_payload)
            .send()
            .await?;

        let http_status = network_response.status();
        if !http_status.is_success() {
            warn!("⚠️  [LLM_UPLINK]: Gateway rejection HTTP_{}.", http_status.as_u16());
            return Err(UplinkError::RemoteRejection(http_status.as_u16()));
        }

        let response_envelope: SynthesisResponseEnvelope = network_response.json().await?;
        let synthesized = extract_alias_array(&response_envelope.completion)?;

        info!(
            "🧪 [LLM_UPLINK]: {} surface(s) synthesized from {} term(s).",
            synthesized.len(),
            term_batch.len()
        );
        Ok(synthesized)
    }
}

/// Recorta y decodifica el primer arreglo JSON de la completación.
/// Los modelos ocasionalmente envuelven el arreglo en prosa residual.
pub fn extract_alias_array(completion_text: &str) -> Result<Vec<SurfaceAliases>, UplinkError> {
    let array_start = completion_text.find('[').ok_or_else(|| {
        UplinkError::ContractViolation("COMPLETION_WITHOUT_JSON_ARRAY".into())
    })?;
    let array_end = completion_text.rfind(']').ok_or_else(|| {
        UplinkError::ContractViolation("COMPLETION_WITH_UNCLOSED_ARRAY".into())
    })?;

    if array_end < array_start {
        return Err(UplinkError::ContractViolation("COMPLETION_ARRAY_INVERTED".into()));
    }

    let array_slice = &completion_text[array_start..=array_end];
    serde_json::from_str(array_slice)
        .map_err(|decode_fault| UplinkError::ContractViolation(decode_fault.to_string()))
}
