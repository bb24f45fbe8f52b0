// [apps/pipeline/src/handlers/gateway.rs]
/*!
 * =================================================================
 * APARATO: INGRESS GATEWAY HANDLER (V5.1 - ONE WAY LAW)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: MULTIPLEXADO DE SESIONES Y ENCOLADO PARTICIONADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ONE WAY LAW: El ingreso jamás escribe contenido de vuelta al
 *    cliente; devuelve acuses genéricos al gateway. La entrega de
 *    resoluciones viaja exclusivamente por el worker saliente.
 * 2. REGISTRY AS CONVENIENCE: Un fallo del registro de conexiones se
 *    reporta y el encolado continúa; el registro no es la fuente de
 *    verdad del flujo.
 * 3. GEOMETRY GATE: Payloads con cardinalidad distinta de 1662 o
 *    valores no finitos se rechazan con acuse 400 sin encolar.
 * =================================================================
 */

use crate::state::AppState;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use glossa_domain_models::{LandmarkRecord, SourceMeta, HOLISTIC_FRAME_VALUES};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};

/// Cabecera del gateway con el identificador de conexión.
const CONNECTION_ID_HEADER: &str = "x-connection-id";

/// Payload de la ruta sendlandmarks del protocolo de ingreso.
#[derive(Deserialize)]
pub struct SendLandmarksPayload {
    /// Acción declarada por el cliente (informativa).
    #[allow(dead_code)]
    pub action: Option<String>,
    /// Sesión declarada; ausente → se usa el connection_id.
    pub session_id: Option<String>,
    /// Vector holístico completo (1662 reales).
    #[serde(default)]
    pub data: Vec<f64>,
}

/// Endpoint: POST /gateway/connect
///
/// Registra la conexión con sesión pendiente y TTL de 24 h. Un fallo
/// del registro no veta la conexión.
#[instrument(skip(application_state, request_headers))]
pub async fn handle_connect(
    State(application_state): State<AppState>,
    request_headers: HeaderMap,
) -> impl IntoResponse {
    let Some(connection_id) = extract_connection_id(&request_headers) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Missing connection id"})));
    };

    info!("🔌 [INGRESS]: New connection [{}].", connection_id);

    if let Err(registry_fault) = application_state
        .connection_registry
        .register_pending(&connection_id, &Utc::now().to_rfc3339(), crate::epoch_seconds_now())
        .await
    {
        // El registro es conveniencia: se reporta y la conexión procede.
        warn!("⚠️  [INGRESS]: Registry write failed for [{}]: {}", connection_id, registry_fault);
    }

    (StatusCode::OK, Json(json!({"message": "Connected"})))
}

/// Endpoint: POST /gateway/disconnect
#[instrument(skip(application_state, request_headers))]
pub async fn handle_disconnect(
    State(application_state): State<AppState>,
    request_headers: HeaderMap,
) -> impl IntoResponse {
    let Some(connection_id) = extract_connection_id(&request_headers) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Missing connection id"})));
    };

    info!("🔌 [INGRESS]: Disconnection [{}].", connection_id);

    if let Err(registry_fault) = application_state.connection_registry.remove(&connection_id).await {
        warn!("⚠️  [INGRESS]: Registry removal failed for [{}]: {}", connection_id, registry_fault);
    }

    (StatusCode::OK, Json(json!({"message": "Disconnected"})))
}

/// Endpoint: POST /gateway/sendlandmarks
///
/// Valida la geometría del payload, actualiza el registro y encola un
/// registro en el flujo de landmarks particionado por sesión.
#[instrument(skip(application_state, request_headers, request_payload))]
pub async fn handle_send_landmarks(
    State(application_state): State<AppState>,
    request_headers: HeaderMap,
    Json(request_payload): Json<SendLandmarksPayload>,
) -> impl IntoResponse {
    let Some(connection_id) = extract_connection_id(&request_headers) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Missing connection id"})));
    };

    // Puerta de cardinalidad: el vector holístico es posicional.
    if request_payload.data.len() != HOLISTIC_FRAME_VALUES {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "No landmark data provided or wrong cardinality",
                "expected": HOLISTIC_FRAME_VALUES,
                "received": request_payload.data.len()
            })),
        );
    }

    // Sesión declarada o identidad de la conexión como fallback.
    let session_id = request_payload
        .session_id
        .clone()
        .unwrap_or_else(|| connection_id.clone());

    let ingress_timestamp = Utc::now();

    let landmark_record = LandmarkRecord {
        session_id: session_id.clone(),
        connection_id: connection_id.clone(),
        timestamp: ingress_timestamp.to_rfc3339(),
        landmarks: request_payload.data,
        metadata: SourceMeta {
            source: "websocket".into(),
            event_time: Some(ingress_timestamp.timestamp_millis()),
        },
    };

    // Puerta de finitud: NaN/∞ jamás entran al bus.
    if !landmark_record.has_valid_geometry() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Non-finite landmark values rejected"})),
        );
    }

    // Actualización best-effort del registro (conveniencia de entrega).
    if let Err(registry_fault) = application_state
        .connection_registry
        .bind_session_activity(&connection_id, &session_id, &ingress_timestamp.to_rfc3339())
        .await
    {
        warn!(
            "⚠️  [INGRESS]: Registry bind failed for [{} ↔ {}]: {}",
            connection_id, session_id, registry_fault
        );
    }

    match application_state.stream_bus.put_record(
        &application_state.config.landmarks_stream_name,
        &session_id,
        &landmark_record,
    ) {
        Ok(put_receipt) => {
            info!(
                "📨 [INGRESS]: Frame sealed for [{}] ({} seq {}).",
                session_id, put_receipt.shard_id, put_receipt.sequence_number
            );
            (StatusCode::OK, Json(json!({"message": "Accepted"})))
        }
        Err(stream_fault) => {
            error!("❌ [INGRESS]: Stream enqueue failed for [{}]: {}", session_id, stream_fault);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "Stream unavailable"})))
        }
    }
}

fn extract_connection_id(request_headers: &HeaderMap) -> Option<String> {
    request_headers
        .get(CONNECTION_ID_HEADER)
        .and_then(|header_value| header_value.to_str().ok())
        .filter(|header_text| !header_text.is_empty())
        .map(|header_text| header_text.to_string())
}
