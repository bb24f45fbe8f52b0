// INICIO DEL ARCHIVO [apps/pipeline/src/routes.rs]
/*!
 * =================================================================
 * APARATO: INGRESS ROUTING MATRIX (V4.0 - GATEWAY STRATUM)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RUTAS DEL MULTIPLEXOR DE INGRESO
 *
 * # Logic:
 * El gateway externo termina el transporte persistente del cliente e
 * invoca estas rutas con la cabecera x-connection-id. Rutas
 * desconocidas reciben 404 del router; el contrato de contenido
 * saliente vive exclusivamente en el worker de entrega.
 * =================================================================
 */

use crate::handlers::gateway;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_ingress_router(application_shared_state: AppState) -> Router {
    // Escudo de red: CORS para el frontend de captura y herramientas de Ops.
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // ESTRATO DE INGRESO: rutas del protocolo del gateway.
    let gateway_stratum = Router::new()
        .route("/connect", post(gateway::handle_connect))
        .route("/disconnect", post(gateway::handle_disconnect))
        .route("/sendlandmarks", post(gateway::handle_send_landmarks));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest("/gateway", gateway_stratum)
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
// FIN DEL ARCHIVO [apps/pipeline/src/routes.rs]
