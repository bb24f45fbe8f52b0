// [apps/pipeline/src/state.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE STATE HUB (V5.0 - COMPOSITION ROOT)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE REPOSITORIOS, MOTORES Y BUS
 *
 * # Mathematical Proof (Deterministic State Hub):
 * Todo aparato del proceso comparte exactamente las mismas instancias
 * Arc de bus, almacén y motores: cualquier compromiso realizado por
 * una tarea de shard es visible de inmediato por el barrido de pausa
 * y por la superficie de ingreso.
 * =================================================================
 */

use crate::config::PipelineConfig;
use glossa_domain_commit::{CommitEngine, SessionStore};
use glossa_domain_resolver::WordResolver;
use glossa_infra_db::repositories::{ConnectionRepository, SessionRepository};
use glossa_infra_db::GlossaDbClient;
use glossa_infra_stream::StreamBus;
use std::sync::Arc;

/// Contenedor de estado compartido (thread-safe) del proceso.
#[derive(Clone)]
pub struct AppState {
    /// Cliente táctico del sustrato libSQL.
    pub database_client: GlossaDbClient,
    /// Bus de flujo embebido (landmarks + letters).
    pub stream_bus: Arc<StreamBus>,
    /// Configuración soberana hidratada del entorno.
    pub config: Arc<PipelineConfig>,
    /// Registro de conexiones del gateway (conveniencia, no verdad).
    pub connection_registry: Arc<ConnectionRepository>,
    /// Almacén de sesión durable (ventanas, buffers, arrendamientos).
    pub session_store: Arc<dyn SessionStore>,
    /// Motor de compromiso de letras.
    pub commit_engine: Arc<CommitEngine>,
    /// Resolutor de palabras sobre el índice léxico.
    pub word_resolver: Arc<WordResolver>,
}

impl AppState {
    pub fn assemble(
        database_client: GlossaDbClient,
        stream_bus: Arc<StreamBus>,
        config: PipelineConfig,
        word_resolver: Arc<WordResolver>,
    ) -> Self {
        let session_store: Arc<dyn SessionStore> = Arc::new(SessionRepository::new(
            database_client.clone(),
            config.commit.session_ttl_seconds,
        ));

        let commit_engine = Arc::new(CommitEngine::new(
            Arc::clone(&session_store),
            config.commit.clone(),
        ));

        Self {
            connection_registry: Arc::new(ConnectionRepository::new(database_client.clone())),
            database_client,
            stream_bus,
            config: Arc::new(config),
            session_store,
            commit_engine,
            word_resolver,
        }
    }
}
