// INICIO DEL ARCHIVO [apps/pipeline/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE SOVEREIGN KERNEL (V6.0 - SPINE IGNITION)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FATAL BEFORE SOCKET: El clasificador se hidrata ANTES de abrir
 *    el socket TCP; un artefacto de pesos ausente aborta la ignición
 *    sin aceptar tráfico a medio inicializar.
 * 2. ONE PROCESS, ONE SPINE: Etapa de letras, etapa de palabras,
 *    barrido de pausa, Reaper y superficie de ingreso comparten el
 *    mismo bus y el mismo almacén dentro del proceso.
 * 3. COOPERATIVE SHUTDOWN: SIGINT voltea la bandera watch; los
 *    supervisores de fan-out dan de baja sus consumidores nominados
 *    antes de la defunción del proceso.
 * =================================================================
 */

use crate::config::PipelineConfig;
use crate::routes::create_ingress_router;
use crate::services::{spawn_pause_sweeper, spawn_session_reaper, OutboundDispatcher};
use crate::stages::{LetterStageProcessor, WordFinalizer, WordStageProcessor};
use crate::state::AppState;
use glossa_core_classifier::{
    initialize_global_classifier, teardown_global_classifier, LetterClassifier,
};
use glossa_domain_resolver::{ResolutionSink, WordResolver};
use glossa_infra_db::repositories::LexiconRepository;
use glossa_infra_db::GlossaDbClient;
use glossa_infra_stream::{EnhancedFanoutConsumer, StreamBus, StreamConfig};
use glossa_infra_uplink::PushWorkerClient;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

pub struct PipelineKernel {
    pub server_network_port: u16,
    pub application_shared_state: AppState,
    classifier: Arc<dyn LetterClassifier>,
    resolution_sink: Arc<dyn ResolutionSink>,
}

impl PipelineKernel {
    /// Realiza la ignición del cliente táctico, el clasificador y el bus.
    /// Los fallos de configuración son fatales por contrato.
    pub async fn ignite(
        database_connection_url: &str,
        database_access_token: Option<String>,
        config: PipelineConfig,
    ) -> anyhow::Result<Self> {
        let database_client =
            GlossaDbClient::connect(database_connection_url, database_access_token).await?;

        // FATAL BEFORE SOCKET: pesos ausentes abortan la ignición.
        let classifier: Arc<dyn LetterClassifier> = initialize_global_classifier(
            &config.classifier_artifact_path,
            &config.classifier_labels_path,
        )?;

        let stream_bus = Arc::new(StreamBus::new());
        for stream_name in [&config.landmarks_stream_name, &config.letters_stream_name] {
            stream_bus.create_stream(StreamConfig {
                name: stream_name.clone(),
                shard_count: config.stream_shard_count,
                retention_records_per_shard: 4096,
                subscription_lease: config.subscription_lease,
                heartbeat_interval: config.heartbeat_interval,
            })?;
        }

        let lexicon_repository =
            Arc::new(LexiconRepository::new(database_client.clone()));
        let word_resolver = Arc::new(WordResolver::new(lexicon_repository));

        let push_worker_client = PushWorkerClient::new(&config.push_worker_url)?;
        let resolution_sink: Arc<dyn ResolutionSink> =
            Arc::new(OutboundDispatcher::new(push_worker_client));

        let listening_port = config.listening_port;
        let application_shared_state =
            AppState::assemble(database_client, stream_bus, config, word_resolver);

        Ok(Self {
            server_network_port: listening_port,
            application_shared_state,
            classifier,
            resolution_sink,
        })
    }

    /// Lanza las operaciones autónomas de la columna y el servidor HTTP.
    pub async fn launch_spine_operations(self) -> anyhow::Result<()> {
        let state = self.application_shared_state.clone();
        let config = Arc::clone(&state.config);

        // --- 1. PROTOCOLO DE APAGADO COOPERATIVO ---
        let (shutdown_sender, shutdown_signal) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("🛑 [KERNEL]: SIGINT observed. Cooperative shutdown engaged.");
                let _ = shutdown_sender.send(true);
            }
        });

        // --- 2. ETAPA DE LETRAS (landmarks → letters) ---
        let letter_processor = Arc::new(LetterStageProcessor::new(
            Arc::clone(&self.classifier),
            Arc::clone(&state.stream_bus),
            config.letters_stream_name.clone(),
        ));
        let letter_supervisor = EnhancedFanoutConsumer::ignite(
            Arc::clone(&state.stream_bus),
            &config.landmarks_stream_name,
            &config.consumer_name_for("letter-engine"),
            letter_processor,
            shutdown_signal.clone(),
        )
        .await?;

        // --- 3. ETAPA DE PALABRAS (letters → resoluciones) ---
        let word_finalizer = Arc::new(WordFinalizer::new(
            Arc::clone(&state.session_store),
            Arc::clone(&state.word_resolver),
            Arc::clone(&self.resolution_sink),
        ));
        let word_processor = Arc::new(WordStageProcessor::new(
            Arc::clone(&state.commit_engine),
            Arc::clone(&word_finalizer),
        ));
        let word_supervisor = EnhancedFanoutConsumer::ignite(
            Arc::clone(&state.stream_bus),
            &config.letters_stream_name,
            &config.consumer_name_for("word-engine"),
            word_processor,
            shutdown_signal.clone(),
        )
        .await?;

        // --- 4. DAEMONS DE MANTENIMIENTO TÁCTICO ---
        let sweeper_handle = spawn_pause_sweeper(
            Arc::clone(&state.session_store),
            Arc::clone(&state.commit_engine),
            word_finalizer,
            config.pause_sweep_interval,
            shutdown_signal.clone(),
        );
        let reaper_handle = spawn_session_reaper(
            Arc::clone(&state.session_store),
            config.session_reap_interval,
            shutdown_signal.clone(),
        );

        // --- 5. IGNICIÓN DEL TRANSPORTE HTTP (AXUM) ---
        let ingress_router = create_ingress_router(state.clone());
        let bind_address = SocketAddr::new(
            "0.0.0.0".parse::<IpAddr>().expect("FATAL: bind address malformed"),
            self.server_network_port,
        );

        info!("🚀 [KERNEL_ONLINE]: Glossa spine listening at {}", bind_address);

        let tcp_listener = tokio::net::TcpListener::bind(bind_address).await?;

        let mut server_shutdown_signal = shutdown_signal.clone();
        let server_outcome = axum::serve(tcp_listener, ingress_router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown_signal.changed().await;
            })
            .await;

        if let Err(server_fault) = server_outcome {
            error!("💀 [KERNEL_COLLAPSE]: Runtime failure: {}", server_fault);
        }

        // --- 6. RETIRADA ORDENADA ---
        info!("🧹 [KERNEL]: Draining shard tasks and deregistering consumers...");
        letter_supervisor.join().await;
        word_supervisor.join().await;
        let _ = sweeper_handle.await;
        let _ = reaper_handle.await;
        teardown_global_classifier();

        info!("👋 [KERNEL]: Glossa spine stopped gracefully.");
        Ok(())
    }
}
// FIN DEL ARCHIVO [apps/pipeline/src/kernel.rs]
