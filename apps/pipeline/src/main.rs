// [apps/pipeline/src/main.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE MAIN ENTRY POINT (V6.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El proceso garantiza que la hidratación del clasificador ocurra
 * antes que la apertura del socket TCP, previniendo estados de
 * carrera donde el gateway encole fotogramas hacia un motor de
 * inferencia aún no cristalizado.
 * =================================================================
 */

use glossa_pipeline::{PipelineConfig, PipelineKernel};

use dotenvy::dotenv;
use glossa_shared_panoptes::init_tracing;
use tracing::{error, info};

/**
 * Punto de ignición supremo del binario de la columna vertebral.
 */
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD NEURAL (PANOPTES)
    init_tracing("glossa_pipeline");

    // 3. CONFIGURACIÓN DEL RUNTIME SOBERANO
    let runtime_spine = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_spine.block_on(async {
        info!("🛰️  [SPINE]: Global ignition sequence starting...");

        // 4. ADQUISICIÓN DE COORDENADAS TÁCTICAS
        let database_connection_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "file:glossa_tactical.db".to_string());
        let database_access_token = std::env::var("DATABASE_AUTH_TOKEN").ok();
        let pipeline_config = PipelineConfig::from_environment();

        // 5. CONSTRUCCIÓN DEL KERNEL SOBERANO (ESTRATO L1-APP)
        let kernel_instance = match PipelineKernel::ignite(
            &database_connection_url,
            database_access_token,
            pipeline_config,
        )
        .await
        {
            Ok(kernel) => kernel,
            Err(ignition_fault) => {
                error!("💀 [IGNITION_ABORTED]: {}", ignition_fault);
                std::process::exit(1);
            }
        };

        // 6. IGNICIÓN DE OPERACIONES DE LA COLUMNA
        info!(
            "🚀 [GLOSSA_ONLINE]: Spine fully operational on port {}.",
            kernel_instance.server_network_port
        );
        if let Err(operation_fault) = kernel_instance.launch_spine_operations().await {
            error!("💀 [SPINE_COLLAPSE]: {}", operation_fault);
            std::process::exit(1);
        }

        Ok(())
    })
}
