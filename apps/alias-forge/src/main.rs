// [apps/alias-forge/src/main.rs]
/*!
 * =================================================================
 * APARATO: ALIAS FORGE COMMAND INTERFACE (V4.0 - OPERATOR CLI)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN POR FASES DE LA FORJA OFFLINE
 *
 * # Logic:
 * submit → (OCR externo) → ingest → synthesize. El subcomando 'run'
 * encadena las fases para un archivo local de formato plano: carga al
 * bucket, registra el trabajo, fabrica el aviso sintético de
 * disponibilidad y sintetiza en una sola invocación.
 * =================================================================
 */

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use glossa_alias_forge::{extract_user_id, ingest_document, submit_upload, synthesize_aliases, ForgeKernel};
use glossa_domain_models::OcrCompletionNotice;
use glossa_infra_blobstore::UPLOADS_BUCKET;
use glossa_shared_panoptes::init_tracing;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "alias-forge",
    about = "Forja offline del léxico personalizado de Glossa",
    version
)]
struct ForgeCli {
    /// URL del sustrato libSQL del Ledger y el léxico.
    #[arg(long, env = "DATABASE_URL", default_value = "file:glossa_tactical.db")]
    database_url: String,

    /// Token de acceso para sustratos remotos.
    #[arg(long, env = "DATABASE_AUTH_TOKEN")]
    database_token: Option<String>,

    /// Raíz del almacén de objetos (uploads/raw/aliases).
    #[arg(long, env = "BLOB_STORE_ROOT", default_value = "./glossa_blobs")]
    blob_root: String,

    #[command(subcommand)]
    command: ForgeCommand,
}

#[derive(Subcommand)]
enum ForgeCommand {
    /// Registra una carga ya residente en el bucket uploads.
    Submit {
        /// Clave del objeto (<user>/<archivo>).
        #[arg(long)]
        key: String,
    },
    /// Procesa una notificación de finalización de OCR (archivo JSON).
    Ingest {
        /// Ruta al JSON de la notificación.
        #[arg(long)]
        notice: PathBuf,
    },
    /// Sintetiza y materializa alias de un trabajo INGESTED.
    Synthesize {
        #[arg(long)]
        job_id: String,
    },
    /// Encadena submit → ingest → synthesize para un archivo local plano.
    Run {
        /// Archivo local de formato plano (txt/csv/md).
        #[arg(long)]
        file: PathBuf,
        /// Usuario dueño del léxico resultante.
        #[arg(long)]
        user: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("glossa_alias_forge");

    let forge_cli = ForgeCli::parse();

    let runtime_forge = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime_forge.block_on(async {
        let kernel = ForgeKernel::ignite(
            &forge_cli.database_url,
            forge_cli.database_token.clone(),
            &forge_cli.blob_root,
        )
        .await?;

        match forge_cli.command {
            ForgeCommand::Submit { key } => {
                let forge_job = submit_upload(&kernel, &key).await?;
                info!("🏁 [FORGE]: Job [{}] registered (status {}).", forge_job.job_id, forge_job.status);
            }

            ForgeCommand::Ingest { notice } => {
                let notice_bytes = std::fs::read(&notice)?;
                let completion_notice: OcrCompletionNotice = serde_json::from_slice(&notice_bytes)?;

                match ingest_document(&kernel, &completion_notice).await? {
                    Some(terms_ready) => info!(
                        "🏁 [FORGE]: Job [{}] ingested ({} terms at {}).",
                        terms_ready.job_id, terms_ready.term_count, terms_ready.terms_key
                    ),
                    None => info!("🏁 [FORGE]: Notice produced no new ingestion."),
                }
            }

            ForgeCommand::Synthesize { job_id } => {
                let outcome = synthesize_aliases(&kernel, &job_id).await?;
                info!(
                    "🏁 [FORGE]: Synthesis sealed ({} terms → {} surfaces).",
                    outcome.terms_processed, outcome.surfaces_materialized
                );
            }

            ForgeCommand::Run { file, user } => {
                // 1. Carga del archivo local al bucket uploads.
                let file_name = file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .ok_or_else(|| anyhow::anyhow!("Unreadable file name"))?;
                let object_key = format!("{user}/{file_name}");
                let file_bytes = std::fs::read(&file)?;
                kernel.blob_store.put_object(UPLOADS_BUCKET, &object_key, &file_bytes).await?;
                info!("📦 [FORGE]: Local file staged at uploads/{object_key}.");

                // 2. Registro del trabajo (formatos planos nacen SUCCEEDED).
                let forge_job = submit_upload(&kernel, &object_key).await?;

                // 3. Aviso sintético de disponibilidad directa.
                let synthetic_notice = OcrCompletionNotice {
                    notification_id: Uuid::new_v4().to_string(),
                    job_id: forge_job.job_id.clone(),
                    status: "SUCCEEDED".into(),
                    bucket: UPLOADS_BUCKET.into(),
                    object_key: object_key.clone(),
                };
                let Some(terms_ready) = ingest_document(&kernel, &synthetic_notice).await? else {
                    info!("🏁 [FORGE]: Nothing new to ingest for [{}].", forge_job.job_id);
                    return Ok(());
                };

                // 4. Síntesis y materialización.
                let outcome = synthesize_aliases(&kernel, &terms_ready.job_id).await?;
                info!(
                    "🏁 [FORGE]: Pipeline sealed for user [{}] ({} terms → {} surfaces).",
                    extract_user_id(&object_key),
                    outcome.terms_processed,
                    outcome.surfaces_materialized
                );
            }
        }

        Ok(())
    })
}
