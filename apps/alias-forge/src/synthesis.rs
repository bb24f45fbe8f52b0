// [apps/alias-forge/src/synthesis.rs]
/*!
 * =================================================================
 * APARATO: FORGE SYNTHESIS PHASE (V4.1 - MATRIX VALIDATED)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: TÉRMINOS → ALIAS VALIDADOS → LÉXICO MATERIALIZADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BATCH DISCIPLINE: Ráfagas de ≤ 50 términos hacia el gateway LLM;
 *    el colapso de una ráfaga se reporta y la siguiente continúa.
 * 2. MATRIX IS THE LAW: Todo alias del modelo atraviesa el validador
 *    de la matriz de confusión; solo variantes con score ≥ 0.5
 *    sobreviven, con techo de 50 por superficie ordenadas por score.
 * 3. UPSERT MONOPOLY: Esta fase es el único escritor del léxico.
 * =================================================================
 */

use crate::kernel::ForgeKernel;
use crate::object_base_name;
use chrono::Utc;
use glossa_domain_confusion::validate_alias;
use glossa_domain_models::{AliasJobStatus, LexiconEntry};
use glossa_infra_blobstore::{ALIASES_BUCKET, RAW_BUCKET};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Tamaño de ráfaga hacia el gateway LLM.
const SYNTHESIS_BATCH_SIZE: usize = 50;
/// Techo de alias materializados por superficie.
const ALIASES_PER_SURFACE_CEILING: usize = 50;

#[derive(Deserialize)]
struct TermsManifest {
    terms: Vec<String>,
}

/// Resumen de la fase de síntesis de un trabajo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutcome {
    pub terms_processed: usize,
    pub surfaces_materialized: usize,
}

/// Fase de síntesis: términos ingestados → alias validados → léxico.
///
/// # Errors:
/// - Configuración: gateway LLM ausente.
/// - Estado: el trabajo no está INGESTED.
pub async fn synthesize_aliases(
    kernel: &ForgeKernel,
    job_id: &str,
) -> anyhow::Result<SynthesisOutcome> {
    let Some(llm_gateway) = kernel.llm_gateway.as_ref() else {
        anyhow::bail!("LLM_GATEWAY_URL required for alias synthesis");
    };

    let job_repository = kernel.job_repository();
    let lexicon_repository = kernel.lexicon_repository();

    let forge_job = job_repository
        .find_job(job_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Job [{job_id}] not found in Ledger"))?;

    if forge_job.status != AliasJobStatus::Ingested {
        anyhow::bail!(
            "Job [{job_id}] is {} (INGESTED required for synthesis)",
            forge_job.status
        );
    }

    // Recuperación del listado de términos emitido por la ingesta.
    let base_name = object_base_name(&forge_job.object_key);
    let terms_key = format!("{}/{}_terms.json", forge_job.user_id, base_name);
    let terms_bytes = kernel.blob_store.get_object(RAW_BUCKET, &terms_key).await?;
    let terms_manifest: TermsManifest = serde_json::from_slice(&terms_bytes)?;

    info!(
        "🧪 [FORGE_SYNTHESIS]: {} term(s) queued for job [{}].",
        terms_manifest.terms.len(),
        job_id
    );

    // Síntesis por ráfagas con validación de matriz por alias.
    let mut validated_surfaces: BTreeMap<String, Vec<(String, f64)>> = BTreeMap::new();

    for (batch_index, term_batch) in terms_manifest.terms.chunks(SYNTHESIS_BATCH_SIZE).enumerate() {
        let batch_uppercase: Vec<String> =
            term_batch.iter().map(|term| term.to_uppercase()).collect();

        let synthesized_batch = match llm_gateway.synthesize_alias_batch(term_batch).await {
            Ok(batch) => batch,
            Err(uplink_fault) => {
                warn!(
                    "⚠️  [FORGE_SYNTHESIS]: Batch {} collapsed: {}. Continuing.",
                    batch_index + 1,
                    uplink_fault
                );
                continue;
            }
        };

        for surface_aliases in synthesized_batch {
            let surface = surface_aliases.surface.to_uppercase();

            // El modelo solo puede hablar de términos de SU ráfaga.
            if !batch_uppercase.contains(&surface) {
                continue;
            }

            let total_generated = surface_aliases.aliases.len();
            let mut surviving_aliases: Vec<(String, f64)> = surface_aliases
                .aliases
                .iter()
                .filter_map(|raw_alias| {
                    let verdict = validate_alias(&surface, raw_alias);
                    verdict
                        .accepted
                        .then(|| (raw_alias.to_uppercase(), round_to_millis(verdict.score)))
                })
                .collect();

            surviving_aliases.sort_by(|left, right| {
                right.1.partial_cmp(&left.1).unwrap_or(std::cmp::Ordering::Equal)
            });
            surviving_aliases.truncate(ALIASES_PER_SURFACE_CEILING);

            if !surviving_aliases.is_empty() {
                info!(
                    "✓ [FORGE_SYNTHESIS]: {}: {}/{} aliases validated.",
                    surface,
                    surviving_aliases.len(),
                    total_generated
                );
                validated_surfaces.insert(surface, surviving_aliases);
            }
        }
    }

    // Paquete de alias sellado en el bucket aliases.
    let processed_at = Utc::now().to_rfc3339();
    let bundle_aliases: serde_json::Map<String, serde_json::Value> = validated_surfaces
        .iter()
        .map(|(surface, aliases)| {
            let alias_listing: Vec<serde_json::Value> = aliases
                .iter()
                .map(|(alias, confidence)| json!({"alias": alias, "confidence": confidence}))
                .collect();
            (surface.clone(), serde_json::Value::Array(alias_listing))
        })
        .collect();

    let aliases_bundle = json!({
        "job_id": forge_job.job_id,
        "user_id": forge_job.user_id,
        "terms_count": terms_manifest.terms.len(),
        "aliases_count": validated_surfaces.len(),
        "processed_at": processed_at,
        "aliases": bundle_aliases,
        "status": "COMPLETED",
    });

    let bundle_key = format!("{}/{}_aliases.json", forge_job.user_id, base_name);
    kernel
        .blob_store
        .put_object(ALIASES_BUCKET, &bundle_key, serde_json::to_string_pretty(&aliases_bundle)?.as_bytes())
        .await?;

    // Materialización del léxico: upsert por (surface, user_id).
    for (surface, aliases) in &validated_surfaces {
        let lexicon_entry = LexiconEntry {
            surface: surface.clone(),
            aliases: aliases.iter().map(|(alias, _)| alias.clone()).collect(),
            confidence_scores: aliases.iter().cloned().collect(),
            user_id: forge_job.user_id.clone(),
            source_job_id: Some(forge_job.job_id.clone()),
            updated_at: processed_at.clone(),
        };
        lexicon_repository.upsert_entry(&lexicon_entry).await?;
    }

    job_repository.mark_completed(&forge_job.job_id, &processed_at).await?;

    info!(
        "🏁 [FORGE_SYNTHESIS]: Job [{}] completed. {} surface(s) materialized into the lexicon.",
        forge_job.job_id,
        validated_surfaces.len()
    );

    Ok(SynthesisOutcome {
        terms_processed: terms_manifest.terms.len(),
        surfaces_materialized: validated_surfaces.len(),
    })
}

/// Redondeo a tres decimales del score persistido.
fn round_to_millis(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}
