// [apps/alias-forge/src/ingest.rs]
/*!
 * =================================================================
 * APARATO: FORGE INGEST PHASE (V4.2 - DETERMINISTIC EMISSION)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: TEXTO CRUDO → TÉRMINOS ÚNICOS + MANIFIESTO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. NOTIFICATION DEDUP: La notificación residente en el Ledger veta
 *    re-entregas; el sellado viaja en la misma transición INGESTED.
 * 2. DETERMINISTIC EMISSION: Texto crudo, listado ordenado de términos
 *    y manifiesto de metadatos aterrizan en el bucket raw con claves
 *    derivadas del nombre base del documento.
 * 3. TERMS READY: La fase publica el aviso de términos listos que la
 *    síntesis consume; también se materializa como objeto para los
 *    operadores.
 * =================================================================
 */

use crate::kernel::ForgeKernel;
use crate::object_base_name;
use chrono::Utc;
use glossa_domain_ingest::clean_and_tokenize;
use glossa_domain_models::{AliasJobStatus, OcrCompletionNotice, TermsReadyNotice};
use glossa_infra_blobstore::{RAW_BUCKET, UPLOADS_BUCKET};
use serde_json::json;
use tracing::{info, warn};

/// Fase de ingesta: procesa una notificación de finalización de OCR
/// (o de disponibilidad directa para formatos planos).
///
/// Devuelve el aviso de términos listos, o None cuando la notificación
/// fue deduplicada o el trabajo quedó sellado como FAILED.
pub async fn ingest_document(
    kernel: &ForgeKernel,
    completion_notice: &OcrCompletionNotice,
) -> anyhow::Result<Option<TermsReadyNotice>> {
    let job_repository = kernel.job_repository();
    let polled_at = Utc::now().to_rfc3339();

    let Some(forge_job) = job_repository.find_job(&completion_notice.job_id).await? else {
        warn!(
            "⚠️  [FORGE_INGEST]: Job [{}] not found in Ledger. Notice dropped.",
            completion_notice.job_id
        );
        return Ok(None);
    };

    // Deduplicación: la notificación residente veta re-entregas.
    if forge_job.notification_id.as_deref() == Some(completion_notice.notification_id.as_str()) {
        info!(
            "♻️  [FORGE_INGEST]: Notification [{}] already processed for job [{}]. Skipping.",
            completion_notice.notification_id, forge_job.job_id
        );
        return Ok(None);
    }

    if matches!(forge_job.status, AliasJobStatus::Ingested | AliasJobStatus::Completed) {
        info!("♻️  [FORGE_INGEST]: Job [{}] already ingested. Skipping.", forge_job.job_id);
        return Ok(None);
    }

    // Solo notificaciones SUCCEEDED se ingestan; el resto sella FAILED.
    if completion_notice.status != "SUCCEEDED" {
        warn!(
            "❌ [FORGE_INGEST]: Job [{}] reported status {}. Sealing as FAILED.",
            forge_job.job_id, completion_notice.status
        );
        job_repository
            .mark_failed(
                &forge_job.job_id,
                &format!("OCR_STATUS_{}", completion_notice.status),
                &completion_notice.notification_id,
                &polled_at,
            )
            .await?;
        return Ok(None);
    }

    // Fuente de texto: líneas del OCR o lectura directa del objeto plano.
    let raw_text = if crate::needs_ocr(&forge_job.object_key) {
        let Some(ocr_gateway) = kernel.ocr_gateway.as_ref() else {
            anyhow::bail!("OCR_GATEWAY_URL required to ingest job [{}]", forge_job.job_id);
        };
        ocr_gateway.fetch_extracted_lines(&forge_job.job_id).await?.join("\n")
    } else {
        let object_bytes = kernel
            .blob_store
            .get_object(UPLOADS_BUCKET, &forge_job.object_key)
            .await?;
        String::from_utf8_lossy(&object_bytes).into_owned()
    };

    let line_count = raw_text.lines().count() as u64;
    let raw_word_count = raw_text.split_whitespace().count() as u64;

    // Tokenización determinista: conjunto ordenado de términos únicos.
    let unique_terms: Vec<String> = clean_and_tokenize(&raw_text).into_iter().collect();
    info!(
        "🧹 [FORGE_INGEST]: {} unique term(s) from {} raw word(s) (job [{}]).",
        unique_terms.len(),
        raw_word_count,
        forge_job.job_id
    );

    // Emisión de artefactos en el bucket raw.
    let base_name = object_base_name(&forge_job.object_key);
    let text_key = format!("{}/{}.txt", forge_job.user_id, base_name);
    let terms_key = format!("{}/{}_terms.json", forge_job.user_id, base_name);
    let metadata_key = format!("{}/{}_metadata.json", forge_job.user_id, base_name);

    kernel
        .blob_store
        .put_object(RAW_BUCKET, &text_key, raw_text.as_bytes())
        .await?;

    let terms_manifest = json!({
        "job_id": forge_job.job_id,
        "user_id": forge_job.user_id,
        "original_file": forge_job.object_key,
        "term_count": unique_terms.len(),
        "terms": unique_terms,
    });
    kernel
        .blob_store
        .put_object(RAW_BUCKET, &terms_key, serde_json::to_string_pretty(&terms_manifest)?.as_bytes())
        .await?;

    let processed_at = Utc::now().to_rfc3339();
    let metadata_manifest = json!({
        "job_id": forge_job.job_id,
        "user_id": forge_job.user_id,
        "original_file": forge_job.object_key,
        "processed_at": processed_at,
        "line_count": line_count,
        "raw_word_count": raw_word_count,
        "cleaned_term_count": terms_manifest["term_count"],
    });
    kernel
        .blob_store
        .put_object(RAW_BUCKET, &metadata_key, serde_json::to_string_pretty(&metadata_manifest)?.as_bytes())
        .await?;

    // Transición INGESTED con el sellado de la notificación.
    job_repository
        .mark_ingested(&forge_job.job_id, &text_key, &completion_notice.notification_id, &polled_at)
        .await?;

    // Publicación del aviso de términos listos.
    let term_count = terms_manifest["term_count"].as_u64().unwrap_or(0);
    let terms_ready = TermsReadyNotice {
        job_id: forge_job.job_id.clone(),
        user_id: forge_job.user_id.clone(),
        terms_key: terms_key.clone(),
        term_count,
        original_file: forge_job.object_key.clone(),
        processed_at,
    };

    let ready_key = format!("{}/{}_terms_ready.json", forge_job.user_id, base_name);
    kernel
        .blob_store
        .put_object(RAW_BUCKET, &ready_key, serde_json::to_string_pretty(&terms_ready)?.as_bytes())
        .await?;

    info!(
        "✓ [FORGE_INGEST]: Job [{}] ingested ({} terms ready at {}).",
        forge_job.job_id, term_count, terms_key
    );
    Ok(Some(terms_ready))
}
