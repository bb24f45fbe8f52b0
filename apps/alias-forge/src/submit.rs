// [apps/alias-forge/src/submit.rs]
/*!
 * =================================================================
 * APARATO: FORGE SUBMIT PHASE (V4.1 - STABLE REQUEST ANCHOR)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: CREACIÓN IDEMPOTENTE DE TRABAJOS DE FORJA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. STABLE REQUEST ANCHOR: request_id = SHA-256(bucket|key|etag)
 *    recortado a 16 hex. Una re-carga bit-idéntica reutiliza el
 *    trabajo residente sin duplicar el Ledger.
 * 2. FORMAT ROUTING: Formatos escaneados inician OCR externo y nacen
 *    RUNNING; formatos planos nacen SUCCEEDED (listos para ingesta)
 *    con job_id = request_id.
 * =================================================================
 */

use crate::kernel::ForgeKernel;
use crate::{extract_user_id, needs_ocr};
use chrono::Utc;
use glossa_domain_models::{AliasJob, AliasJobStatus};
use glossa_infra_blobstore::UPLOADS_BUCKET;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Longitud del ancla de idempotencia (primeros 16 hex del SHA-256).
const REQUEST_ID_HEX_LENGTH: usize = 16;

/// request_id estable de una carga concreta.
pub fn compute_request_id(bucket: &str, object_key: &str, etag: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{bucket}|{object_key}|{etag}"));
    hex::encode(hasher.finalize())[..REQUEST_ID_HEX_LENGTH].to_string()
}

/// Etag de contenido del objeto (el sustrato local no lo provee).
pub fn compute_content_etag(object_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(object_bytes);
    hex::encode(hasher.finalize())[..32].to_string()
}

/// Fase de carga: crea (o reutiliza) el trabajo de forja del objeto.
///
/// # Errors:
/// Propaga fallos de blob, Ledger y OCR; un colapso del OCR deja el
/// trabajo sellado como FAILED para la repetición del operador.
pub async fn submit_upload(
    kernel: &ForgeKernel,
    object_key: &str,
) -> anyhow::Result<AliasJob> {
    let job_repository = kernel.job_repository();

    let object_bytes = kernel.blob_store.get_object(UPLOADS_BUCKET, object_key).await?;
    let content_etag = compute_content_etag(&object_bytes);
    let request_id = compute_request_id(UPLOADS_BUCKET, object_key, &content_etag);

    // Idempotencia de carga: la misma tupla (bucket, key, etag) reutiliza
    // el trabajo residente.
    if let Some(resident_job) = job_repository.find_job_by_request(&request_id).await? {
        info!(
            "♻️  [FORGE_SUBMIT]: Upload already registered as job [{}] (status {}).",
            resident_job.job_id, resident_job.status
        );
        return Ok(resident_job);
    }

    let user_id = extract_user_id(object_key);
    let created_at = Utc::now().to_rfc3339();
    let file_size = object_bytes.len() as u64;

    let (job_id, status) = if needs_ocr(object_key) {
        let Some(ocr_gateway) = kernel.ocr_gateway.as_ref() else {
            anyhow::bail!("OCR_GATEWAY_URL required for scanned format [{object_key}]");
        };

        match ocr_gateway.start_analysis(UPLOADS_BUCKET, object_key).await {
            Ok(analysis_start) => {
                info!("📄 [FORGE_SUBMIT]: OCR analysis [{}] started.", analysis_start.job_id);
                (analysis_start.job_id, AliasJobStatus::Running)
            }
            Err(ocr_fault) => {
                warn!("❌ [FORGE_SUBMIT]: OCR ignition collapsed: {}", ocr_fault);
                // El Ledger conserva el colapso para la repetición del operador.
                let failed_job = AliasJob {
                    job_id: request_id.clone(),
                    request_id: request_id.clone(),
                    user_id,
                    bucket: UPLOADS_BUCKET.into(),
                    object_key: object_key.into(),
                    etag: content_etag,
                    file_size,
                    status: AliasJobStatus::Failed,
                    notification_id: None,
                    last_polled_at: Some(created_at.clone()),
                    raw_text_key: None,
                    error_message: Some(ocr_fault.to_string()),
                    created_at,
                };
                job_repository
                    .create_job(&failed_job, ForgeKernel::epoch_seconds_now())
                    .await?;
                anyhow::bail!("OCR ignition failed for [{object_key}]: {ocr_fault}");
            }
        }
    } else {
        // Formatos planos: listos para ingesta sin OCR.
        (request_id.clone(), AliasJobStatus::Succeeded)
    };

    let forge_job = AliasJob {
        job_id,
        request_id,
        user_id,
        bucket: UPLOADS_BUCKET.into(),
        object_key: object_key.into(),
        etag: content_etag,
        file_size,
        status,
        notification_id: None,
        last_polled_at: Some(created_at.clone()),
        raw_text_key: None,
        error_message: None,
        created_at,
    };

    job_repository.create_job(&forge_job, ForgeKernel::epoch_seconds_now()).await?;

    info!(
        "✓ [FORGE_SUBMIT]: Job [{}] registered for [{}] ({} bytes, status {}).",
        forge_job.job_id, object_key, file_size, forge_job.status
    );
    Ok(forge_job)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_anchor_is_stable_and_16_hex() {
        let first = compute_request_id("uploads", "user-1/manual.pdf", "etag-a");
        let second = compute_request_id("uploads", "user-1/manual.pdf", "etag-a");
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|symbol| symbol.is_ascii_hexdigit()));
    }

    #[test]
    fn request_anchor_separates_distinct_uploads() {
        let original = compute_request_id("uploads", "user-1/manual.pdf", "etag-a");
        let re_edited = compute_request_id("uploads", "user-1/manual.pdf", "etag-b");
        let other_key = compute_request_id("uploads", "user-1/manual2.pdf", "etag-a");
        assert_ne!(original, re_edited);
        assert_ne!(original, other_key);
    }
}
