// [tests/mirror/apps/alias_forge/forge_ingest.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DE LA FORJA (V2.1 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: SUBMIT IDEMPOTENTE, INGESTA Y DEDUPLICACIÓN
 *
 * # Logic:
 * La suite opera sin gateways externos: un documento plano atraviesa
 * submit → aviso sintético → ingest, y la re-entrega de la misma
 * notificación debe morir en el ancla de deduplicación del Ledger.
 * =================================================================
 */

use glossa_alias_forge::{ingest_document, submit_upload, ForgeKernel};
use glossa_domain_models::{AliasJobStatus, OcrCompletionNotice};
use glossa_infra_blobstore::{RAW_BUCKET, UPLOADS_BUCKET};
use serde_json::Value;

const GLOSSARY_DOCUMENT: &str = "Amazon Kinesis stream\nAmazon Lambda the DynamoDB 2017\nkinesis";

async fn forge_with_staged_upload(memory_anchor: &str) -> (ForgeKernel, tempfile::TempDir) {
    let blob_directory = tempfile::tempdir().expect("TEMP_FAULT");
    let kernel = ForgeKernel::ignite(
        memory_anchor,
        None,
        blob_directory.path().to_str().expect("PATH_FAULT"),
    )
    .await
    .expect("IGNITION_FAULT");

    kernel
        .blob_store
        .put_object(UPLOADS_BUCKET, "user-9/glossary.txt", GLOSSARY_DOCUMENT.as_bytes())
        .await
        .expect("BLOB_FAULT");

    (kernel, blob_directory)
}

#[tokio::test]
async fn plain_text_submit_is_idempotent_per_upload() {
    println!("\n🔥 [INICIO]: Auditoría de submit idempotente...");
    let (kernel, _blob_guard) =
        forge_with_staged_upload("file:mem_forge_submit?mode=memory&cache=shared").await;

    let first_job = submit_upload(&kernel, "user-9/glossary.txt").await.expect("SUBMIT_FAULT");
    assert_eq!(first_job.status, AliasJobStatus::Succeeded);
    assert_eq!(first_job.user_id, "user-9");
    assert_eq!(first_job.job_id, first_job.request_id);

    // La misma carga bit-idéntica reutiliza el trabajo residente.
    let second_job = submit_upload(&kernel, "user-9/glossary.txt").await.expect("SUBMIT_FAULT");
    assert_eq!(second_job.job_id, first_job.job_id, "IDEMPOTENCE_FAULT: duplicate job row");
    println!("   ✅ Una carga, un trabajo ({}).", first_job.job_id);
}

#[tokio::test]
async fn ingest_emits_artifacts_and_dedups_replayed_notices() {
    println!("\n🧹 [INICIO]: Auditoría de ingesta determinista...");
    let (kernel, _blob_guard) =
        forge_with_staged_upload("file:mem_forge_ingest?mode=memory&cache=shared").await;

    let forge_job = submit_upload(&kernel, "user-9/glossary.txt").await.expect("SUBMIT_FAULT");

    let completion_notice = OcrCompletionNotice {
        notification_id: "notice-aaa".into(),
        job_id: forge_job.job_id.clone(),
        status: "SUCCEEDED".into(),
        bucket: UPLOADS_BUCKET.into(),
        object_key: "user-9/glossary.txt".into(),
    };

    // 1. PRIMERA ENTREGA: ingesta completa con artefactos.
    let terms_ready = ingest_document(&kernel, &completion_notice)
        .await
        .expect("INGEST_FAULT")
        .expect("NOTICE_FAULT: first delivery produced nothing");

    assert_eq!(terms_ready.job_id, forge_job.job_id);
    assert_eq!(terms_ready.terms_key, "user-9/glossary_terms.json");

    // El listado de términos es el conjunto ordenado sin ruido.
    let terms_bytes = kernel
        .blob_store
        .get_object(RAW_BUCKET, &terms_ready.terms_key)
        .await
        .expect("BLOB_FAULT");
    let terms_manifest: Value = serde_json::from_slice(&terms_bytes).expect("MANIFEST_FAULT");
    let emitted_terms: Vec<&str> = terms_manifest["terms"]
        .as_array()
        .expect("MANIFEST_FAULT")
        .iter()
        .filter_map(|term| term.as_str())
        .collect();
    assert_eq!(emitted_terms, vec!["amazon", "dynamodb", "kinesis", "lambda", "stream"]);
    assert_eq!(terms_ready.term_count, 5);

    // Texto crudo y manifiesto también aterrizan en el bucket raw.
    kernel
        .blob_store
        .get_object(RAW_BUCKET, "user-9/glossary.txt")
        .await
        .expect("ARTIFACT_FAULT: raw text missing");
    kernel
        .blob_store
        .get_object(RAW_BUCKET, "user-9/glossary_metadata.json")
        .await
        .expect("ARTIFACT_FAULT: metadata manifest missing");

    let ingested_job = kernel
        .job_repository()
        .find_job(&forge_job.job_id)
        .await
        .expect("LEDGER_FAULT")
        .expect("JOB_VANISHED");
    assert_eq!(ingested_job.status, AliasJobStatus::Ingested);

    // 2. RE-ENTREGA: la misma notificación muere en el ancla.
    let replay_outcome = ingest_document(&kernel, &completion_notice).await.expect("INGEST_FAULT");
    assert!(replay_outcome.is_none(), "DEDUP_FAULT: replayed notice re-ingested");

    // 3. NOTIFICACIÓN NUEVA SOBRE TRABAJO YA INGESTADO: también se veta.
    let late_notice = OcrCompletionNotice {
        notification_id: "notice-bbb".into(),
        ..completion_notice.clone()
    };
    let late_outcome = ingest_document(&kernel, &late_notice).await.expect("INGEST_FAULT");
    assert!(late_outcome.is_none(), "STATE_FAULT: ingested job re-processed");
    println!("   ✅ Artefactos emitidos y re-entregas vetadas.");
}

#[tokio::test]
async fn non_succeeded_notices_seal_the_job_as_failed() {
    let (kernel, _blob_guard) =
        forge_with_staged_upload("file:mem_forge_failure?mode=memory&cache=shared").await;

    let forge_job = submit_upload(&kernel, "user-9/glossary.txt").await.expect("SUBMIT_FAULT");

    let failed_notice = OcrCompletionNotice {
        notification_id: "notice-ccc".into(),
        job_id: forge_job.job_id.clone(),
        status: "FAILED".into(),
        bucket: UPLOADS_BUCKET.into(),
        object_key: "user-9/glossary.txt".into(),
    };

    let outcome = ingest_document(&kernel, &failed_notice).await.expect("INGEST_FAULT");
    assert!(outcome.is_none());

    let sealed_job = kernel
        .job_repository()
        .find_job(&forge_job.job_id)
        .await
        .expect("LEDGER_FAULT")
        .expect("JOB_VANISHED");
    assert_eq!(sealed_job.status, AliasJobStatus::Failed);
    assert_eq!(sealed_job.error_message.as_deref(), Some("OCR_STATUS_FAILED"));
}
