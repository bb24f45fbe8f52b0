// [tests/mirror/libs/infra/db/alias_job_idempotency.test.rs]
/*!
 * =================================================================
 * APARATO: CERTIFICADOR DEL LEDGER DE FORJA (V2.0 - ZENITH)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: TRANSICIONES DE ESTADO Y ANCLAS DE IDEMPOTENCIA
 * =================================================================
 */

use glossa_domain_models::{AliasJob, AliasJobStatus};
use glossa_infra_db::repositories::AliasJobRepository;
use glossa_infra_db::{DbError, GlossaDbClient};

fn plain_text_job(job_id: &str, request_id: &str) -> AliasJob {
    AliasJob {
        job_id: job_id.into(),
        request_id: request_id.into(),
        user_id: "user-1".into(),
        bucket: "uploads".into(),
        object_key: "user-1/glossary.txt".into(),
        etag: "etag-0001".into(),
        file_size: 2048,
        status: AliasJobStatus::Succeeded,
        notification_id: None,
        last_polled_at: None,
        raw_text_key: None,
        error_message: None,
        created_at: "2026-02-11T09:00:00Z".into(),
    }
}

async fn ledger(memory_anchor: &str) -> AliasJobRepository {
    let database_client = GlossaDbClient::connect(memory_anchor, None)
        .await
        .expect("CRITICAL_FAULT: Failed to anchor in-memory tactical ledger.");
    AliasJobRepository::new(database_client)
}

#[tokio::test]
async fn job_rows_round_trip_with_their_request_anchor() {
    let job_repository = ledger("file:mem_ledger_roundtrip?mode=memory&cache=shared").await;

    job_repository
        .create_job(&plain_text_job("job-rt", "req-rt"), 5000.0)
        .await
        .expect("LEDGER_FAULT");

    let by_id = job_repository.find_job("job-rt").await.expect("LEDGER_FAULT").expect("JOB_VANISHED");
    assert_eq!(by_id.status, AliasJobStatus::Succeeded);
    assert_eq!(by_id.file_size, 2048);
    assert!(by_id.notification_id.is_none());

    let by_request = job_repository
        .find_job_by_request("req-rt")
        .await
        .expect("LEDGER_FAULT")
        .expect("ANCHOR_FAULT: request lookup failed");
    assert_eq!(by_request.job_id, "job-rt");

    assert!(job_repository.find_job("job-ghost").await.expect("LEDGER_FAULT").is_none());
}

#[tokio::test]
async fn ingestion_transition_seals_text_key_and_notification() {
    println!("\n📒 [INICIO]: Auditoría de transiciones del Ledger...");
    let job_repository = ledger("file:mem_ledger_transitions?mode=memory&cache=shared").await;

    job_repository
        .create_job(&plain_text_job("job-tr", "req-tr"), 5000.0)
        .await
        .expect("LEDGER_FAULT");

    job_repository
        .mark_ingested("job-tr", "user-1/glossary.txt", "notice-001", "2026-02-11T09:01:00Z")
        .await
        .expect("TRANSITION_FAULT");

    let ingested = job_repository.find_job("job-tr").await.expect("LEDGER_FAULT").expect("JOB_VANISHED");
    assert_eq!(ingested.status, AliasJobStatus::Ingested);
    assert_eq!(ingested.raw_text_key.as_deref(), Some("user-1/glossary.txt"));
    assert_eq!(ingested.notification_id.as_deref(), Some("notice-001"));

    job_repository
        .mark_completed("job-tr", "2026-02-11T09:02:00Z")
        .await
        .expect("TRANSITION_FAULT");
    let completed = job_repository.find_job("job-tr").await.expect("LEDGER_FAULT").expect("JOB_VANISHED");
    assert_eq!(completed.status, AliasJobStatus::Completed);
    println!("   ✅ RUNNING/SUCCEEDED → INGESTED → COMPLETED certificado.");
}

#[tokio::test]
async fn failure_transition_preserves_the_operator_diagnostic() {
    let job_repository = ledger("file:mem_ledger_failure?mode=memory&cache=shared").await;

    job_repository
        .create_job(&plain_text_job("job-fl", "req-fl"), 5000.0)
        .await
        .expect("LEDGER_FAULT");

    job_repository
        .mark_failed("job-fl", "OCR_STATUS_FAILED", "notice-002", "2026-02-11T09:03:00Z")
        .await
        .expect("TRANSITION_FAULT");

    let failed = job_repository.find_job("job-fl").await.expect("LEDGER_FAULT").expect("JOB_VANISHED");
    assert_eq!(failed.status, AliasJobStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("OCR_STATUS_FAILED"));
    assert_eq!(failed.notification_id.as_deref(), Some("notice-002"));
}

#[tokio::test]
async fn transitions_on_ghost_jobs_are_semantic_faults() {
    let job_repository = ledger("file:mem_ledger_ghost?mode=memory&cache=shared").await;

    let transition_fault = job_repository
        .mark_completed("job-ghost", "2026-02-11T09:04:00Z")
        .await
        .expect_err("GHOST_FAULT: transition on absent row accepted");
    assert!(matches!(transition_fault, DbError::JobNotFound));
}
