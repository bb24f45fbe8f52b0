// [libs/infra/db/src/repositories/jobs/mod.rs]
/*!
 * =================================================================
 * APARATO: ALIAS JOB REPOSITORY (V4.0 - FORGE LEDGER GUARD)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA DE TRABAJOS DE FORJA DE ALIAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. IDEMPOTENT MATERIALIZATION: request_id (SHA-256 de la carga) y
 *    notification_id (deduplicación de re-entregas) garantizan una
 *    materialización a lo sumo por notificación.
 * 2. TTL DISCIPLINE: Las filas expiran a los 30 días; el Ledger no
 *    acumula historia infinita.
 * =================================================================
 */

pub mod queries;

use crate::client::GlossaDbClient;
use crate::errors::DbError;
use glossa_domain_models::{AliasJob, AliasJobStatus};
use libsql::params;
use self::queries as sql_registry;
use tracing::info;

/// TTL nominal de una fila del Ledger (30 días).
pub const JOB_TTL_SECONDS: f64 = 30.0 * 24.0 * 60.0 * 60.0;

/// Repositorio de autoridad única del Ledger de forja.
pub struct AliasJobRepository {
    database_client: GlossaDbClient,
}

impl AliasJobRepository {
    pub fn new(database_client: GlossaDbClient) -> Self {
        Self { database_client }
    }

    /// Inicializa una fila del Ledger con su estado de arranque.
    pub async fn create_job(
        &self,
        job: &AliasJob,
        now_epoch_seconds: f64,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;

        connection
            .execute(
                sql_registry::INITIALIZE_JOB,
                params![
                    job.job_id.as_str(),
                    job.request_id.as_str(),
                    job.user_id.as_str(),
                    job.bucket.as_str(),
                    job.object_key.as_str(),
                    job.etag.as_str(),
                    job.file_size as i64,
                    job.status.as_str(),
                    job.created_at.as_str(),
                    now_epoch_seconds + JOB_TTL_SECONDS
                ],
            )
            .await?;

        info!(
            "📒 [FORGE_LEDGER]: Job [{}] initialized with status {} (request {}).",
            job.job_id, job.status, job.request_id
        );
        Ok(())
    }

    pub async fn find_job(&self, job_id: &str) -> Result<Option<AliasJob>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut job_rows = connection.query(sql_registry::FETCH_JOB, params![job_id]).await?;

        match job_rows.next().await? {
            Some(job_row) => Ok(Some(map_row_to_job(&job_row)?)),
            None => Ok(None),
        }
    }

    /// Trabajo existente para el ancla de idempotencia de carga.
    pub async fn find_job_by_request(
        &self,
        request_id: &str,
    ) -> Result<Option<AliasJob>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut job_rows = connection
            .query(sql_registry::FETCH_JOB_BY_REQUEST, params![request_id])
            .await?;

        match job_rows.next().await? {
            Some(job_row) => Ok(Some(map_row_to_job(&job_row)?)),
            None => Ok(None),
        }
    }

    /// Transición RUNNING/SUCCEEDED → INGESTED, sellando el texto crudo
    /// y la notificación que la produjo (ancla de deduplicación).
    pub async fn mark_ingested(
        &self,
        job_id: &str,
        raw_text_key: &str,
        notification_id: &str,
        polled_at_iso: &str,
    ) -> Result<(), DbError> {
        self.execute_transition(
            sql_registry::MARK_INGESTED,
            params![job_id, raw_text_key, notification_id, polled_at_iso],
            job_id,
            AliasJobStatus::Ingested,
        )
        .await
    }

    /// Transición terminal INGESTED → COMPLETED.
    pub async fn mark_completed(&self, job_id: &str, polled_at_iso: &str) -> Result<(), DbError> {
        self.execute_transition(
            sql_registry::MARK_COMPLETED,
            params![job_id, polled_at_iso],
            job_id,
            AliasJobStatus::Completed,
        )
        .await
    }

    /// Transición terminal de fallo con diagnóstico y notificación.
    pub async fn mark_failed(
        &self,
        job_id: &str,
        error_message: &str,
        notification_id: &str,
        polled_at_iso: &str,
    ) -> Result<(), DbError> {
        self.execute_transition(
            sql_registry::MARK_FAILED,
            params![job_id, error_message, notification_id, polled_at_iso],
            job_id,
            AliasJobStatus::Failed,
        )
        .await
    }

    async fn execute_transition(
        &self,
        transition_sql: &str,
        transition_params: impl libsql::params::IntoParams,
        job_id: &str,
        target_status: AliasJobStatus,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        let affected_rows = connection.execute(transition_sql, transition_params).await?;

        if affected_rows == 0 {
            return Err(DbError::JobNotFound);
        }

        info!("📒 [FORGE_LEDGER]: Job [{}] → {}.", job_id, target_status);
        Ok(())
    }
}

fn map_row_to_job(job_row: &libsql::Row) -> Result<AliasJob, DbError> {
    let status_text: String = job_row.get(7)?;
    let status: AliasJobStatus = status_text
        .parse()
        .map_err(|parse_fault: String| DbError::MappingError(parse_fault))?;

    Ok(AliasJob {
        job_id: job_row.get(0)?,
        request_id: job_row.get(1)?,
        user_id: job_row.get(2)?,
        bucket: job_row.get(3)?,
        object_key: job_row.get(4)?,
        etag: job_row.get(5)?,
        file_size: job_row.get::<i64>(6)? as u64,
        status,
        notification_id: job_row.get::<String>(8).ok(),
        last_polled_at: job_row.get::<String>(9).ok(),
        raw_text_key: job_row.get::<String>(10).ok(),
        error_message: job_row.get::<String>(11).ok(),
        created_at: job_row.get(12)?,
    })
}
