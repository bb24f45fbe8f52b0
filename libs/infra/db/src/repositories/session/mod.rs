// [libs/infra/db/src/repositories/session/mod.rs]
/*!
 * =================================================================
 * APARATO: SESSION REPOSITORY (V5.1 - LEASE GUARDED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ESTADO DURABLE DE VENTANA, BUFFER Y ARRENDAMIENTO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONTRACT PARITY: Satisface los bindings 'SessionStore' del motor
 *    de compromiso con semántica idéntica al almacén en RAM de las
 *    suites de certificación.
 * 2. LEASE UNIFICATION: Ventana y buffer comparten un arrendamiento
 *    por sesión (renovado en push y append); el Reaper purga por
 *    expiración con una única fuente de verdad.
 * 3. DEADLINE DISCIPLINE: Toda operación del camino online corre bajo
 *    el plazo explícito de 5 s y degrada a fallo reintentable.
 * =================================================================
 */

pub mod queries;

use crate::client::GlossaDbClient;
use crate::errors::DbError;
use crate::{with_store_deadline, with_write_retry};
use async_trait::async_trait;
use glossa_domain_commit::{SessionStore, SessionStoreFault};
use glossa_domain_models::{LetterObservation, WordBuffer};
use libsql::params;
use self::queries as sql_registry;
use tracing::{debug, info};

/// Repositorio de autoridad única para el estado durable de sesión.
pub struct SessionRepository {
    database_client: GlossaDbClient,
    /// Arrendamiento de sesión en segundos (renovado en cada escritura).
    session_ttl_seconds: f64,
}

impl SessionRepository {
    pub fn new(database_client: GlossaDbClient, session_ttl_seconds: u64) -> Self {
        Self { database_client, session_ttl_seconds: session_ttl_seconds as f64 }
    }

    async fn push_observation(
        &self,
        session_id: &str,
        observation: &LetterObservation,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;

        connection
            .execute(
                sql_registry::WINDOW_PUSH,
                params![
                    session_id,
                    observation.char.to_string(),
                    observation.confidence,
                    observation.timestamp
                ],
            )
            .await?;

        // El arrendamiento se renueva con cada observación entrante.
        connection
            .execute(
                sql_registry::LEASE_RENEW,
                params![session_id, observation.timestamp + self.session_ttl_seconds],
            )
            .await?;

        debug!(
            "📥 [SESSION_STORE]: '{}' (conf {:.2}) pushed to [{}].",
            observation.char, observation.confidence, session_id
        );
        Ok(())
    }

    async fn prune_window(&self, session_id: &str, cutoff_ts: f64) -> Result<u64, DbError> {
        let connection = self.database_client.get_connection()?;
        let pruned_count = connection
            .execute(sql_registry::WINDOW_PRUNE, params![session_id, cutoff_ts])
            .await?;

        if pruned_count > 0 {
            debug!("✂️  [SESSION_STORE]: Pruned {} stale entries from [{}].", pruned_count, session_id);
        }
        Ok(pruned_count)
    }

    async fn fetch_window(&self, session_id: &str) -> Result<Vec<LetterObservation>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut window_rows = connection
            .query(sql_registry::WINDOW_GET, params![session_id])
            .await?;

        let mut observations = Vec::new();
        while let Some(window_row) = window_rows.next().await? {
            let letter_text: String = window_row.get(0)?;
            let letter_symbol = letter_text.chars().next().ok_or_else(|| {
                DbError::MappingError(format!("EMPTY_LETTER_CELL for [{session_id}]"))
            })?;

            observations.push(LetterObservation {
                char: letter_symbol,
                confidence: window_row.get(1)?,
                timestamp: window_row.get(2)?,
            });
        }
        Ok(observations)
    }

    async fn fetch_buffer(&self, session_id: &str) -> Result<Option<WordBuffer>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut buffer_rows = connection
            .query(sql_registry::BUFFER_GET, params![session_id])
            .await?;

        let Some(buffer_row) = buffer_rows.next().await? else {
            return Ok(None);
        };

        let letters_text: String = buffer_row.get(2)?;
        Ok(Some(WordBuffer {
            session_id: buffer_row.get(0)?,
            user_id: buffer_row.get(1)?,
            letters: letters_text.chars().collect(),
            last_commit_time: buffer_row.get::<f64>(3).ok(),
            created_at: buffer_row.get(4)?,
        }))
    }

    async fn ensure_buffer(
        &self,
        session_id: &str,
        user_id: &str,
        now: f64,
    ) -> Result<WordBuffer, DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(sql_registry::BUFFER_ENSURE, params![session_id, user_id, now])
            .await?;

        self.fetch_buffer(session_id).await?.ok_or_else(|| {
            DbError::MappingError(format!("BUFFER_VANISHED_AFTER_ENSURE for [{session_id}]"))
        })
    }

    async fn append_letter(
        &self,
        session_id: &str,
        user_id: &str,
        committed_letter: char,
        now: f64,
    ) -> Result<WordBuffer, DbError> {
        let connection = self.database_client.get_connection()?;

        connection
            .execute(sql_registry::BUFFER_ENSURE, params![session_id, user_id, now])
            .await?;
        connection
            .execute(
                sql_registry::BUFFER_APPEND,
                params![session_id, committed_letter.to_string(), now],
            )
            .await?;
        connection
            .execute(
                sql_registry::LEASE_RENEW,
                params![session_id, now + self.session_ttl_seconds],
            )
            .await?;

        let updated_buffer = self.fetch_buffer(session_id).await?.ok_or_else(|| {
            DbError::MappingError(format!("BUFFER_VANISHED_AFTER_APPEND for [{session_id}]"))
        })?;

        info!(
            "✓ [SESSION_STORE]: Committed '{}' → word '{}' ({}).",
            committed_letter,
            updated_buffer.current_word(),
            session_id
        );
        Ok(updated_buffer)
    }

    async fn census_active_sessions(&self) -> Result<Vec<String>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut census_rows = connection.query(sql_registry::ACTIVE_SESSIONS, ()).await?;

        let mut active_sessions = Vec::new();
        while let Some(census_row) = census_rows.next().await? {
            active_sessions.push(census_row.get(0)?);
        }
        Ok(active_sessions)
    }

    async fn reap_expired_sessions(&self, now: f64) -> Result<u64, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut expired_rows = connection
            .query(sql_registry::LEASE_EXPIRED, params![now])
            .await?;

        let mut expired_sessions: Vec<String> = Vec::new();
        while let Some(expired_row) = expired_rows.next().await? {
            expired_sessions.push(expired_row.get(0)?);
        }

        for expired_session in &expired_sessions {
            connection
                .execute(sql_registry::WINDOW_CLEAR, params![expired_session.as_str()])
                .await?;
            connection
                .execute(sql_registry::BUFFER_CLEAR, params![expired_session.as_str()])
                .await?;
            connection
                .execute(sql_registry::LEASE_DROP, params![expired_session.as_str()])
                .await?;
        }

        if !expired_sessions.is_empty() {
            info!("💀 [SESSION_REAPER]: Purged {} expired session(s).", expired_sessions.len());
        }
        Ok(expired_sessions.len() as u64)
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn window_push(
        &self,
        session_id: &str,
        observation: LetterObservation,
    ) -> Result<(), SessionStoreFault> {
        with_write_retry("window_push", || self.push_observation(session_id, &observation))
            .await
            .map_err(DbError::into_session_fault)
    }

    async fn window_prune(
        &self,
        session_id: &str,
        cutoff_ts: f64,
    ) -> Result<u64, SessionStoreFault> {
        with_store_deadline("window_prune", self.prune_window(session_id, cutoff_ts))
            .await
            .map_err(DbError::into_session_fault)
    }

    async fn window_get(
        &self,
        session_id: &str,
    ) -> Result<Vec<LetterObservation>, SessionStoreFault> {
        with_store_deadline("window_get", self.fetch_window(session_id))
            .await
            .map_err(DbError::into_session_fault)
    }

    async fn window_clear(&self, session_id: &str) -> Result<(), SessionStoreFault> {
        with_write_retry("window_clear", || async {
            let connection = self.database_client.get_connection()?;
            connection
                .execute(sql_registry::WINDOW_CLEAR, params![session_id])
                .await?;
            Ok(())
        })
        .await
        .map_err(DbError::into_session_fault)
    }

    async fn buffer_get(
        &self,
        session_id: &str,
        user_id: &str,
        now: f64,
    ) -> Result<WordBuffer, SessionStoreFault> {
        with_store_deadline("buffer_get", self.ensure_buffer(session_id, user_id, now))
            .await
            .map_err(DbError::into_session_fault)
    }

    async fn buffer_peek(
        &self,
        session_id: &str,
    ) -> Result<Option<WordBuffer>, SessionStoreFault> {
        with_store_deadline("buffer_peek", self.fetch_buffer(session_id))
            .await
            .map_err(DbError::into_session_fault)
    }

    async fn buffer_append(
        &self,
        session_id: &str,
        user_id: &str,
        committed_letter: char,
        now: f64,
    ) -> Result<WordBuffer, SessionStoreFault> {
        with_write_retry("buffer_append", || {
            self.append_letter(session_id, user_id, committed_letter, now)
        })
        .await
        .map_err(DbError::into_session_fault)
    }

    async fn buffer_clear(&self, session_id: &str) -> Result<(), SessionStoreFault> {
        with_write_retry("buffer_clear", || async {
            let connection = self.database_client.get_connection()?;
            connection
                .execute(sql_registry::BUFFER_CLEAR, params![session_id])
                .await?;
            Ok(())
        })
        .await
        .map_err(DbError::into_session_fault)
    }

    async fn active_sessions(&self) -> Result<Vec<String>, SessionStoreFault> {
        with_store_deadline("active_sessions", self.census_active_sessions())
            .await
            .map_err(DbError::into_session_fault)
    }

    async fn purge_expired(&self, now: f64) -> Result<u64, SessionStoreFault> {
        with_store_deadline("purge_expired", self.reap_expired_sessions(now))
            .await
            .map_err(DbError::into_session_fault)
    }
}
