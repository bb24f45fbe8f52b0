// [libs/infra/db/src/repositories/connection.rs]
/*!
 * =================================================================
 * APARATO: CONNECTION REGISTRY REPOSITORY (V3.0 - LAST WRITER WINS)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: MAPEO CONEXIÓN ↔ SESIÓN CON TTL DE 24 HORAS
 *
 * # Logic:
 * El registro es una conveniencia para la entrega saliente, nunca la
 * fuente de verdad: las filas son independientes por connection_id y
 * la semántica last-writer-wins es suficiente. Un fallo del registro
 * se reporta y el ingreso continúa.
 * =================================================================
 */

use crate::client::GlossaDbClient;
use crate::errors::DbError;
use libsql::params;
use tracing::{debug, info};

/// TTL nominal de una fila de conexión (24 horas).
pub const CONNECTION_TTL_SECONDS: f64 = 86_400.0;

const REGISTER_PENDING: &str = r#"
    INSERT INTO connections (connection_id, session_id, connected_at, expires_at)
    VALUES (?1, 'pending', ?2, ?3)
    ON CONFLICT(connection_id) DO UPDATE SET
        session_id = 'pending',
        connected_at = excluded.connected_at,
        expires_at = excluded.expires_at
"#;

const REMOVE_CONNECTION: &str = r#"
    DELETE FROM connections WHERE connection_id = ?1
"#;

const BIND_SESSION: &str = r#"
    UPDATE connections
    SET session_id = ?2,
        last_activity = ?3
    WHERE connection_id = ?1
"#;

const FIND_BY_SESSION: &str = r#"
    SELECT connection_id FROM connections
    WHERE session_id = ?1
    ORDER BY last_activity DESC
    LIMIT 1
"#;

/// Repositorio del registro de conexiones del gateway.
pub struct ConnectionRepository {
    database_client: GlossaDbClient,
}

impl ConnectionRepository {
    pub fn new(database_client: GlossaDbClient) -> Self {
        Self { database_client }
    }

    /// Registra una conexión recién abierta con sesión pendiente.
    pub async fn register_pending(
        &self,
        connection_id: &str,
        connected_at_iso: &str,
        now_epoch_seconds: f64,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                REGISTER_PENDING,
                params![connection_id, connected_at_iso, now_epoch_seconds + CONNECTION_TTL_SECONDS],
            )
            .await?;

        info!("🔗 [REGISTRY]: Connection [{}] registered (session pending).", connection_id);
        Ok(())
    }

    /// Remueve una conexión cerrada por el gateway.
    pub async fn remove(&self, connection_id: &str) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection.execute(REMOVE_CONNECTION, params![connection_id]).await?;
        info!("🔗 [REGISTRY]: Connection [{}] removed.", connection_id);
        Ok(())
    }

    /// Enlaza la sesión declarada y sella la última actividad.
    pub async fn bind_session_activity(
        &self,
        connection_id: &str,
        session_id: &str,
        last_activity_iso: &str,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        let updated_rows = connection
            .execute(BIND_SESSION, params![connection_id, session_id, last_activity_iso])
            .await?;

        if updated_rows == 0 {
            return Err(DbError::ConnectionNotFound);
        }

        debug!("🔗 [REGISTRY]: {} ↔ {} bound.", connection_id, session_id);
        Ok(())
    }

    /// Conexión vigente de una sesión (para el worker de entrega).
    pub async fn find_connection_for_session(
        &self,
        session_id: &str,
    ) -> Result<Option<String>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut result_rows = connection.query(FIND_BY_SESSION, params![session_id]).await?;

        match result_rows.next().await? {
            Some(result_row) => Ok(Some(result_row.get(0)?)),
            None => Ok(None),
        }
    }
}
