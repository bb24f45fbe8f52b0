// INICIO DEL ARCHIVO [libs/infra/db/src/client.rs]
/*!
 * =================================================================
 * APARATO: DATABASE CONNECTION CLIENT (V4.1 - MEMORY ANCHORED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES TÁCTICOS Y PERSISTENCIA ACID
 *
 * # Mathematical Proof (In-Memory Consistency):
 * Para garantizar que el esquema sea visible entre hilos en modo RAM,
 * el cliente detecta URLs de memoria y aplica el ancla de persistencia
 * ANTES del bootstrap, asegurando que las tablas residan en un
 * segmento de memoria compartido.
 * =================================================================
 */

use crate::errors::DbError;
use crate::schema::apply_full_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct GlossaDbClient {
    internal_database_driver: Arc<Database>,
    /// Mantiene la base de datos viva en memoria evitando que SQLite la purgue.
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl GlossaDbClient {
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, DbError> {
        if database_connection_url.is_empty() {
            return Err(DbError::ConfigurationError("DATABASE_URL_UNDEFINED".into()));
        }

        info!("🔌 [DATABASE]: Initiating tactical link synchronization to [{}]", database_connection_url);

        let is_remote = database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://");

        let is_memory = database_connection_url.contains(":memory:")
            || database_connection_url.contains("mode=memory");

        let database_driver = if is_remote {
            let token = database_access_token.ok_or_else(|| {
                DbError::ConfigurationError("SECURITY_FAULT: Remote access denied (Token missing)".into())
            })?;
            Builder::new_remote(database_connection_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_connection_url).build().await
        }
        .map_err(|driver_fault| {
            DbError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {driver_fault}"))
        })?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        // En modo memoria, el ancla se abre ANTES que cualquier otra operación.
        if is_memory {
            let anchor_connection = shared_driver
                .connect()
                .map_err(|anchor_fault| DbError::ConnectionError(format!("ANCHOR_FAULT: {anchor_fault}")))?;

            apply_full_schema(&anchor_connection)
                .await
                .map_err(|schema_fault| DbError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {schema_fault}")))?;

            anchor = Some(Arc::new(anchor_connection));
            info!("⚓ [DATABASE]: Memory strata solidified and anchored.");
        } else {
            // En modo Disco/Remoto, una conexión temporal realiza el bootstrap.
            let bootstrap_connection = shared_driver
                .connect()
                .map_err(|link_fault| DbError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {link_fault}")))?;
            apply_full_schema(&bootstrap_connection)
                .await
                .map_err(|schema_fault| DbError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {schema_fault}")))?;
        }

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, DbError> {
        self.internal_database_driver.connect().map_err(|allocation_fault| {
            error!("⚠️ [POOL_FAULT]: Connection allocation failed: {}", allocation_fault);
            DbError::ConnectionError(allocation_fault.to_string())
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/client.rs]
