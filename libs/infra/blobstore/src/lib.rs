// [libs/infra/blobstore/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BUCKET BLOB STORE (V3.1 - FILESYSTEM STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: OBJETOS POR BUCKET CON CLAVES PREFIJADAS POR USUARIO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BUCKET TOPOLOGY: uploads/ (documentos crudos), raw/ (texto y
 *    términos emitidos), aliases/ (paquetes finales). Las claves
 *    siguen la convención <user>/<archivo>.
 * 2. FATAL ON ABSENT ROOT: La raíz de datos es configuración fatal de
 *    arranque; una clave ausente es un fallo semántico recuperable.
 * =================================================================
 */

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Bucket de documentos subidos por los usuarios.
pub const UPLOADS_BUCKET: &str = "uploads";
/// Bucket de texto crudo, términos y manifiestos de ingesta.
pub const RAW_BUCKET: &str = "raw";
/// Bucket de paquetes de alias sellados.
pub const ALIASES_BUCKET: &str = "aliases";

/// Catálogo semántico de fallos del almacén de objetos.
#[derive(Error, Debug)]
pub enum BlobStoreError {
    /// La raíz del almacén no existe ni pudo materializarse (fatal).
    #[error("[L3_BLOB_FAULT]: STORE_ROOT_UNREACHABLE -> {0}")]
    RootUnreachable(String),

    /// El objeto solicitado no existe en su bucket.
    #[error("[L3_BLOB_FAULT]: OBJECT_NOT_FOUND -> {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    /// Fallo físico de E/S del sustrato.
    #[error("[L3_BLOB_FAULT]: PHYSICAL_IO_FAILURE -> {0}")]
    Io(#[from] std::io::Error),

    /// La clave intenta escapar de su bucket.
    #[error("[L3_BLOB_FAULT]: KEY_TRAVERSAL_REJECTED -> {0}")]
    KeyTraversalRejected(String),
}

/// Almacén de objetos por buckets sobre el sistema de archivos.
#[derive(Clone)]
pub struct BlobStore {
    store_root: PathBuf,
}

impl BlobStore {
    /// Abre (y materializa) la raíz del almacén con sus tres buckets.
    ///
    /// # Errors:
    /// - `RootUnreachable`: fatal de arranque (bucket requerido ausente).
    pub async fn open(store_root: impl Into<PathBuf>) -> Result<Self, BlobStoreError> {
        let store_root = store_root.into();

        for bucket in [UPLOADS_BUCKET, RAW_BUCKET, ALIASES_BUCKET] {
            tokio::fs::create_dir_all(store_root.join(bucket))
                .await
                .map_err(|io_fault| {
                    BlobStoreError::RootUnreachable(format!(
                        "{}/{}: {}",
                        store_root.display(),
                        bucket,
                        io_fault
                    ))
                })?;
        }

        info!("🪣 [BLOB_STORE]: Bucket strata online at [{}].", store_root.display());
        Ok(Self { store_root })
    }

    /// Escribe un objeto en su bucket, materializando prefijos de clave.
    pub async fn put_object(
        &self,
        bucket: &str,
        object_key: &str,
        object_bytes: &[u8],
    ) -> Result<(), BlobStoreError> {
        let object_path = self.resolve_object_path(bucket, object_key)?;

        if let Some(parent_directory) = object_path.parent() {
            tokio::fs::create_dir_all(parent_directory).await?;
        }
        tokio::fs::write(&object_path, object_bytes).await?;

        debug!("🪣 [BLOB_STORE]: Object sealed at {}/{} ({} bytes).", bucket, object_key, object_bytes.len());
        Ok(())
    }

    /// Recupera un objeto completo de su bucket.
    pub async fn get_object(
        &self,
        bucket: &str,
        object_key: &str,
    ) -> Result<Vec<u8>, BlobStoreError> {
        let object_path = self.resolve_object_path(bucket, object_key)?;

        match tokio::fs::read(&object_path).await {
            Ok(object_bytes) => Ok(object_bytes),
            Err(io_fault) if io_fault.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: object_key.to_string(),
                })
            }
            Err(io_fault) => Err(BlobStoreError::Io(io_fault)),
        }
    }

    /// Tamaño del objeto sin leer su contenido.
    pub async fn head_object(
        &self,
        bucket: &str,
        object_key: &str,
    ) -> Result<u64, BlobStoreError> {
        let object_path = self.resolve_object_path(bucket, object_key)?;

        match tokio::fs::metadata(&object_path).await {
            Ok(object_metadata) => Ok(object_metadata.len()),
            Err(io_fault) if io_fault.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: object_key.to_string(),
                })
            }
            Err(io_fault) => Err(BlobStoreError::Io(io_fault)),
        }
    }

    fn resolve_object_path(&self, bucket: &str, object_key: &str) -> Result<PathBuf, BlobStoreError> {
        if object_key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
            return Err(BlobStoreError::KeyTraversalRejected(object_key.to_string()));
        }
        Ok(self.store_root.join(bucket).join(Path::new(object_key)))
    }
}
