// [apps/alias-forge/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ALIAS FORGE LIBRARY ROOT (V4.0)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LAS FASES DE LA FORJA
 * =================================================================
 */

pub mod ingest;
pub mod kernel;
pub mod submit;
pub mod synthesis;

pub use ingest::ingest_document;
pub use kernel::ForgeKernel;
pub use submit::submit_upload;
pub use synthesis::synthesize_aliases;

use std::path::Path;

/// Extensiones que requieren OCR externo (formatos escaneados).
const SCANNED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tif", "tiff"];

/// Determina si la clave de objeto apunta a un formato escaneado.
pub fn needs_ocr(object_key: &str) -> bool {
    Path::new(object_key)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| SCANNED_EXTENSIONS.contains(&extension.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// user_id desde la convención de claves <user>/<archivo>.
pub fn extract_user_id(object_key: &str) -> String {
    let mut key_segments = object_key.split('/').filter(|segment| !segment.is_empty());
    match (key_segments.next(), key_segments.next()) {
        (Some(user_segment), Some(_)) => user_segment.to_string(),
        _ => "unknown".to_string(),
    }
}

/// Nombre base (sin extensión) del archivo de la clave.
pub fn object_base_name(object_key: &str) -> String {
    Path::new(object_key)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanned_format_detection_is_extension_driven() {
        assert!(needs_ocr("user-1/manual.pdf"));
        assert!(needs_ocr("user-1/scan.TIFF"));
        assert!(!needs_ocr("user-1/notes.txt"));
        assert!(!needs_ocr("user-1/terms.csv"));
        assert!(!needs_ocr("user-1/README"));
    }

    #[test]
    fn user_extraction_follows_the_key_convention() {
        assert_eq!(extract_user_id("user-7/manual.pdf"), "user-7");
        assert_eq!(extract_user_id("/user-7/manual.pdf"), "user-7");
        assert_eq!(extract_user_id("orphan.pdf"), "unknown");
    }

    #[test]
    fn base_name_strips_directories_and_extension() {
        assert_eq!(object_base_name("user-7/aws_manual.pdf"), "aws_manual");
        assert_eq!(object_base_name("notes.txt"), "notes");
    }
}
