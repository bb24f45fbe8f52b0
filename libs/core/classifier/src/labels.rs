// [libs/core/classifier/src/labels.rs]
/*!
 * =================================================================
 * APARATO: LABEL REGISTRY (V2.1 - SIDECAR + FALLBACK)
 * CLASIFICACIÓN: CORE INFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: RESOLUCIÓN DE ETIQUETAS DE CLASE
 *
 * # Logic:
 * El sidecar CSV (una etiqueta por fila, primera columna) es la
 * fuente primaria; su ausencia activa el fallback embebido de 37
 * símbolos idéntico al de producción. El prefijo legado "ASL " de
 * modelos antiguos se recorta en la carga.
 * =================================================================
 */

use crate::ClassifierFault;
use std::path::Path;
use tracing::{info, warn};

/// Fallback embebido: dígitos, letras y pausa, en orden de índice.
pub const FALLBACK_LABELS: [&str; 37] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J",
    "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T",
    "U", "V", "W", "X", "Y", "Z", "_",
];

/// Prefijo legado de modelos entrenados con etiquetas decoradas.
const LEGACY_LABEL_PREFIX: &str = "ASL ";

/// Carga el registro de etiquetas desde el sidecar CSV, con fallback
/// embebido cuando el sidecar no existe.
///
/// # Errors:
/// - `LabelSidecarCorrupted`: el sidecar existe pero no decodifica.
pub fn load_labels(sidecar_path: &Path) -> Result<Vec<String>, ClassifierFault> {
    if !sidecar_path.exists() {
        warn!(
            "⚠️  [LABEL_REGISTRY]: Sidecar absent at [{}]. Engaging embedded fallback (37 symbols).",
            sidecar_path.display()
        );
        return Ok(FALLBACK_LABELS.iter().map(|label| label.to_string()).collect());
    }

    let mut sidecar_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(sidecar_path)
        .map_err(|csv_fault| ClassifierFault::LabelSidecarCorrupted(csv_fault.to_string()))?;

    let mut labels: Vec<String> = Vec::new();
    for record_result in sidecar_reader.records() {
        let record = record_result
            .map_err(|csv_fault| ClassifierFault::LabelSidecarCorrupted(csv_fault.to_string()))?;

        let raw_label = record.get(0).unwrap_or("").trim();
        // Byte Order Mark de exportaciones utf-8-sig.
        let clean_label = raw_label.trim_start_matches('\u{feff}');
        let clean_label = clean_label.strip_prefix(LEGACY_LABEL_PREFIX).unwrap_or(clean_label);

        if !clean_label.is_empty() {
            labels.push(clean_label.to_string());
        }
    }

    if labels.is_empty() {
        return Err(ClassifierFault::LabelSidecarCorrupted(
            "SIDECAR_DECODED_TO_ZERO_LABELS".into(),
        ));
    }

    info!("🏷️  [LABEL_REGISTRY]: {} labels loaded from sidecar.", labels.len());
    Ok(labels)
}
