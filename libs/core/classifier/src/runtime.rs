// [libs/core/classifier/src/runtime.rs]
/*!
 * =================================================================
 * APARATO: CLASSIFIER RUNTIME CELL (V3.0 - PHOENIX WARM START)
 * CLASIFICACIÓN: CORE INFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: CICLO DE VIDA GLOBAL INIT / HANDLE / TEARDOWN
 *
 * # Logic:
 * La celda global amortiza el costo de arranque frío de los pesos.
 * El puente de letras nunca lee la celda directamente: el kernel
 * resuelve el Arc en la ignición y lo inyecta como dependencia
 * explícita. La celda ofrece teardown determinista para las suites
 * de certificación.
 * =================================================================
 */

use crate::labels::load_labels;
use crate::network::KeypointClassifier;
use crate::weights::ClassifierArtifact;
use crate::ClassifierFault;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

static CLASSIFIER_CELL: Lazy<RwLock<Option<Arc<KeypointClassifier>>>> =
    Lazy::new(|| RwLock::new(None));

/// Inicializa la celda global cargando artefacto y etiquetas.
/// Idempotente: una celda ya poblada se reutiliza (warm start).
///
/// # Errors:
/// - `ArtifactUnreachable` / `ShapeViolation`: fatales de arranque.
pub fn initialize_global_classifier(
    artifact_path: &Path,
    label_sidecar_path: &Path,
) -> Result<Arc<KeypointClassifier>, ClassifierFault> {
    if let Some(resident_classifier) = global_classifier() {
        info!("♻️  [CLASSIFIER_CELL]: Warm start. Resident weights reused.");
        return Ok(resident_classifier);
    }

    let artifact = ClassifierArtifact::load_from_path(artifact_path)?;
    let labels = load_labels(label_sidecar_path)?;
    let classifier = Arc::new(KeypointClassifier::new(artifact, labels)?);

    info!(
        "🧠 [CLASSIFIER_CELL]: Keypoint classifier online ({} features → {} classes).",
        classifier.input_features(),
        classifier.output_classes()
    );

    let mut cell_guard = CLASSIFIER_CELL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *cell_guard = Some(Arc::clone(&classifier));

    Ok(classifier)
}

/// Handle del clasificador residente, si la celda fue inicializada.
pub fn global_classifier() -> Option<Arc<KeypointClassifier>> {
    CLASSIFIER_CELL
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Vacía la celda global (apagado determinista y suites de prueba).
pub fn teardown_global_classifier() {
    let mut cell_guard = CLASSIFIER_CELL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *cell_guard = None;
}
