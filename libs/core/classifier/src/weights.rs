// [libs/core/classifier/src/weights.rs]
/*!
 * =================================================================
 * APARATO: WEIGHT ARTIFACT LOADER (V2.3 - SHAPE GUARDED)
 * CLASIFICACIÓN: CORE INFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: CARGA Y VALIDACIÓN DEL ARTEFACTO DE PESOS
 *
 * # Mathematical Proof (Chained Dimensionality):
 * Para capas W_k de forma (out_k × in_k), la validación exige
 * in_0 = input_features y in_{k+1} = out_k. Todo pase hacia adelante
 * sobre un artefacto validado es entonces total: ningún índice puede
 * escapar de los límites de sus tensores.
 * =================================================================
 */

use crate::ClassifierFault;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Función de activación de una capa densa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Softmax,
    /// Identidad (capas lineales intermedias).
    Linear,
}

/// Especificación serializada de una capa densa: fila por neurona de salida.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayerSpec {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayerSpec {
    pub fn output_neurons(&self) -> usize {
        self.weights.len()
    }

    pub fn input_features(&self) -> usize {
        self.weights.first().map(|row| row.len()).unwrap_or(0)
    }
}

/// Artefacto completo del clasificador de puntos clave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    /// Dimensionalidad del vector de entrada (40 rasgos de mano).
    pub input_features: usize,
    pub layers: Vec<DenseLayerSpec>,
}

impl ClassifierArtifact {
    /// Carga el artefacto desde disco.
    ///
    /// # Errors:
    /// - `ArtifactUnreachable`: archivo ausente o ilegible (fatal de arranque).
    /// - `ShapeViolation`: JSON válido con tensores incoherentes.
    pub fn load_from_path(artifact_path: &Path) -> Result<Self, ClassifierFault> {
        let raw_artifact = std::fs::read_to_string(artifact_path).map_err(|io_fault| {
            ClassifierFault::ArtifactUnreachable(format!(
                "{}: {}",
                artifact_path.display(),
                io_fault
            ))
        })?;

        let artifact: ClassifierArtifact = serde_json::from_str(&raw_artifact)
            .map_err(|decode_fault| {
                ClassifierFault::ShapeViolation(format!("ARTIFACT_DECODE: {decode_fault}"))
            })?;

        artifact.validate_shape()?;
        Ok(artifact)
    }

    /// Verifica el encadenado dimensional completo del artefacto.
    pub fn validate_shape(&self) -> Result<(), ClassifierFault> {
        if self.layers.is_empty() {
            return Err(ClassifierFault::ShapeViolation("EMPTY_LAYER_STACK".into()));
        }

        let mut expected_inputs = self.input_features;

        for (layer_index, layer) in self.layers.iter().enumerate() {
            if layer.weights.is_empty() {
                return Err(ClassifierFault::ShapeViolation(format!(
                    "LAYER_{layer_index}_HAS_NO_NEURONS"
                )));
            }

            if layer.weights.iter().any(|row| row.len() != expected_inputs) {
                return Err(ClassifierFault::ShapeViolation(format!(
                    "LAYER_{layer_index}_ROW_WIDTH_MISMATCH: expected {expected_inputs}"
                )));
            }

            if layer.biases.len() != layer.output_neurons() {
                return Err(ClassifierFault::ShapeViolation(format!(
                    "LAYER_{layer_index}_BIAS_MISMATCH: {} biases for {} neurons",
                    layer.biases.len(),
                    layer.output_neurons()
                )));
            }

            expected_inputs = layer.output_neurons();
        }

        Ok(())
    }

    /// Cardinalidad del vector de probabilidades emitido.
    pub fn output_classes(&self) -> usize {
        self.layers
            .last()
            .map(|layer| layer.output_neurons())
            .unwrap_or(0)
    }
}
