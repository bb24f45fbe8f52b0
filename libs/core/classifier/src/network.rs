// [libs/core/classifier/src/network.rs]
/*!
 * =================================================================
 * APARATO: DENSE FORWARD ENGINE (V4.2 - ARGMAX SEALED)
 * CLASIFICACIÓN: CORE INFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: PASE HACIA ADELANTE Y EXTRACCIÓN DE VEREDICTO
 *
 * # Mathematical Proof (Softmax Stability):
 * La capa softmax resta el máximo del vector de logits antes de
 * exponenciar: exp(z_i − max(z)) ∈ (0, 1], por lo que la suma del
 * denominador nunca desborda y la distribución resultante suma 1
 * dentro de la precisión de f64.
 * =================================================================
 */

use crate::weights::{Activation, ClassifierArtifact, DenseLayerSpec};
use crate::{ClassifierFault, LetterClassifier};
use tracing::debug_span;

/// Veredicto de inferencia sobre un vector de rasgos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterInference {
    /// Índice argmax del vector de probabilidades.
    pub class_index: usize,
    /// Probabilidad en el índice ganador.
    pub confidence: f64,
}

/// Clasificador denso de puntos clave con etiquetas residentes.
pub struct KeypointClassifier {
    artifact: ClassifierArtifact,
    labels: Vec<String>,
}

impl KeypointClassifier {
    /// Ensambla el clasificador desde un artefacto validado y su registro
    /// de etiquetas.
    pub fn new(artifact: ClassifierArtifact, labels: Vec<String>) -> Result<Self, ClassifierFault> {
        artifact.validate_shape()?;
        Ok(Self { artifact, labels })
    }

    pub fn input_features(&self) -> usize {
        self.artifact.input_features
    }

    pub fn output_classes(&self) -> usize {
        self.artifact.output_classes()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Ejecuta el pase hacia adelante completo y devuelve la distribución.
    pub fn forward(&self, feature_vector: &[f64]) -> Result<Vec<f64>, ClassifierFault> {
        if feature_vector.len() != self.artifact.input_features {
            return Err(ClassifierFault::InputDimensionMismatch {
                expected: self.artifact.input_features,
                actual: feature_vector.len(),
            });
        }

        let mut activations: Vec<f64> = feature_vector.to_vec();
        for layer in &self.artifact.layers {
            activations = apply_dense_layer(layer, &activations);
        }

        Ok(activations)
    }
}

impl LetterClassifier for KeypointClassifier {
    fn infer(&self, feature_vector: &[f64]) -> Result<LetterInference, ClassifierFault> {
        let _inference_span = debug_span!(
            "model_inference",
            input_features = feature_vector.len(),
            output_classes = self.output_classes()
        )
        .entered();

        let probability_vector = self.forward(feature_vector)?;

        // Argmax con su probabilidad asociada.
        let (winning_index, winning_probability) = probability_vector
            .iter()
            .enumerate()
            .fold((0_usize, f64::MIN), |(best_index, best_value), (index, value)| {
                if *value > best_value {
                    (index, *value)
                } else {
                    (best_index, best_value)
                }
            });

        Ok(LetterInference {
            class_index: winning_index,
            confidence: winning_probability,
        })
    }

    fn label_for(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(|label| label.as_str())
    }
}

/// Aplica una capa densa: out_i = act(Σ_j w[i][j]·x[j] + b[i]).
fn apply_dense_layer(layer: &DenseLayerSpec, inputs: &[f64]) -> Vec<f64> {
    let mut pre_activations: Vec<f64> = layer
        .weights
        .iter()
        .zip(layer.biases.iter())
        .map(|(neuron_weights, bias)| {
            neuron_weights
                .iter()
                .zip(inputs.iter())
                .map(|(weight, input)| weight * input)
                .sum::<f64>()
                + bias
        })
        .collect();

    match layer.activation {
        Activation::Relu => {
            for value in pre_activations.iter_mut() {
                if *value < 0.0 {
                    *value = 0.0;
                }
            }
            pre_activations
        }
        Activation::Softmax => stable_softmax(&pre_activations),
        Activation::Linear => pre_activations,
    }
}

/// Softmax numéricamente estable (resta del máximo).
fn stable_softmax(logits: &[f64]) -> Vec<f64> {
    let max_logit = logits.iter().fold(f64::MIN, |a, b| a.max(*b));
    let exponentials: Vec<f64> = logits.iter().map(|logit| (logit - max_logit).exp()).collect();
    let normalizer: f64 = exponentials.iter().sum();
    exponentials.into_iter().map(|value| value / normalizer).collect()
}
