//! ONNX Runtime predictor for classifiers exported from a training pipeline.
//!
//! The model takes a single `[1, D]` f32 input (the encoded symptom vector).
//! Output 0 is an int64 class index into the bundle-declared label list;
//! output 1, when the model exports probabilities, is an f32 `[1, labels]`
//! tensor. Export scikit-learn models with `zipmap=False` to get this layout.

use std::path::Path;
use std::sync::Mutex;

use healix_core::FeatureVector;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::classifier::{Distribution, Predictor, ProbabilisticPredictor};

/// Classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex
/// and concurrent diagnose calls take turns on it.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    labels: Vec<String>,
    dim: Option<usize>,
    probabilities: bool,
}

impl OnnxClassifier {
    /// Load a model file. `labels` maps output class indices to disease labels.
    pub fn load(path: &Path, labels: Vec<String>, probabilities: bool) -> anyhow::Result<Self> {
        anyhow::ensure!(path.exists(), "model file not found: {path:?}");
        anyhow::ensure!(!labels.is_empty(), "no labels declared for {path:?}");

        let session = Session::builder()?.commit_from_file(path)?;

        anyhow::ensure!(
            !probabilities || session.outputs().len() >= 2,
            "{path:?} declares probabilities but has {} output(s)",
            session.outputs().len()
        );

        let dim = session.inputs().first().and_then(|i| infer_dim(i.dtype()));

        info!(
            model = %path.display(),
            labels = labels.len(),
            dim = ?dim,
            probabilities,
            "loaded ONNX classifier"
        );
        Ok(Self {
            session: Mutex::new(session),
            labels,
            dim,
            probabilities,
        })
    }

    pub fn has_probabilities(&self) -> bool {
        self.probabilities
    }

    fn run(&self, vector: &FeatureVector) -> anyhow::Result<(String, Option<Vec<f64>>)> {
        let shape = [1i64, vector.len() as i64];
        let input = Tensor::from_array((shape, vector.to_f32().into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("ONNX session mutex poisoned"))?;
        let outputs = session.run(ort::inputs![input])?;

        let (_, classes) = outputs[0].try_extract_tensor::<i64>()?;
        let class = *classes
            .first()
            .ok_or_else(|| anyhow::anyhow!("empty label output"))?;
        let label = usize::try_from(class)
            .ok()
            .and_then(|i| self.labels.get(i))
            .ok_or_else(|| {
                anyhow::anyhow!("class index {class} outside {} labels", self.labels.len())
            })?
            .clone();

        let probabilities = if self.probabilities {
            let (_, probs) = outputs[1].try_extract_tensor::<f32>()?;
            anyhow::ensure!(
                probs.len() == self.labels.len(),
                "probability output has {} values, expected {}",
                probs.len(),
                self.labels.len()
            );
            Some(probs.iter().map(|&p| f64::from(p)).collect())
        } else {
            None
        };

        Ok((label, probabilities))
    }
}

impl Predictor for OnnxClassifier {
    fn predict(&self, vector: &FeatureVector) -> anyhow::Result<String> {
        self.run(vector).map(|(label, _)| label)
    }

    fn input_dim(&self) -> Option<usize> {
        self.dim
    }
}

impl ProbabilisticPredictor for OnnxClassifier {
    fn predict_with_distribution(
        &self,
        vector: &FeatureVector,
    ) -> anyhow::Result<(String, Distribution)> {
        let (label, probabilities) = self.run(vector)?;
        let probabilities = probabilities
            .ok_or_else(|| anyhow::anyhow!("model was loaded without probability output"))?;
        Ok((label, Distribution::from_parts(&self.labels, &probabilities)))
    }
}

/// Try to infer the feature width from the ONNX model input type.
fn infer_dim(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the feature width; dynamic dims are negative.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn load_missing_model_fails() {
        let err = OnnxClassifier::load(
            &PathBuf::from("/nonexistent/forest.onnx"),
            vec!["Flu".into()],
            true,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("model file not found"));
    }

    #[test]
    fn load_without_labels_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = OnnxClassifier::load(file.path(), vec![], false).err().unwrap();
        assert!(err.to_string().contains("no labels declared"));
    }
}
