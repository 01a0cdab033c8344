//! Inference layer: classifier ensemble over symptom feature vectors,
//! per-classifier confidence, majority vote and remedy assembly.

pub mod bundle;
pub mod centroid;
pub mod classifier;
pub mod engine;
pub mod ensemble;
mod error;
pub mod labels;
pub mod profile;
pub mod scoring;
pub mod vote;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

pub use bundle::ArtifactBundle;
pub use centroid::{CentroidClassifier, Metric};
pub use classifier::{
    Classifier, ClassifierKind, Distribution, Predictor, ProbabilisticPredictor, RawPrediction,
};
pub use engine::{Engine, EngineConfig, EngineState};
pub use ensemble::ClassifierEnsemble;
pub use error::EngineError;
pub use labels::LabelProfiles;
pub use profile::ProfileClassifier;
pub use scoring::score;
pub use vote::{VoteOutcome, aggregate, majority_vote};
