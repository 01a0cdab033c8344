//! Artifact bundle: the persisted symptom catalog and trained ensemble.
//!
//! A bundle is a directory holding `manifest.json`:
//!
//! ```json
//! {
//!   "symptoms": ["chills", "cough", "fever"],
//!   "models": [
//!     {"name": "NearestCentroid", "kind": "centroid", "metric": "cosine",
//!      "profiles": [{"label": "Flu", "symptoms": ["fever", "cough"]}]},
//!     {"name": "ProfileMatch", "kind": "profile",
//!      "profiles": [{"label": "Flu", "symptoms": ["fever", "cough"]}]},
//!     {"name": "Forest", "kind": "onnx", "path": "forest.onnx",
//!      "labels": ["Flu"], "probabilities": true}
//!   ],
//!   "remedies": "remedies.json"
//! }
//! ```
//!
//! Paths inside the manifest are relative to the bundle directory.

use std::path::{Path, PathBuf};

use healix_core::{RemedyTable, SymptomCatalog};
use serde::Deserialize;
use tracing::{info, warn};

use crate::centroid::{CentroidClassifier, Metric};
use crate::classifier::Classifier;
use crate::ensemble::ClassifierEnsemble;
use crate::labels::LabelProfiles;
use crate::profile::ProfileClassifier;
use crate::EngineError;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    symptoms: Vec<String>,
    models: Vec<ModelSpec>,
    #[serde(default)]
    remedies: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelSpec {
    Centroid {
        name: String,
        #[serde(default)]
        metric: Metric,
        profiles: Vec<ProfileSpec>,
    },
    Profile {
        name: String,
        profiles: Vec<ProfileSpec>,
    },
    Onnx {
        name: String,
        path: PathBuf,
        labels: Vec<String>,
        #[serde(default)]
        probabilities: bool,
    },
}

impl ModelSpec {
    fn name(&self) -> &str {
        match self {
            Self::Centroid { name, .. } | Self::Profile { name, .. } | Self::Onnx { name, .. } => {
                name
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileSpec {
    label: String,
    symptoms: Vec<String>,
}

/// Catalog, ensemble and optional remedy table loaded from a bundle directory.
#[derive(Debug)]
pub struct ArtifactBundle {
    pub catalog: SymptomCatalog,
    pub ensemble: ClassifierEnsemble,
    /// Bundle-local remedy table, when the manifest names one.
    pub remedies: Option<RemedyTable>,
}

impl ArtifactBundle {
    /// Load `manifest.json` from `dir` and build every declared classifier.
    ///
    /// Any problem (missing file, malformed manifest, an invalid catalog, a
    /// classifier that cannot be built or does not match the catalog width)
    /// is an [`EngineError::ArtifactLoad`].
    pub fn load(dir: &Path) -> Result<Self, EngineError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(EngineError::artifact(&manifest_path, "manifest not found"));
        }

        let text = std::fs::read_to_string(&manifest_path)
            .map_err(|e| EngineError::artifact(&manifest_path, e))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .map_err(|e| EngineError::artifact(&manifest_path, format!("invalid manifest: {e}")))?;

        let catalog = SymptomCatalog::new(manifest.symptoms)
            .map_err(|e| EngineError::artifact(&manifest_path, e))?;

        if manifest.models.is_empty() {
            return Err(EngineError::artifact(&manifest_path, "no models declared"));
        }

        let mut ensemble = ClassifierEnsemble::new();
        for spec in &manifest.models {
            let name = spec.name().to_string();
            let classifier = build_classifier(dir, spec, &catalog)
                .map_err(|e| EngineError::artifact(&manifest_path, format!("model {name}: {e:#}")))?;

            if let Some(dim) = classifier.input_dim()
                && dim != catalog.len()
            {
                return Err(EngineError::artifact(
                    &manifest_path,
                    format!(
                        "model {name} expects {dim} features, catalog has {}",
                        catalog.len()
                    ),
                ));
            }

            ensemble
                .push(name, classifier)
                .map_err(|e| EngineError::artifact(&manifest_path, e))?;
        }

        let remedies = match &manifest.remedies {
            Some(rel) => {
                let path = dir.join(rel);
                let table =
                    RemedyTable::from_file(&path).map_err(|e| EngineError::artifact(&path, e))?;
                Some(table)
            }
            None => None,
        };

        info!(
            bundle = %dir.display(),
            symptoms = catalog.len(),
            models = ensemble.len(),
            "loaded artifact bundle"
        );
        Ok(Self {
            catalog,
            ensemble,
            remedies,
        })
    }
}

fn build_classifier(
    dir: &Path,
    spec: &ModelSpec,
    catalog: &SymptomCatalog,
) -> anyhow::Result<Classifier> {
    match spec {
        ModelSpec::Centroid {
            name,
            metric,
            profiles,
        } => {
            let profiles = build_profiles(name, profiles, catalog)?;
            Ok(Classifier::with_distribution(CentroidClassifier::build(
                &profiles, *metric,
            )))
        }
        ModelSpec::Profile { name, profiles } => {
            let profiles = build_profiles(name, profiles, catalog)?;
            Ok(Classifier::label_only(ProfileClassifier::new(profiles)))
        }
        ModelSpec::Onnx {
            path,
            labels,
            probabilities,
            ..
        } => build_onnx(&dir.join(path), labels, *probabilities),
    }
}

fn build_profiles(
    name: &str,
    specs: &[ProfileSpec],
    catalog: &SymptomCatalog,
) -> anyhow::Result<LabelProfiles> {
    anyhow::ensure!(!specs.is_empty(), "no label profiles declared");

    let mut profiles = LabelProfiles::new(catalog);
    for spec in specs {
        profiles.insert(catalog, &spec.label, &spec.symptoms);
    }

    let summary = profiles.summary();
    if summary.empty_profiles > 0 {
        warn!(
            model = name,
            empty = summary.empty_profiles,
            "profiles with no catalog symptoms can never be predicted"
        );
    }
    Ok(profiles)
}

#[cfg(feature = "onnx")]
fn build_onnx(path: &Path, labels: &[String], probabilities: bool) -> anyhow::Result<Classifier> {
    let model = crate::onnx::OnnxClassifier::load(path, labels.to_vec(), probabilities)?;
    Ok(if probabilities {
        Classifier::with_distribution(model)
    } else {
        Classifier::label_only(model)
    })
}

#[cfg(not(feature = "onnx"))]
fn build_onnx(path: &Path, _labels: &[String], _probabilities: bool) -> anyhow::Result<Classifier> {
    anyhow::bail!(
        "{} needs ONNX Runtime; rebuild with the `onnx` feature",
        path.display()
    )
}
