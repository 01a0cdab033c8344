//! Diagnose orchestration over immutable, load-once engine state.
//!
//! [`Engine::load`] reads the artifact bundle exactly once. If that fails the
//! failure is cached and every later [`Engine::diagnose`] call returns
//! [`EngineError::Unavailable`] without touching any classifier; recovering
//! requires building a new engine.
//!
//! The state is read-only after construction, so one `Engine` (typically
//! behind an `Arc`) serves any number of concurrent diagnose calls without
//! locking. Each call allocates its own vector and result.

use std::path::PathBuf;
use std::sync::Arc;

use healix_core::{
    CoreError, Diagnosis, EnsembleResult, HistoryEntry, HistorySink, ModelVerdict, RemedyTable,
    SymptomCatalog, encode, parse_symptom_list,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bundle::ArtifactBundle;
use crate::ensemble::ClassifierEnsemble;
use crate::scoring::score;
use crate::vote::majority_vote;
use crate::EngineError;

/// Where the engine loads its artifacts from.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the bundle `manifest.json`.
    pub bundle_dir: PathBuf,
    /// Remedy table overriding the bundle's own and the built-in table.
    pub remedies_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            remedies_path: None,
        }
    }

    pub fn with_remedies(mut self, path: impl Into<PathBuf>) -> Self {
        self.remedies_path = Some(path.into());
        self
    }
}

/// Catalog, ensemble and remedy table, constructed once and never mutated.
#[derive(Debug)]
pub struct EngineState {
    catalog: SymptomCatalog,
    ensemble: ClassifierEnsemble,
    remedies: RemedyTable,
}

impl EngineState {
    /// Assemble state from already-loaded parts.
    ///
    /// The ensemble must be non-empty and every classifier that knows its
    /// input width must match the catalog.
    pub fn new(
        catalog: SymptomCatalog,
        ensemble: ClassifierEnsemble,
        remedies: RemedyTable,
    ) -> Result<Self, EngineError> {
        if ensemble.is_empty() {
            return Err(EngineError::InvalidInput("ensemble has no classifiers".into()));
        }
        for (name, classifier) in ensemble.iter() {
            if let Some(dim) = classifier.input_dim()
                && dim != catalog.len()
            {
                return Err(EngineError::InvalidInput(format!(
                    "classifier {name} expects {dim} features, catalog has {}",
                    catalog.len()
                )));
            }
        }
        Ok(Self {
            catalog,
            ensemble,
            remedies,
        })
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn ensemble(&self) -> &ClassifierEnsemble {
        &self.ensemble
    }

    pub fn remedies(&self) -> &RemedyTable {
        &self.remedies
    }
}

/// The symptom-to-disease inference engine.
pub struct Engine {
    state: Result<EngineState, String>,
    history: Option<Arc<dyn HistorySink>>,
}

impl Engine {
    /// Load the engine from `config`. Never fails: a load failure is logged
    /// once and cached as the unavailable state.
    pub fn load(config: &EngineConfig) -> Self {
        match Self::try_load(config) {
            Ok(state) => Self::from_state(state),
            Err(e) => {
                warn!(error = %e, "artifact load failed, engine unavailable");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// Load state from `config`, surfacing the [`EngineError::ArtifactLoad`].
    pub fn try_load(config: &EngineConfig) -> Result<EngineState, EngineError> {
        let bundle = ArtifactBundle::load(&config.bundle_dir)?;

        let remedies = match (&config.remedies_path, bundle.remedies) {
            (Some(path), _) => {
                RemedyTable::from_file(path).map_err(|e| EngineError::artifact(path, e))?
            }
            (None, Some(table)) => table,
            (None, None) => RemedyTable::builtin()
                .map_err(|e| EngineError::artifact("<builtin remedies>", e))?,
        };

        EngineState::new(bundle.catalog, bundle.ensemble, remedies)
            .map_err(|e| EngineError::artifact(&config.bundle_dir, e))
    }

    pub fn from_state(state: EngineState) -> Self {
        info!(
            symptoms = state.catalog.len(),
            models = state.ensemble.len(),
            remedies = state.remedies.len(),
            "engine ready"
        );
        Self {
            state: Ok(state),
            history: None,
        }
    }

    /// An engine that reports `reason` for every call.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: Err(reason.into()),
            history: None,
        }
    }

    /// Record every successful diagnosis to `sink`, best effort.
    pub fn with_history(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = Some(sink);
        self
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ok()
    }

    pub fn state(&self) -> Result<&EngineState, EngineError> {
        self.state
            .as_ref()
            .map_err(|reason| EngineError::Unavailable(reason.clone()))
    }

    /// Catalog identifiers in feature order.
    pub fn symptoms(&self) -> Result<Vec<&str>, EngineError> {
        Ok(self.state()?.catalog.iter().collect())
    }

    /// Diagnose an anonymous symptom list.
    pub fn diagnose<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Diagnosis, EngineError> {
        self.diagnose_for(None, symptoms)
    }

    /// Diagnose an untyped JSON symptom list, rejecting anything that is not
    /// an array of strings as [`EngineError::InvalidInput`].
    pub fn diagnose_json(&self, symptoms: &Value) -> Result<Diagnosis, EngineError> {
        self.diagnose_json_for(None, symptoms)
    }

    /// [`diagnose_json`](Self::diagnose_json) on behalf of `subject`.
    pub fn diagnose_json_for(
        &self,
        subject: Option<&str>,
        symptoms: &Value,
    ) -> Result<Diagnosis, EngineError> {
        // Readiness is checked before input validation.
        self.state()?;
        let symptoms = parse_symptom_list(symptoms).map_err(|e| match e {
            CoreError::InvalidInput(reason) => EngineError::InvalidInput(reason),
            other => EngineError::InvalidInput(other.to_string()),
        })?;
        self.diagnose_for(subject, symptoms.as_slice())
    }

    /// Diagnose `symptoms` on behalf of `subject` (recorded in history).
    pub fn diagnose_for<S: AsRef<str>>(
        &self,
        subject: Option<&str>,
        symptoms: &[S],
    ) -> Result<Diagnosis, EngineError> {
        let state = self.state()?;

        let vector = encode(symptoms, &state.catalog);
        let raw = state.ensemble.predict(&vector)?;

        let mut per_model = EnsembleResult::with_capacity(raw.len());
        for (name, prediction) in raw {
            let confidence = score(prediction.distribution.as_ref());
            per_model.push(name, ModelVerdict::new(prediction.label, confidence));
        }

        let outcome = majority_vote(per_model.labels())
            .ok_or_else(|| EngineError::Unavailable("ensemble produced no predictions".into()))?;
        debug!(
            label = %outcome.label,
            votes = outcome.votes,
            total = outcome.total,
            tied = outcome.tied,
            "majority vote"
        );

        let recommendations = state.remedies.lookup(&outcome.label);
        let diagnosis = Diagnosis {
            per_model,
            final_label: outcome.label,
            remedies: recommendations.remedies,
            exercises: recommendations.exercises,
        };

        self.record_history(subject, symptoms, &diagnosis);
        Ok(diagnosis)
    }

    /// Best-effort history write: failures are logged, never returned.
    fn record_history<S: AsRef<str>>(
        &self,
        subject: Option<&str>,
        symptoms: &[S],
        diagnosis: &Diagnosis,
    ) {
        let Some(sink) = &self.history else {
            return;
        };
        let entry = HistoryEntry::new(
            subject.map(str::to_string),
            diagnosis.final_label.clone(),
            symptoms.iter().map(|s| s.as_ref().to_string()).collect(),
        );
        if let Err(e) = sink.record(&entry) {
            warn!(error = %format!("{e:#}"), "failed to record diagnosis history");
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("history", &self.history.is_some())
            .finish()
    }
}
