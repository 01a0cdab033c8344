//! Ordered collection of named classifiers queried together.

use healix_core::FeatureVector;
use tracing::debug;

use crate::EngineError;
use crate::classifier::{Classifier, RawPrediction};

/// Named classifiers in declaration order.
///
/// Constructed once at startup and read-only afterwards; every classifier is
/// invoked with the same vector and results are returned in declaration order.
#[derive(Debug, Default)]
pub struct ClassifierEnsemble {
    members: Vec<(String, Classifier)>,
}

impl ClassifierEnsemble {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member. Names must be unique.
    pub fn push(&mut self, name: impl Into<String>, classifier: Classifier) -> Result<(), EngineError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(EngineError::InvalidInput(format!(
                "duplicate classifier name: {name}"
            )));
        }
        self.members.push((name, classifier));
        Ok(())
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, classifier: Classifier) -> Result<Self, EngineError> {
        self.push(name, classifier)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Classifier)> {
        self.members.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Run every member on `vector`.
    ///
    /// Fails as a whole if any member fails: callers get either one result per
    /// classifier or an error naming the classifier, never a partial set.
    pub fn predict(&self, vector: &FeatureVector) -> Result<Vec<(&str, RawPrediction)>, EngineError> {
        self.members
            .iter()
            .map(|(name, classifier)| {
                let prediction = classifier.predict(vector).map_err(|e| EngineError::Inference {
                    model: name.clone(),
                    reason: format!("{e:#}"),
                })?;
                debug!(
                    model = %name,
                    label = %prediction.label,
                    has_distribution = prediction.distribution.is_some(),
                    "classifier prediction"
                );
                Ok((name.as_str(), prediction))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Predictor;

    struct Fixed(&'static str);

    impl Predictor for Fixed {
        fn predict(&self, _vector: &FeatureVector) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl Predictor for Broken {
        fn predict(&self, _vector: &FeatureVector) -> anyhow::Result<String> {
            anyhow::bail!("model weights corrupt")
        }
    }

    #[test]
    fn predict_preserves_declaration_order() {
        let ensemble = ClassifierEnsemble::new()
            .with("M3", Classifier::label_only(Fixed("C")))
            .unwrap()
            .with("M1", Classifier::label_only(Fixed("A")))
            .unwrap()
            .with("M2", Classifier::label_only(Fixed("B")))
            .unwrap();

        let out = ensemble.predict(&FeatureVector::zeros(2)).unwrap();
        let names: Vec<&str> = out.iter().map(|(n, _)| *n).collect();
        let labels: Vec<&str> = out.iter().map(|(_, p)| p.label.as_str()).collect();
        assert_eq!(names, vec!["M3", "M1", "M2"]);
        assert_eq!(labels, vec!["C", "A", "B"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut ensemble = ClassifierEnsemble::new();
        ensemble.push("SVC", Classifier::label_only(Fixed("A"))).unwrap();
        let err = ensemble
            .push("SVC", Classifier::label_only(Fixed("B")))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(ensemble.len(), 1);
    }

    #[test]
    fn failing_member_fails_the_call() {
        let ensemble = ClassifierEnsemble::new()
            .with("Good", Classifier::label_only(Fixed("A")))
            .unwrap()
            .with("Bad", Classifier::label_only(Broken))
            .unwrap();

        match ensemble.predict(&FeatureVector::zeros(2)) {
            Err(EngineError::Inference { model, reason }) => {
                assert_eq!(model, "Bad");
                assert!(reason.contains("corrupt"));
            }
            other => panic!("expected inference error, got {other:?}"),
        }
    }
}
