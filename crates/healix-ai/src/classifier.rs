//! Classifier capability: every ensemble member predicts a disease label for
//! a feature vector; some additionally report a score distribution over the
//! labels they know.
//!
//! The two variants are fixed when a bundle is loaded and dispatched through
//! [`Classifier`], so no call site probes a predictor for optional support.
//!
//! # Concurrency
//!
//! Predictors are invoked through `&self` from any number of concurrent
//! diagnose calls, hence the `Send + Sync` bound. An implementation wrapping
//! a non-reentrant runtime must serialise access itself (see the ONNX
//! predictor, which guards its session with a mutex).

use healix_core::FeatureVector;

/// Label-only prediction.
pub trait Predictor: Send + Sync {
    fn predict(&self, vector: &FeatureVector) -> anyhow::Result<String>;

    /// Feature width the predictor was trained on, when it knows it.
    fn input_dim(&self) -> Option<usize> {
        None
    }
}

/// Prediction with a score distribution over the predictor's known labels.
pub trait ProbabilisticPredictor: Predictor {
    fn predict_with_distribution(
        &self,
        vector: &FeatureVector,
    ) -> anyhow::Result<(String, Distribution)>;
}

/// Non-negative scores per label. Only the maximum is consumed downstream,
/// so the scores are not required to sum to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution(Vec<(String, f64)>);

impl Distribution {
    pub fn new(scores: Vec<(String, f64)>) -> Self {
        Self(scores)
    }

    /// Pair `labels` with `scores` positionally.
    pub fn from_parts(labels: &[String], scores: &[f64]) -> Self {
        Self(
            labels
                .iter()
                .cloned()
                .zip(scores.iter().copied())
                .collect(),
        )
    }

    /// Highest finite score, `None` when there is none.
    pub fn max(&self) -> Option<f64> {
        self.0
            .iter()
            .map(|(_, p)| *p)
            .filter(|p| p.is_finite())
            .fold(None, |best, p| match best {
                Some(b) if b >= p => Some(b),
                _ => Some(p),
            })
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which capability a classifier exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    LabelOnly,
    LabelWithDistribution,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabelOnly => "label-only",
            Self::LabelWithDistribution => "label+distribution",
        }
    }
}

/// One classifier's raw output before confidence scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub label: String,
    /// `None` for label-only classifiers.
    pub distribution: Option<Distribution>,
}

/// An ensemble member.
pub enum Classifier {
    LabelOnly(Box<dyn Predictor>),
    LabelWithDistribution(Box<dyn ProbabilisticPredictor>),
}

impl Classifier {
    pub fn label_only(predictor: impl Predictor + 'static) -> Self {
        Self::LabelOnly(Box::new(predictor))
    }

    pub fn with_distribution(predictor: impl ProbabilisticPredictor + 'static) -> Self {
        Self::LabelWithDistribution(Box::new(predictor))
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            Self::LabelOnly(_) => ClassifierKind::LabelOnly,
            Self::LabelWithDistribution(_) => ClassifierKind::LabelWithDistribution,
        }
    }

    pub fn input_dim(&self) -> Option<usize> {
        match self {
            Self::LabelOnly(p) => p.input_dim(),
            Self::LabelWithDistribution(p) => p.input_dim(),
        }
    }

    /// Run the classifier once. A label-only classifier yields an absent
    /// distribution rather than an error.
    pub fn predict(&self, vector: &FeatureVector) -> anyhow::Result<RawPrediction> {
        match self {
            Self::LabelOnly(p) => Ok(RawPrediction {
                label: p.predict(vector)?,
                distribution: None,
            }),
            Self::LabelWithDistribution(p) => {
                let (label, distribution) = p.predict_with_distribution(vector)?;
                Ok(RawPrediction {
                    label,
                    distribution: Some(distribution),
                })
            }
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("kind", &self.kind())
            .field("input_dim", &self.input_dim())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl Predictor for Fixed {
        fn predict(&self, _vector: &FeatureVector) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    impl ProbabilisticPredictor for Fixed {
        fn predict_with_distribution(
            &self,
            vector: &FeatureVector,
        ) -> anyhow::Result<(String, Distribution)> {
            let dist = Distribution::new(vec![(self.0.to_string(), 0.7), ("Other".into(), 0.3)]);
            Ok((self.predict(vector)?, dist))
        }
    }

    #[test]
    fn label_only_has_no_distribution() {
        let clf = Classifier::label_only(Fixed("Flu"));
        assert_eq!(clf.kind(), ClassifierKind::LabelOnly);
        let out = clf.predict(&FeatureVector::zeros(3)).unwrap();
        assert_eq!(out.label, "Flu");
        assert!(out.distribution.is_none());
    }

    #[test]
    fn distribution_variant_reports_scores() {
        let clf = Classifier::with_distribution(Fixed("Flu"));
        assert_eq!(clf.kind(), ClassifierKind::LabelWithDistribution);
        let out = clf.predict(&FeatureVector::zeros(3)).unwrap();
        let dist = out.distribution.unwrap();
        assert_eq!(dist.max(), Some(0.7));
        assert_eq!(dist.get("Other"), Some(0.3));
    }

    #[test]
    fn distribution_max_skips_non_finite() {
        let dist = Distribution::new(vec![
            ("A".into(), f64::NAN),
            ("B".into(), 0.2),
            ("C".into(), 0.4),
        ]);
        assert_eq!(dist.max(), Some(0.4));
        assert_eq!(Distribution::default().max(), None);
    }

    #[test]
    fn from_parts_pairs_positionally() {
        let labels = vec!["Flu".to_string(), "Malaria".to_string()];
        let dist = Distribution::from_parts(&labels, &[0.25, 0.75]);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get("Malaria"), Some(0.75));
    }
}
