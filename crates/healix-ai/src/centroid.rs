//! Nearest-centroid classification over symptom vectors.
//!
//! Holds one prototype per label, built from that label's symptom profile.
//! Classify a feature vector by computing its similarity to each prototype,
//! then selecting the best match. The similarity scores, clamped at zero and
//! normalised, double as the classifier's distribution.

use healix_core::FeatureVector;
use serde::Deserialize;

use crate::classifier::{Distribution, Predictor, ProbabilisticPredictor};
use crate::labels::LabelProfiles;

/// Similarity measure between a feature vector and a prototype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Cosine similarity of L2-normalised vectors.
    #[default]
    Cosine,
    /// Intersection over union of present symptoms.
    Jaccard,
}

/// Centroid-based classifier for symptom vectors.
#[derive(Debug, Clone)]
pub struct CentroidClassifier {
    centroids: Vec<(String, Vec<f32>)>,
    metric: Metric,
    dim: usize,
}

impl CentroidClassifier {
    /// Build a classifier with one centroid per profile, in profile order.
    pub fn build(profiles: &LabelProfiles, metric: Metric) -> Self {
        let centroids = profiles
            .iter()
            .map(|(label, vector)| {
                let mut centroid = vector.to_f32();
                if metric == Metric::Cosine {
                    normalize(&mut centroid);
                }
                (label.to_string(), centroid)
            })
            .collect();

        Self {
            centroids,
            metric,
            dim: profiles.dim(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of centroids.
    pub fn label_count(&self) -> usize {
        self.centroids.len()
    }

    /// Similarity to every centroid, in centroid order.
    pub fn similarities(&self, vector: &FeatureVector) -> Vec<(&str, f32)> {
        let mut input = vector.to_f32();
        match self.metric {
            Metric::Cosine => {
                normalize(&mut input);
                self.centroids
                    .iter()
                    .map(|(label, c)| (label.as_str(), cosine_sim(&input, c)))
                    .collect()
            }
            Metric::Jaccard => self
                .centroids
                .iter()
                .map(|(label, c)| (label.as_str(), jaccard(&input, c)))
                .collect(),
        }
    }

    /// Find the centroid with highest similarity. The first declared centroid
    /// wins ties.
    fn best_match(&self, vector: &FeatureVector) -> anyhow::Result<(String, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for (label, sim) in self.similarities(vector) {
            match best {
                Some((_, best_sim)) if sim <= best_sim => {}
                _ => best = Some((label, sim)),
            }
        }
        best.map(|(label, sim)| (label.to_string(), sim))
            .ok_or_else(|| anyhow::anyhow!("centroid classifier has no labels"))
    }
}

impl Predictor for CentroidClassifier {
    fn predict(&self, vector: &FeatureVector) -> anyhow::Result<String> {
        self.best_match(vector).map(|(label, _)| label)
    }

    fn input_dim(&self) -> Option<usize> {
        Some(self.dim)
    }
}

impl ProbabilisticPredictor for CentroidClassifier {
    fn predict_with_distribution(
        &self,
        vector: &FeatureVector,
    ) -> anyhow::Result<(String, Distribution)> {
        let (label, _) = self.best_match(vector)?;

        let sims = self.similarities(vector);
        let clamped: Vec<f64> = sims.iter().map(|(_, s)| f64::from(s.max(0.0))).collect();
        let total: f64 = clamped.iter().sum();

        let scores = sims
            .iter()
            .zip(&clamped)
            .map(|((l, _), &s)| {
                let p = if total > 0.0 {
                    s / total
                } else {
                    1.0 / sims.len() as f64
                };
                (l.to_string(), p)
            })
            .collect();

        Ok((label, Distribution::new(scores)))
    }
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn jaccard(a: &[f32], b: &[f32]) -> f32 {
    let (mut inter, mut union) = (0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        inter += x.min(*y);
        union += x.max(*y);
    }
    if union > 0.0 { inter / union } else { 0.0 }
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healix_core::SymptomCatalog;

    fn catalog() -> SymptomCatalog {
        SymptomCatalog::new([
            "chills", "cough", "fever", "headache", "nausea", "sore_throat",
        ])
        .unwrap()
    }

    fn profiles(c: &SymptomCatalog) -> LabelProfiles {
        LabelProfiles::build(
            c,
            &[
                ("Flu", vec!["fever", "cough", "chills"]),
                ("Migraine", vec!["headache", "nausea"]),
                ("Common Cold", vec!["cough", "sore_throat"]),
            ],
        )
    }

    #[test]
    fn build_one_centroid_per_label() {
        let c = catalog();
        let clf = CentroidClassifier::build(&profiles(&c), Metric::Cosine);
        assert_eq!(clf.label_count(), 3);
        assert_eq!(clf.input_dim(), Some(6));

        // Cosine centroids are unit length.
        let norm: f32 = clf.centroids[0].1.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn classify_picks_nearest_label() {
        let c = catalog();
        let clf = CentroidClassifier::build(&profiles(&c), Metric::Cosine);
        let v = c.encode(&["fever", "chills"]);
        assert_eq!(clf.predict(&v).unwrap(), "Flu");

        let v = c.encode(&["headache"]);
        assert_eq!(clf.predict(&v).unwrap(), "Migraine");
    }

    #[test]
    fn jaccard_metric() {
        let c = catalog();
        let clf = CentroidClassifier::build(&profiles(&c), Metric::Jaccard);
        let v = c.encode(&["cough", "sore_throat"]);
        let sims = clf.similarities(&v);
        assert_eq!(sims[2], ("Common Cold", 1.0));
        // Flu shares only "cough": 1 / 4.
        assert!((sims[0].1 - 0.25).abs() < 1e-6);
        assert_eq!(clf.predict(&v).unwrap(), "Common Cold");
    }

    #[test]
    fn ties_resolve_to_first_declared() {
        let c = catalog();
        let clf = CentroidClassifier::build(&profiles(&c), Metric::Cosine);
        // Nothing present: every similarity is zero.
        let v = FeatureVector::zeros(c.len());
        assert_eq!(clf.predict(&v).unwrap(), "Flu");
    }

    #[test]
    fn distribution_is_normalised_and_agrees_with_label() {
        let c = catalog();
        let clf = CentroidClassifier::build(&profiles(&c), Metric::Cosine);
        let v = c.encode(&["fever", "cough"]);
        let (label, dist) = clf.predict_with_distribution(&v).unwrap();
        assert_eq!(label, "Flu");

        let total: f64 = dist.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(dist.max(), dist.get("Flu"));
        assert!(dist.iter().all(|(_, p)| p >= 0.0));
    }

    #[test]
    fn empty_input_yields_uniform_distribution() {
        let c = catalog();
        let clf = CentroidClassifier::build(&profiles(&c), Metric::Cosine);
        let (_, dist) = clf
            .predict_with_distribution(&FeatureVector::zeros(c.len()))
            .unwrap();
        for (_, p) in dist.iter() {
            assert!((p - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn no_labels_is_an_error() {
        let c = catalog();
        let clf = CentroidClassifier::build(&LabelProfiles::new(&c), Metric::Cosine);
        assert!(clf.predict(&c.encode(&["fever"])).is_err());
    }
}
