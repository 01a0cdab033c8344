//! Disease label profiles: the symptom sets that characterise each label.
//!
//! Profiles are encoded against the bundle's [`SymptomCatalog`] with the same
//! ignore-unknown policy as caller input, and keep their declaration order so
//! that classifiers built from them break ties deterministically.

use healix_core::{FeatureVector, SymptomCatalog, encode};

/// Ordered label → encoded symptom profile.
#[derive(Debug, Clone)]
pub struct LabelProfiles {
    profiles: Vec<(String, FeatureVector)>,
    dim: usize,
}

/// Summary statistics for a set of profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub labels: usize,
    pub dim: usize,
    /// Profiles with no symptom present in the catalog (they can never match).
    pub empty_profiles: usize,
    pub mean_symptoms: f64,
}

impl LabelProfiles {
    pub fn new(catalog: &SymptomCatalog) -> Self {
        Self {
            profiles: Vec::new(),
            dim: catalog.len(),
        }
    }

    /// Build from `(label, symptoms)` pairs in declaration order.
    pub fn build<L, S>(catalog: &SymptomCatalog, profiles: &[(L, Vec<S>)]) -> Self
    where
        L: AsRef<str>,
        S: AsRef<str>,
    {
        let mut out = Self::new(catalog);
        for (label, symptoms) in profiles {
            out.insert(catalog, label.as_ref(), symptoms);
        }
        out
    }

    /// Add a profile. A repeated label merges its symptoms into the existing
    /// profile and keeps the original position.
    pub fn insert<S: AsRef<str>>(&mut self, catalog: &SymptomCatalog, label: &str, symptoms: &[S]) {
        let vector = encode(symptoms, catalog);
        match self.profiles.iter_mut().find(|(l, _)| l == label) {
            Some((_, existing)) => *existing = existing.union(&vector),
            None => self.profiles.push((label.to_string(), vector)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureVector)> {
        self.profiles.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn summary(&self) -> ProfileSummary {
        let total: usize = self.profiles.iter().map(|(_, v)| v.count_ones()).sum();
        let empty_profiles = self
            .profiles
            .iter()
            .filter(|(_, v)| v.count_ones() == 0)
            .count();
        let mean_symptoms = if self.profiles.is_empty() {
            0.0
        } else {
            total as f64 / self.profiles.len() as f64
        };

        ProfileSummary {
            labels: self.profiles.len(),
            dim: self.dim,
            empty_profiles,
            mean_symptoms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SymptomCatalog {
        SymptomCatalog::new(["chills", "cough", "fever", "headache", "nausea"]).unwrap()
    }

    #[test]
    fn build_keeps_declaration_order() {
        let c = catalog();
        let profiles = LabelProfiles::build(
            &c,
            &[
                ("Malaria", vec!["fever", "chills"]),
                ("Flu", vec!["fever", "cough"]),
                ("Migraine", vec!["headache", "nausea"]),
            ],
        );
        let labels: Vec<&str> = profiles.labels().collect();
        assert_eq!(labels, vec!["Malaria", "Flu", "Migraine"]);
        assert_eq!(profiles.dim(), 5);
    }

    #[test]
    fn unknown_profile_symptoms_are_ignored() {
        let c = catalog();
        let profiles = LabelProfiles::build(&c, &[("Malaria", vec!["fever", "sweating"])]);
        let (_, v) = profiles.iter().next().unwrap();
        assert_eq!(v.as_slice(), &[0, 0, 1, 0, 0]);
    }

    #[test]
    fn repeated_label_merges() {
        let c = catalog();
        let mut profiles = LabelProfiles::new(&c);
        profiles.insert(&c, "Flu", &["fever"]);
        profiles.insert(&c, "Migraine", &["headache"]);
        profiles.insert(&c, "Flu", &["cough"]);
        assert_eq!(profiles.len(), 2);
        let (label, v) = profiles.iter().next().unwrap();
        assert_eq!(label, "Flu");
        assert_eq!(v.as_slice(), &[0, 1, 1, 0, 0]);
    }

    #[test]
    fn summary_counts() {
        let c = catalog();
        let profiles = LabelProfiles::build(
            &c,
            &[
                ("Flu", vec!["fever", "cough", "chills"]),
                ("Migraine", vec!["headache"]),
                ("Food Poisoning", vec!["stomach_pain"]),
            ],
        );
        let s = profiles.summary();
        assert_eq!(s.labels, 3);
        assert_eq!(s.dim, 5);
        assert_eq!(s.empty_profiles, 1);
        assert!((s.mean_symptoms - 4.0 / 3.0).abs() < 1e-9);
    }
}
