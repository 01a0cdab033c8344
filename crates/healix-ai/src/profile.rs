//! Profile-overlap classification: the label whose symptom profile shares the
//! most symptoms with the input wins. Reports no distribution.

use healix_core::FeatureVector;

use crate::classifier::Predictor;
use crate::labels::LabelProfiles;

#[derive(Debug, Clone)]
pub struct ProfileClassifier {
    profiles: LabelProfiles,
}

impl ProfileClassifier {
    pub fn new(profiles: LabelProfiles) -> Self {
        Self { profiles }
    }

    /// Shared-symptom count per label, in profile order.
    pub fn overlaps(&self, vector: &FeatureVector) -> Vec<(&str, usize)> {
        self.profiles
            .iter()
            .map(|(label, profile)| {
                let shared = profile.active_indices().filter(|&i| vector.is_set(i)).count();
                (label, shared)
            })
            .collect()
    }
}

impl Predictor for ProfileClassifier {
    fn predict(&self, vector: &FeatureVector) -> anyhow::Result<String> {
        let mut best: Option<(&str, usize)> = None;
        for (label, shared) in self.overlaps(vector) {
            match best {
                Some((_, best_shared)) if shared <= best_shared => {}
                _ => best = Some((label, shared)),
            }
        }
        best.map(|(label, _)| label.to_string())
            .ok_or_else(|| anyhow::anyhow!("profile classifier has no labels"))
    }

    fn input_dim(&self) -> Option<usize> {
        Some(self.profiles.dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healix_core::SymptomCatalog;

    fn setup() -> (SymptomCatalog, ProfileClassifier) {
        let c = SymptomCatalog::new(["chills", "cough", "diarrhea", "fever", "nausea", "vomiting"])
            .unwrap();
        let profiles = LabelProfiles::build(
            &c,
            &[
                ("Malaria", vec!["fever", "chills", "nausea"]),
                ("Food Poisoning", vec!["nausea", "vomiting", "diarrhea"]),
                ("Pneumonia", vec!["cough", "fever", "chills"]),
            ],
        );
        (c, ProfileClassifier::new(profiles))
    }

    #[test]
    fn most_shared_symptoms_wins() {
        let (c, clf) = setup();
        let v = c.encode(&["vomiting", "diarrhea"]);
        assert_eq!(clf.predict(&v).unwrap(), "Food Poisoning");
    }

    #[test]
    fn overlap_ties_go_to_first_profile() {
        let (c, clf) = setup();
        // fever + chills: Malaria and Pneumonia both share two.
        let v = c.encode(&["fever", "chills"]);
        let overlaps = clf.overlaps(&v);
        assert_eq!(overlaps, vec![("Malaria", 2), ("Food Poisoning", 0), ("Pneumonia", 2)]);
        assert_eq!(clf.predict(&v).unwrap(), "Malaria");
    }

    #[test]
    fn reports_input_dim() {
        let (_, clf) = setup();
        assert_eq!(clf.input_dim(), Some(6));
    }
}
