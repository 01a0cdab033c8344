//! Diagnosis result types and their JSON wire shape.
//!
//! A [`Diagnosis`] serialises to
//!
//! ```json
//! {
//!   "predictions": {"RandomForest": {"disease": "Flu", "confidence": 91.0}},
//!   "final_prediction": "Flu",
//!   "remedies": ["..."],
//!   "exercises": ["..."]
//! }
//! ```
//!
//! with `predictions` keys in ensemble declaration order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One classifier's label and confidence (percentage in `[0, 100]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVerdict {
    #[serde(rename = "disease")]
    pub label: String,
    pub confidence: f64,
}

impl ModelVerdict {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Per-classifier verdicts keyed by classifier name, in ensemble order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnsembleResult {
    entries: Vec<(String, ModelVerdict)>,
}

impl EnsembleResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a verdict. Names are unique within an ensemble, so a repeated
    /// name replaces the earlier verdict in place.
    pub fn push(&mut self, model: impl Into<String>, verdict: ModelVerdict) {
        let model = model.into();
        match self.entries.iter_mut().find(|(name, _)| *name == model) {
            Some(entry) => entry.1 = verdict,
            None => self.entries.push((model, verdict)),
        }
    }

    pub fn get(&self, model: &str) -> Option<&ModelVerdict> {
        self.entries
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelVerdict)> {
        self.entries.iter().map(|(name, v)| (name.as_str(), v))
    }

    /// Labels in ensemble order, the input to majority voting.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for EnsembleResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, verdict) in &self.entries {
            map.serialize_entry(name, verdict)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EnsembleResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = EnsembleResult;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of model name to prediction")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut result = EnsembleResult::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, verdict)) = access.next_entry::<String, ModelVerdict>()? {
                    result.push(name, verdict);
                }
                Ok(result)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Complete outcome of one diagnose call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    #[serde(rename = "predictions")]
    pub per_model: EnsembleResult,
    #[serde(rename = "final_prediction")]
    pub final_label: String,
    pub remedies: Vec<String>,
    pub exercises: Vec<String>,
}

impl Diagnosis {
    /// Number of classifiers that voted for the final label.
    pub fn vote_count(&self) -> usize {
        self.per_model
            .labels()
            .filter(|l| *l == self.final_label)
            .count()
    }

    /// Whether every classifier agreed on the final label.
    pub fn is_unanimous(&self) -> bool {
        !self.per_model.is_empty() && self.vote_count() == self.per_model.len()
    }
}
