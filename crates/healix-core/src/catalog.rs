//! Symptom vocabulary and binary feature encoding.
//!
//! The catalog fixes the feature-vector dimensionality: index `i` of every
//! [`FeatureVector`] corresponds to `catalog[i]`. Classifiers are trained
//! against one exact catalog ordering, so the catalog is loaded together with
//! the ensemble and never reordered afterwards.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::CoreError;

/// Immutable ordered set of canonical symptom identifiers.
#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    symptoms: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymptomCatalog {
    /// Build a catalog from identifiers in feature order.
    ///
    /// Rejects an empty vocabulary, blank identifiers and duplicates: any of
    /// these would make the identifier → index mapping ambiguous.
    pub fn new<I, S>(symptoms: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symptoms: Vec<String> = symptoms.into_iter().map(Into::into).collect();
        if symptoms.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }

        let mut index = HashMap::with_capacity(symptoms.len());
        for (i, symptom) in symptoms.iter().enumerate() {
            if symptom.trim().is_empty() {
                return Err(CoreError::BlankSymptom(i));
            }
            if index.insert(symptom.clone(), i).is_some() {
                return Err(CoreError::DuplicateSymptom(symptom.clone()));
            }
        }

        Ok(Self { symptoms, index })
    }

    /// Vector dimensionality.
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn index_of(&self, symptom: &str) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.index.contains_key(symptom)
    }

    /// Identifiers in feature order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.symptoms
    }

    /// Shorthand for [`encode`] against this catalog.
    pub fn encode<S: AsRef<str>>(&self, symptoms: &[S]) -> FeatureVector {
        encode(symptoms, self)
    }
}

/// Fixed-length binary presence vector over a [`SymptomCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    /// All-zero vector of dimension `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0; dim])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn is_set(&self, i: usize) -> bool {
        self.0.get(i).is_some_and(|&v| v == 1)
    }

    /// Number of present symptoms.
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|&&v| v == 1).count()
    }

    /// Indices of present symptoms, ascending.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 1)
            .map(|(i, _)| i)
    }

    /// Dense `f32` copy, the input layout ONNX and distance-based models expect.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| f32::from(v)).collect()
    }

    /// Element-wise OR. Both vectors must come from the same catalog.
    pub fn union(&self, other: &FeatureVector) -> FeatureVector {
        FeatureVector(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(&a, &b)| a | b)
                .collect(),
        )
    }

    fn set(&mut self, i: usize) {
        self.0[i] = 1;
    }
}

/// Encode a caller-supplied symptom list against `catalog`.
///
/// Identifiers absent from the catalog are ignored without error, and the
/// result depends only on the set of recognised identifiers: order and
/// duplicates in `symptoms` do not change it. The output length always equals
/// `catalog.len()`.
pub fn encode<S: AsRef<str>>(symptoms: &[S], catalog: &SymptomCatalog) -> FeatureVector {
    let mut vector = FeatureVector::zeros(catalog.len());
    let mut ignored = 0usize;

    for symptom in symptoms {
        match catalog.index_of(symptom.as_ref()) {
            Some(i) => vector.set(i),
            None => ignored += 1,
        }
    }

    if ignored > 0 {
        debug!(ignored, "ignored symptoms absent from catalog");
    }
    vector
}

/// Validate an untyped symptom list at the request boundary.
///
/// Accepts a JSON array of strings; anything else (a non-array value, or an
/// array with a non-string entry) is rejected as [`CoreError::InvalidInput`]
/// instead of being coerced.
pub fn parse_symptom_list(value: &Value) -> Result<Vec<String>, CoreError> {
    let items = value.as_array().ok_or_else(|| {
        CoreError::InvalidInput(format!("symptoms must be an array, got {}", kind(value)))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(CoreError::InvalidInput(format!(
                "symptom at position {i} must be a string, got {}",
                kind(other)
            ))),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
