//! Static disease → remedy/exercise recommendations.
//!
//! The file format is a JSON object keyed by disease label:
//!
//! ```json
//! { "Flu": { "remedies": ["Rest"], "exercises": ["Avoid exertion"] } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::CoreError;

const BUILTIN_REMEDIES: &str = include_str!("../data/remedies.json");

/// Remedy and exercise lists for one disease label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub remedies: Vec<String>,
    #[serde(default)]
    pub exercises: Vec<String>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.remedies.is_empty() && self.exercises.is_empty()
    }
}

/// Immutable lookup table from disease label to [`Recommendations`].
///
/// A missing label is a normal state: [`lookup`](Self::lookup) yields empty
/// lists rather than an error.
#[derive(Debug, Clone, Default)]
pub struct RemedyTable {
    entries: BTreeMap<String, Recommendations>,
}

impl RemedyTable {
    pub fn new(entries: BTreeMap<String, Recommendations>) -> Self {
        Self { entries }
    }

    /// Table for the conditions of the reference symptom dataset.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json_str(BUILTIN_REMEDIES)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let entries: BTreeMap<String, Recommendations> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(CoreError::RemedyTableNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        info!(labels = table.len(), path = %path.display(), "loaded remedy table");
        Ok(table)
    }

    /// Recommendations for `label`, or empty lists when the label is unknown.
    pub fn lookup(&self, label: &str) -> Recommendations {
        self.entries.get(label).cloned().unwrap_or_default()
    }

    pub fn get(&self, label: &str) -> Option<&Recommendations> {
        self.entries.get(label)
    }

    /// Known labels, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
