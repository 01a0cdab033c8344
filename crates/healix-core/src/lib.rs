//! Core types shared by the Healix engine, store and CLI.

pub mod catalog;
pub mod diagnosis;
mod error;
pub mod history;
pub mod remedy;

pub use catalog::{FeatureVector, SymptomCatalog, encode, parse_symptom_list};
pub use diagnosis::{Diagnosis, EnsembleResult, ModelVerdict};
pub use error::CoreError;
pub use history::{HistoryEntry, HistorySink};
pub use remedy::{Recommendations, RemedyTable};
