//! Diagnosis history records and the sink they are written to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Caller-supplied subject (user name, patient id); `None` for anonymous calls.
    pub subject: Option<String>,
    pub disease: String,
    pub symptoms: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(subject: Option<String>, disease: impl Into<String>, symptoms: Vec<String>) -> Self {
        Self {
            subject,
            disease: disease.into(),
            symptoms,
            recorded_at: Utc::now(),
        }
    }
}

/// Destination for best-effort diagnosis logging.
///
/// Implementations are shared across concurrent diagnose calls and must do
/// their own synchronisation. Errors are reported to the caller of `record`,
/// which logs them and carries on; a sink failure never fails a diagnosis.
pub trait HistorySink: Send + Sync {
    fn record(&self, entry: &HistoryEntry) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_json_roundtrip() {
        let entry = HistoryEntry::new(
            Some("alice".into()),
            "Flu",
            vec!["fever".into(), "cough".into()],
        );
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn anonymous_entry_serialises_null_subject() {
        let entry = HistoryEntry::new(None, "Migraine", vec!["headache".into()]);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["subject"].is_null());
        assert_eq!(json["disease"], "Migraine");
    }
}
