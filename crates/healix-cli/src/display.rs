//! Card display for diagnoses, remedy lists, ensemble members and history.

use std::fmt;

use chrono::Local;
use healix_ai::ClassifierEnsemble;
use healix_core::{Diagnosis, HistoryEntry, Recommendations};

const MAX_LIST_ITEMS: usize = 10;

/// A diagnosis as a vertical card: per-model verdicts, then the final label
/// with its remedies and exercises.
pub struct DiagnosisCard<'a>(pub &'a Diagnosis);

impl fmt::Display for DiagnosisCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        writeln!(f, "=== {} ===", d.final_label)?;
        writeln!(
            f,
            "{} of {} models agree",
            d.vote_count(),
            d.per_model.len()
        )?;
        writeln!(f)?;

        writeln!(f, "Predictions")?;
        for (model, verdict) in d.per_model.iter() {
            writeln!(
                f,
                "  {:<26} {:<20} {:>6.2}%",
                model, verdict.label, verdict.confidence
            )?;
        }
        writeln!(f)?;

        write_list(f, "Remedies", &d.remedies)?;
        write_list(f, "Exercises", &d.exercises)
    }
}

/// Remedies and exercises for a single label.
pub struct RemedyCard<'a> {
    pub label: &'a str,
    pub recommendations: &'a Recommendations,
}

impl fmt::Display for RemedyCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.label)?;
        if self.recommendations.is_empty() {
            return writeln!(f, "(no remedies on record)");
        }
        writeln!(f)?;
        write_list(f, "Remedies", &self.recommendations.remedies)?;
        write_list(f, "Exercises", &self.recommendations.exercises)
    }
}

/// Ensemble members in vote order.
pub struct ModelTable<'a>(pub &'a ClassifierEnsemble);

impl fmt::Display for ModelTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, classifier) in self.0.iter() {
            let dim = classifier
                .input_dim()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            writeln!(
                f,
                "  {:<26} {:<20} dim {}",
                name,
                classifier.kind().as_str(),
                dim
            )?;
        }
        Ok(())
    }
}

/// History entries, one per line, newest first.
pub struct HistoryTable<'a>(pub &'a [HistoryEntry]);

impl fmt::Display for HistoryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "(no diagnoses recorded)");
        }
        for entry in self.0 {
            let when = entry.recorded_at.with_timezone(&Local);
            writeln!(
                f,
                "  {}  {:<12} {:<20} {}",
                when.format("%Y-%m-%d %H:%M"),
                entry.subject.as_deref().unwrap_or("-"),
                entry.disease,
                entry.symptoms.join(", ")
            )?;
        }
        Ok(())
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, header: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{header}")?;
    for item in items.iter().take(MAX_LIST_ITEMS) {
        writeln!(f, "  - {item}")?;
    }
    if items.len() > MAX_LIST_ITEMS {
        writeln!(f, "  ... and {} more", items.len() - MAX_LIST_ITEMS)?;
    }
    writeln!(f)
}
