//! Majority vote over per-classifier labels.
//!
//! The label with the most votes wins. Ties go to the tied label that appears
//! first in ensemble declaration order; the tally never depends on hash or
//! set iteration order, so the result is reproducible across runs.

/// Outcome of a majority vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub label: String,
    /// Votes received by `label`.
    pub votes: usize,
    /// Total votes cast.
    pub total: usize,
    /// Whether another label received the same number of votes.
    pub tied: bool,
}

impl VoteOutcome {
    pub fn is_unanimous(&self) -> bool {
        self.votes == self.total
    }

    /// Share of votes for the winning label (0.0 to 1.0).
    pub fn agreement(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.votes as f64 / self.total as f64
        }
    }
}

/// Tally `labels` (in ensemble order) and pick the majority label.
///
/// Returns `None` only for an empty input.
pub fn majority_vote<'a, I>(labels: I) -> Option<VoteOutcome>
where
    I: IntoIterator<Item = &'a str>,
{
    // (label, count) in first-seen order.
    let mut tally: Vec<(&str, usize)> = Vec::new();
    let mut total = 0usize;
    for label in labels {
        total += 1;
        match tally.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => tally.push((label, 1)),
        }
    }

    let mut winner: Option<(&str, usize)> = None;
    for &(label, count) in &tally {
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((label, count)),
        }
    }

    winner.map(|(label, votes)| VoteOutcome {
        label: label.to_string(),
        votes,
        total,
        tied: tally.iter().filter(|(_, c)| *c == votes).count() > 1,
    })
}

/// Final label for `labels`, `None` for an empty input.
pub fn aggregate<'a, I>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    majority_vote(labels).map(|outcome| outcome.label)
}
