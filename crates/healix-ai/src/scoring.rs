//! Confidence scoring from a classifier's distribution.

use crate::classifier::Distribution;

/// Confidence reported for classifiers without a distribution.
pub const DEFAULT_CONFIDENCE: f64 = 0.0;

/// Convert a distribution into a percentage confidence.
///
/// `100 × max(distribution)`, rounded to two decimals and clamped to
/// `[0, 100]`. An absent or empty distribution scores [`DEFAULT_CONFIDENCE`].
pub fn score(distribution: Option<&Distribution>) -> f64 {
    let Some(max) = distribution.and_then(Distribution::max) else {
        return DEFAULT_CONFIDENCE;
    };
    let pct = (max * 100.0).clamp(0.0, 100.0);
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(scores: &[f64]) -> Distribution {
        Distribution::new(
            scores
                .iter()
                .enumerate()
                .map(|(i, &p)| (format!("L{i}"), p))
                .collect(),
        )
    }

    #[test]
    fn absent_distribution_scores_default() {
        assert_eq!(score(None), 0.0);
        assert_eq!(score(Some(&Distribution::default())), 0.0);
    }

    #[test]
    fn max_probability_as_percentage() {
        assert_eq!(score(Some(&dist(&[0.05, 0.91, 0.04]))), 91.0);
        assert_eq!(score(Some(&dist(&[0.84, 0.16]))), 84.0);
        assert_eq!(score(Some(&dist(&[0.77]))), 77.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(score(Some(&dist(&[0.123456]))), 12.35);
        assert_eq!(score(Some(&dist(&[0.3333333]))), 33.33);
    }

    #[test]
    fn stays_within_percentage_bounds() {
        for scores in [vec![1.7], vec![0.0, 0.0], vec![-0.2], vec![f64::NAN, 0.5]] {
            let s = score(Some(&dist(&scores)));
            assert!((0.0..=100.0).contains(&s), "{scores:?} scored {s}");
        }
        assert_eq!(score(Some(&dist(&[1.7]))), 100.0);
    }
}
