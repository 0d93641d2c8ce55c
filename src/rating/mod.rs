//! Standard-point conversion for one four-player table.
//!
//! Every seat's raw score is converted as
//!
//!   pt = (score − return_score) / 1000 + uma[rank − 1]
//!
//! where the rank comes from a stable descending sort on score, so equal
//! scores resolve in seat order (seat 1 ahead of seat 2, and so on).
//! `uma` already includes the oka, which is why the shipped table
//! `[50, 10, -10, -30]` is not zero-sum.

pub mod aggregate;
pub mod player;
pub mod season;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::RatingError;

/// Number of seats at a table.
pub const SEATS: usize = 4;

/// House rules for converting raw scores into standard points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Rank bonus, index 0 = 1st place
    pub uma: [f64; SEATS],
    /// Score a player must return to break even
    pub return_score: i64,
    /// Required sum of the four raw scores; checked at intake only
    pub table_total: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            uma: [50.0, 10.0, -10.0, -30.0],
            return_score: 30_000,
            table_total: 100_000,
        }
    }
}

impl ScoringRules {
    /// Whether the four scores add up to the configured table total.
    /// A sum that overflows `i64` never balances.
    pub fn is_balanced(&self, scores: &[i64; SEATS]) -> bool {
        scores
            .iter()
            .try_fold(0i64, |sum, &score| sum.checked_add(score))
            == Some(self.table_total)
    }
}

/// Points and ranks for the four seats of one table, in seat order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableOutcome {
    pub points: [f64; SEATS],
    pub ranks: [u8; SEATS],
}

impl TableOutcome {
    pub fn for_scores(rules: &ScoringRules, scores: [i64; SEATS]) -> Self {
        let mut order = [0usize, 1, 2, 3];
        // sort_by is stable, so tied seats keep their positional order
        order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));

        let mut points = [0.0; SEATS];
        let mut ranks = [0u8; SEATS];
        for (position, &seat) in order.iter().enumerate() {
            ranks[seat] = position as u8 + 1;
            points[seat] =
                (scores[seat] as f64 - rules.return_score as f64) / 1000.0 + rules.uma[position];
        }
        Self { points, ranks }
    }
}

/// Convert a table's raw scores into standard points and ranks.
///
/// # Arguments
/// * `rules`  – Uma table and return score to apply.
/// * `scores` – Raw scores in seat order; must hold exactly four entries.
pub fn points_and_ranks(rules: &ScoringRules, scores: &[i64]) -> Result<TableOutcome, RatingError> {
    let scores: [i64; SEATS] = scores.try_into().map_err(|_| RatingError::InvalidInput {
        reason: format!("expected {} scores, got {}", SEATS, scores.len()),
    })?;
    Ok(TableOutcome::for_scores(rules, scores))
}

/// Round to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn serialize_round1<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round1(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    #[test]
    fn distinct_scores_follow_uma_by_rank() {
        let out = points_and_ranks(&rules(), &[40_000, 30_000, 20_000, 10_000]).unwrap();
        assert_eq!(out.ranks, [1, 2, 3, 4]);
        assert_eq!(out.points, [60.0, 10.0, -20.0, -50.0]);
        assert_relative_eq!(out.points.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn uma_follows_rank_not_seat() {
        let out = points_and_ranks(&rules(), &[10_000, 20_000, 40_000, 30_000]).unwrap();
        assert_eq!(out.ranks, [4, 3, 1, 2]);
        assert_eq!(out.points, [-50.0, -20.0, 60.0, 10.0]);
    }

    #[test]
    fn ties_go_to_the_earlier_seat() {
        let out = points_and_ranks(&rules(), &[25_000, 25_000, 25_000, 25_000]).unwrap();
        assert_eq!(out.ranks, [1, 2, 3, 4]);
        assert_eq!(out.points, [45.0, 5.0, -15.0, -35.0]);

        let out = points_and_ranks(&rules(), &[20_000, 35_000, 35_000, 10_000]).unwrap();
        assert_eq!(out.ranks, [3, 1, 2, 4]);
    }

    #[test]
    fn negative_scores_are_accepted() {
        let out = points_and_ranks(&rules(), &[70_000, 25_000, 8_000, -3_000]).unwrap();
        assert_eq!(out.ranks, [1, 2, 3, 4]);
        assert_relative_eq!(out.points[3], -63.0, epsilon = 1e-9);
    }

    #[test]
    fn wrong_arity_is_invalid_input() {
        let err = points_and_ranks(&rules(), &[25_000, 25_000, 50_000]).unwrap_err();
        assert!(matches!(err, RatingError::InvalidInput { .. }));
        assert!(points_and_ranks(&rules(), &[0; 5]).is_err());
    }

    #[test]
    fn alternate_house_rules_are_honoured() {
        let rules = ScoringRules {
            uma: [15.0, 5.0, -5.0, -15.0],
            return_score: 25_000,
            table_total: 100_000,
        };
        let out = points_and_ranks(&rules, &[40_000, 30_000, 20_000, 10_000]).unwrap();
        assert_eq!(out.points, [30.0, 10.0, -10.0, -30.0]);
    }

    #[test]
    fn overflowing_totals_are_unbalanced() {
        let rules = rules();
        assert!(rules.is_balanced(&[40_000, 30_000, 20_000, 10_000]));
        assert!(!rules.is_balanced(&[40_000, 30_000, 20_000, 9_000]));
        // wraps to exactly 100000 with unchecked addition
        assert!(!rules.is_balanced(&[i64::MAX, i64::MAX, 2, 100_000]));
        assert!(!rules.is_balanced(&[i64::MIN, -1, 0, 100_000]));
    }

    #[test]
    fn round1_presentation() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(-7.25), -7.3);
        assert_eq!(round1(0.05), 0.1);
    }

    proptest! {
        #[test]
        fn ranks_are_a_permutation(scores in prop::array::uniform4(-200_000i64..200_000)) {
            let out = TableOutcome::for_scores(&rules(), scores);
            let mut ranks = out.ranks;
            ranks.sort_unstable();
            prop_assert_eq!(ranks, [1, 2, 3, 4]);
        }

        #[test]
        fn higher_score_never_ranks_lower(scores in prop::array::uniform4(-200_000i64..200_000)) {
            let out = TableOutcome::for_scores(&rules(), scores);
            for a in 0..SEATS {
                for b in 0..SEATS {
                    if scores[a] > scores[b] || (scores[a] == scores[b] && a < b) {
                        prop_assert!(out.ranks[a] < out.ranks[b]);
                    }
                }
            }
        }

        #[test]
        fn points_sum_matches_closed_form(scores in prop::array::uniform4(-200_000i64..200_000)) {
            let r = rules();
            let out = TableOutcome::for_scores(&r, scores);
            let expected = (scores.iter().sum::<i64>() - 4 * r.return_score) as f64 / 1000.0
                + r.uma.iter().sum::<f64>();
            prop_assert!((out.points.iter().sum::<f64>() - expected).abs() < 1e-6);
        }

        #[test]
        fn calculation_is_repeatable(scores in prop::array::uniform4(-200_000i64..200_000)) {
            let first = TableOutcome::for_scores(&rules(), scores);
            let second = TableOutcome::for_scores(&rules(), scores);
            prop_assert_eq!(first.ranks, second.ranks);
            for seat in 0..SEATS {
                prop_assert_eq!(first.points[seat].to_bits(), second.points[seat].to_bits());
            }
        }
    }
}
