//! Per-label standings accumulated over many tables.
//!
//! A label is whatever identifies a seat's owner for the ranking at hand:
//! a team name for the team ranking, a player name for the personal ones.

use serde::Serialize;
use std::collections::HashMap;

use super::{serialize_round1, ScoringRules, TableOutcome, SEATS};

/// One table's scores with an optional owner label per seat.
#[derive(Debug, Clone, Copy)]
pub struct LabeledTable<'a> {
    pub labels: [Option<&'a str>; SEATS],
    pub scores: [i64; SEATS],
}

/// Accumulated results for one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub name: String,
    pub games: u32,
    #[serde(rename = "total_pt", serialize_with = "serialize_round1")]
    pub total_point: f64,
    #[serde(rename = "avg_pt", serialize_with = "serialize_round1")]
    pub average_point: f64,
    /// Occurrences of 1st..4th place
    pub rank_counts: [u32; SEATS],
    /// Share of 1st and 2nd finishes, in percent
    #[serde(serialize_with = "serialize_round1")]
    pub top_two_rate: f64,
}

#[derive(Debug, Default)]
struct Tally {
    games: u32,
    total_point: f64,
    rank_counts: [u32; SEATS],
}

impl Tally {
    fn into_standing(self, name: &str) -> Standing {
        let (average_point, top_two_rate) = if self.games > 0 {
            let games = f64::from(self.games);
            (
                self.total_point / games,
                f64::from(self.rank_counts[0] + self.rank_counts[1]) * 100.0 / games,
            )
        } else {
            (0.0, 0.0)
        };
        Standing {
            name: name.to_string(),
            games: self.games,
            total_point: self.total_point,
            average_point,
            rank_counts: self.rank_counts,
            top_two_rate,
        }
    }
}

/// Aggregate tables into standings, best total first.
///
/// Seats whose label is missing or blank are skipped. Equal totals are
/// ordered by label ascending so the output is deterministic.
pub fn aggregate<'a, I>(rules: &ScoringRules, tables: I) -> Vec<Standing>
where
    I: IntoIterator<Item = LabeledTable<'a>>,
{
    let mut tallies: HashMap<&'a str, Tally> = HashMap::new();

    for table in tables {
        let outcome = TableOutcome::for_scores(rules, table.scores);
        for seat in 0..SEATS {
            let Some(label) = table.labels[seat].map(str::trim).filter(|l| !l.is_empty()) else {
                continue;
            };
            let tally = tallies.entry(label).or_default();
            tally.games += 1;
            tally.total_point += outcome.points[seat];
            tally.rank_counts[usize::from(outcome.ranks[seat] - 1)] += 1;
        }
    }

    let mut standings: Vec<Standing> = tallies
        .into_iter()
        .map(|(name, tally)| tally.into_standing(name))
        .collect();
    standings.sort_by(|a, b| {
        b.total_point
            .total_cmp(&a.total_point)
            .then_with(|| a.name.cmp(&b.name))
    });
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn table<'a>(labels: [Option<&'a str>; SEATS], scores: [i64; SEATS]) -> LabeledTable<'a> {
        LabeledTable { labels, scores }
    }

    #[test]
    fn team_in_first_seat_across_two_tables() {
        let tables = vec![
            table(
                [Some("A"), Some("B"), Some("C"), Some("D")],
                [40_000, 30_000, 20_000, 10_000],
            ),
            table(
                [Some("A"), Some("B"), Some("C"), Some("D")],
                [25_000, 45_000, 20_000, 10_000],
            ),
        ];
        let standings = aggregate(&ScoringRules::default(), tables);
        let a = standings.iter().find(|s| s.name == "A").unwrap();
        assert_eq!(a.games, 2);
        assert_eq!(a.rank_counts, [1, 1, 0, 0]);
        assert_relative_eq!(a.total_point, 60.0 + 5.0, epsilon = 1e-9);
        assert_relative_eq!(a.average_point, 32.5, epsilon = 1e-9);
        assert_relative_eq!(a.top_two_rate, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn blank_and_missing_labels_are_skipped() {
        let tables = vec![table(
            [Some("A"), None, Some(""), Some("   ")],
            [40_000, 30_000, 20_000, 10_000],
        )];
        let standings = aggregate(&ScoringRules::default(), tables);
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].name, "A");
    }

    #[test]
    fn labels_are_trimmed_before_grouping() {
        let tables = vec![table(
            [Some("A "), Some(" A"), Some("B"), Some("C")],
            [40_000, 30_000, 20_000, 10_000],
        )];
        let standings = aggregate(&ScoringRules::default(), tables);
        let a = standings.iter().find(|s| s.name == "A").unwrap();
        assert_eq!(a.games, 2);
    }

    #[test]
    fn sorted_by_total_then_name() {
        // B and C end level on points; B sorts first by name.
        let tables = vec![
            table(
                [Some("C"), Some("B"), Some("A"), Some("D")],
                [30_000, 30_000, 30_000, 10_000],
            ),
            table(
                [Some("B"), Some("C"), Some("A"), Some("D")],
                [30_000, 30_000, 30_000, 10_000],
            ),
        ];
        let standings = aggregate(&ScoringRules::default(), tables);
        let names: Vec<&str> = standings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A", "D"]);
        assert_relative_eq!(standings[0].total_point, standings[1].total_point);
    }

    #[test]
    fn empty_input_gives_no_standings() {
        assert!(aggregate(&ScoringRules::default(), Vec::new()).is_empty());
    }

    #[test]
    fn serialized_totals_are_rounded() {
        let standing = Standing {
            name: "A".into(),
            games: 3,
            total_point: 12.345,
            average_point: 4.115,
            rank_counts: [1, 1, 1, 0],
            top_two_rate: 66.6666,
        };
        let json = serde_json::to_value(&standing).unwrap();
        assert_eq!(json["total_pt"], 12.3);
        assert_eq!(json["avg_pt"], 4.1);
        assert_eq!(json["top_two_rate"], 66.7);
        assert_eq!(json["rank_counts"], serde_json::json!([1, 1, 1, 0]));
    }

    proptest! {
        #[test]
        fn histogram_sums_to_games(
            rows in prop::collection::vec(
                (prop::array::uniform4(0usize..4), prop::array::uniform4(-50_000i64..150_000)),
                0..40,
            )
        ) {
            const NAMES: [&str; 4] = ["east", "south", "west", "north"];
            let tables = rows.iter().map(|(picks, scores)| LabeledTable {
                labels: [
                    Some(NAMES[picks[0]]),
                    Some(NAMES[picks[1]]),
                    Some(NAMES[picks[2]]),
                    Some(NAMES[picks[3]]),
                ],
                scores: *scores,
            });
            let standings = aggregate(&ScoringRules::default(), tables);
            let mut seats = 0;
            for s in &standings {
                prop_assert_eq!(s.rank_counts.iter().sum::<u32>(), s.games);
                seats += s.games;
            }
            prop_assert_eq!(seats as usize, rows.len() * SEATS);
        }
    }
}
