//! Season score: a bounded blend of a player's point total, activity, and
//! monthly tournament results.
//!
//! ```text
//! total      = 500 · (2/π) · atan(total_pt / 250)
//! games      = 200 · (1 − 0.95^games)
//! tournament = min(joins, 3) · 50 + 150 · (1 − 0.995^max(pt_sum, 0))
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use super::aggregate::{LabeledTable, Standing};
use super::{serialize_round1, ScoringRules, TableOutcome, SEATS};

/// Minimum individual games before a player enters the season ranking.
pub const SEASON_MIN_GAMES: u32 = 4;

const MAX_COUNTED_JOINS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonScore {
    #[serde(serialize_with = "serialize_round1")]
    pub total: f64,
    #[serde(serialize_with = "serialize_round1")]
    pub games: f64,
    #[serde(serialize_with = "serialize_round1")]
    pub tournament: f64,
    #[serde(serialize_with = "serialize_round1")]
    pub sum: f64,
}

pub fn season_score(
    total_point: f64,
    games: u32,
    tournament_joins: u32,
    tournament_point_sum: f64,
) -> SeasonScore {
    let total = 500.0 * (2.0 / PI) * (total_point / 250.0).atan();
    let games = 200.0 * (1.0 - 0.95f64.powf(f64::from(games)));
    let tournament = f64::from(tournament_joins.min(MAX_COUNTED_JOINS)) * 50.0
        + 150.0 * (1.0 - 0.995f64.powf(tournament_point_sum.max(0.0)));
    SeasonScore {
        total,
        games,
        tournament,
        sum: total + games + tournament,
    }
}

/// Which archived events count towards the current season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonWindow {
    /// Calendar year; archive names may carry it as `2025` or `25`
    pub year: u32,
    pub from_month: u32,
    pub to_month: u32,
    /// Substring that marks an archive as a tournament
    pub marker: String,
}

impl SeasonWindow {
    pub fn contains(&self, archive_name: &str) -> bool {
        if !archive_name.contains(&self.marker) {
            return false;
        }
        match archive_month(archive_name) {
            Some((year, month)) => {
                year == self.year % 100 && (self.from_month..=self.to_month).contains(&month)
            }
            None => false,
        }
    }
}

/// Find the first `YY월`-style stamp in an archive name.
///
/// Accepts an optional `20` century prefix, then two year digits, an
/// optional `-` or `년` separator with surrounding whitespace, one or two
/// month digits and `월`. Returns the two-digit year and the month.
pub fn archive_month(name: &str) -> Option<(u32, u32)> {
    let chars: Vec<char> = name.chars().collect();
    (0..chars.len()).find_map(|start| {
        let with_century = chars[start..].starts_with(&['2', '0']);
        with_century
            .then(|| match_at(&chars, start + 2))
            .flatten()
            .or_else(|| match_at(&chars, start))
    })
}

fn match_at(chars: &[char], mut i: usize) -> Option<(u32, u32)> {
    let digit = |i: usize| chars.get(i).and_then(|c| c.to_digit(10));
    let skip_space = |mut i: usize| {
        while chars.get(i).is_some_and(|c| c.is_whitespace()) {
            i += 1;
        }
        i
    };

    let year = digit(i)? * 10 + digit(i + 1)?;
    i = skip_space(i + 2);
    if matches!(chars.get(i), Some('-' | '년')) {
        i += 1;
    }
    i = skip_space(i);

    let mut month = digit(i)?;
    i += 1;
    if let Some(d) = digit(i) {
        month = month * 10 + d;
        i += 1;
    }
    i = skip_space(i);
    (chars.get(i) == Some(&'월')).then_some((year, month))
}

/// Tournament participation of one player over the season's archives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentTally {
    /// Distinct archives the player appeared in
    pub joins: u32,
    /// Sum of positive points only
    pub point_sum: f64,
}

/// Tally tournament results per player; each inner list is one archive.
pub fn tournament_tallies(
    rules: &ScoringRules,
    archives: &[Vec<LabeledTable<'_>>],
) -> HashMap<String, TournamentTally> {
    let mut tallies: HashMap<String, TournamentTally> = HashMap::new();

    for tables in archives {
        let mut appeared: HashSet<&str> = HashSet::new();
        for table in tables {
            let outcome = TableOutcome::for_scores(rules, table.scores);
            for seat in 0..SEATS {
                let Some(name) = table.labels[seat].map(str::trim).filter(|n| !n.is_empty()) else {
                    continue;
                };
                tallies.entry(name.to_string()).or_default().point_sum +=
                    outcome.points[seat].max(0.0);
                appeared.insert(name);
            }
        }
        for name in appeared {
            if let Some(tally) = tallies.get_mut(name) {
                tally.joins += 1;
            }
        }
    }
    tallies
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStanding {
    pub name: String,
    pub games: u32,
    #[serde(rename = "total_pt", serialize_with = "serialize_round1")]
    pub total_point: f64,
    pub tournament_joins: u32,
    #[serde(rename = "tournament_pt_sum", serialize_with = "serialize_round1")]
    pub tournament_point_sum: f64,
    pub score: SeasonScore,
}

/// Rank players with at least `min_games` individual games by season score.
pub fn season_ranking(
    standings: &[Standing],
    tallies: &HashMap<String, TournamentTally>,
    min_games: u32,
) -> Vec<SeasonStanding> {
    let mut ranking: Vec<SeasonStanding> = standings
        .iter()
        .filter(|s| s.games >= min_games)
        .map(|s| {
            let tally = tallies.get(&s.name).cloned().unwrap_or_default();
            SeasonStanding {
                name: s.name.clone(),
                games: s.games,
                total_point: s.total_point,
                tournament_joins: tally.joins,
                tournament_point_sum: tally.point_sum,
                score: season_score(s.total_point, s.games, tally.joins, tally.point_sum),
            }
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.score
            .sum
            .total_cmp(&a.score.sum)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranking
}
