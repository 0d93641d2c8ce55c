//! Detailed record of a single player over a ledger.

use serde::Serialize;
use std::collections::HashMap;

use super::aggregate::LabeledTable;
use super::season::season_score;
use super::{serialize_round1, ScoringRules, TableOutcome, SEATS};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetail {
    pub name: String,
    pub games: u32,
    #[serde(rename = "total_pt", serialize_with = "serialize_round1")]
    pub total_point: f64,
    pub rank_counts: [u32; SEATS],
    #[serde(serialize_with = "serialize_round1")]
    pub top_two_rate: f64,
    /// Games finished below zero
    pub bust_count: u32,
    #[serde(serialize_with = "serialize_round1")]
    pub bust_rate: f64,
    /// Best raw score, 0 when the player has no games
    pub max_score: i64,
    /// Newest first
    pub recent: Vec<RecentRank>,
    pub co_players: Vec<CoPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRank {
    pub created_at: String,
    pub rank: u8,
}

/// Head-to-head summary against one opponent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoPlayer {
    pub name: String,
    pub games: u32,
    #[serde(serialize_with = "serialize_round1")]
    pub my_avg_rank: f64,
    #[serde(serialize_with = "serialize_round1")]
    pub co_avg_rank: f64,
}

#[derive(Default)]
struct Meeting {
    games: u32,
    my_rank_sum: u32,
    co_rank_sum: u32,
}

fn percent(count: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        f64::from(count) * 100.0 / f64::from(games)
    }
}

/// Build the detail for `name` from dated tables given oldest first.
///
/// Only tables where the player holds a seat count; when the same name
/// appears twice at one table the first seat is used.
pub fn player_detail<'a, I>(rules: &ScoringRules, name: &str, tables: I) -> PlayerDetail
where
    I: IntoIterator<Item = (&'a str, LabeledTable<'a>)>,
{
    let name = name.trim();
    let mut games = 0u32;
    let mut total_point = 0.0;
    let mut rank_counts = [0u32; SEATS];
    let mut bust_count = 0u32;
    let mut max_score: Option<i64> = None;
    let mut recent = Vec::new();
    let mut meetings: HashMap<&'a str, Meeting> = HashMap::new();

    for (created_at, table) in tables {
        let labels = table.labels.map(|l| l.map(str::trim).unwrap_or(""));
        let Some(me) = labels.iter().position(|l| *l == name) else {
            continue;
        };
        let outcome = TableOutcome::for_scores(rules, table.scores);
        let my_rank = outcome.ranks[me];
        let my_score = table.scores[me];

        games += 1;
        total_point += outcome.points[me];
        rank_counts[usize::from(my_rank - 1)] += 1;
        if my_score < 0 {
            bust_count += 1;
        }
        max_score = Some(max_score.map_or(my_score, |m| m.max(my_score)));
        recent.push(RecentRank {
            created_at: created_at.to_string(),
            rank: my_rank,
        });

        for (seat, other) in labels.iter().enumerate() {
            if seat == me || other.is_empty() {
                continue;
            }
            let meeting = meetings.entry(*other).or_default();
            meeting.games += 1;
            meeting.my_rank_sum += u32::from(my_rank);
            meeting.co_rank_sum += u32::from(outcome.ranks[seat]);
        }
    }
    recent.reverse();

    let mut co_players: Vec<CoPlayer> = meetings
        .into_iter()
        .map(|(other, m)| CoPlayer {
            name: other.to_string(),
            games: m.games,
            my_avg_rank: f64::from(m.my_rank_sum) / f64::from(m.games),
            co_avg_rank: f64::from(m.co_rank_sum) / f64::from(m.games),
        })
        .collect();
    co_players.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.name.cmp(&b.name)));

    PlayerDetail {
        name: name.to_string(),
        games,
        total_point,
        rank_counts,
        top_two_rate: percent(rank_counts[0] + rank_counts[1], games),
        bust_count,
        bust_rate: percent(bust_count, games),
        max_score: max_score.unwrap_or(0),
        recent,
        co_players,
    }
}

/// A table with its timestamp and the ledger it came from
#[derive(Debug, Clone, Copy)]
pub struct DatedTable<'a> {
    pub created_at: &'a str,
    pub table: LabeledTable<'a>,
    pub tournament: bool,
}

/// Where a player stood at the end of one playing day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySnapshot {
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(rename = "total_pt", serialize_with = "serialize_round1")]
    pub total_point: f64,
    #[serde(serialize_with = "serialize_round1")]
    pub season_score: f64,
    pub pt_rank: usize,
    pub season_rank: usize,
    pub total_players: usize,
}

#[derive(Default)]
struct RunningTotals {
    total_point: f64,
    games: u32,
    joins: u32,
    tournament_sum: f64,
}

impl RunningTotals {
    fn season_score(&self) -> f64 {
        season_score(self.total_point, self.games, self.joins, self.tournament_sum).sum
    }
}

fn day_of(created_at: &str) -> &str {
    created_at.get(..10).unwrap_or(created_at)
}

/// 1-based position of `name` when ordered by `key` descending, then name.
fn rank_by<F>(totals: &HashMap<&str, RunningTotals>, name: &str, key: F) -> usize
where
    F: Fn(&RunningTotals) -> f64,
{
    let mut order: Vec<(&str, f64)> = totals.iter().map(|(n, t)| (*n, key(t))).collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    order.iter().position(|(n, _)| *n == name).map_or(0, |i| i + 1)
}

/// Replay both ledgers in time order and record, for every day with games,
/// the player's running point total and season score and their ranks among
/// everyone seen so far.
///
/// Individual tables feed the point total and game count; tournament tables
/// count one join per seat and add the seat's points (negatives included) to
/// the tournament sum. Days before the player's first game are skipped.
pub fn daily_history<'a, I>(rules: &ScoringRules, name: &str, tables: I) -> Vec<DailySnapshot>
where
    I: IntoIterator<Item = DatedTable<'a>>,
{
    let name = name.trim();
    let mut tables: Vec<DatedTable<'a>> = tables.into_iter().collect();
    tables.sort_by(|a, b| a.created_at.cmp(b.created_at));

    let mut totals: HashMap<&'a str, RunningTotals> = HashMap::new();
    let mut history = Vec::new();
    let snapshot = |date: &str, totals: &HashMap<&'a str, RunningTotals>, history: &mut Vec<DailySnapshot>| {
        let Some(mine) = totals.get(name) else {
            return;
        };
        history.push(DailySnapshot {
            date: date.to_string(),
            total_point: mine.total_point,
            season_score: mine.season_score(),
            pt_rank: rank_by(totals, name, |t| t.total_point),
            season_rank: rank_by(totals, name, RunningTotals::season_score),
            total_players: totals.len(),
        });
    };

    let mut current: Option<&'a str> = None;
    for dated in &tables {
        let day = day_of(dated.created_at);
        if let Some(previous) = current.filter(|d| *d != day) {
            snapshot(previous, &totals, &mut history);
        }
        current = Some(day);

        let outcome = TableOutcome::for_scores(rules, dated.table.scores);
        for seat in 0..SEATS {
            let Some(player) = dated.table.labels[seat].map(str::trim).filter(|n| !n.is_empty()) else {
                continue;
            };
            let entry = totals.entry(player).or_default();
            if dated.tournament {
                entry.joins += 1;
                entry.tournament_sum += outcome.points[seat];
            } else {
                entry.total_point += outcome.points[seat];
                entry.games += 1;
            }
        }
    }
    if let Some(last) = current {
        snapshot(last, &totals, &mut history);
    }
    history
}
