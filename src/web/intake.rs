//! Validation of game submissions from the entry forms.
//!
//! Fields arrive as loosely typed JSON (the browser forms send numbers,
//! numeric strings or nothing at all), so they are decoded as raw values
//! and checked here.

use serde::Deserialize;
use serde_json::Value;

use crate::db::models::{NewGame, TeamSeat};
use crate::error::ApiError;
use crate::rating::{ScoringRules, SEATS};

/// Integer view of a JSON value: integers as-is, floats truncated,
/// numeric strings parsed.
pub(crate) fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text view of a JSON value, trimmed; `null` reads as empty.
pub(crate) fn text_from_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn check_total(rules: &ScoringRules, scores: &[i64; SEATS]) -> Result<(), ApiError> {
    if rules.is_balanced(scores) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "total score must be {}",
            rules.table_total
        )))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GameSubmission {
    player1_name: Option<Value>,
    player2_name: Option<Value>,
    player3_name: Option<Value>,
    player4_name: Option<Value>,
    player1_score: Option<Value>,
    player2_score: Option<Value>,
    player3_score: Option<Value>,
    player4_score: Option<Value>,
}

impl GameSubmission {
    pub fn validate(self, rules: &ScoringRules, created_at: String) -> Result<NewGame, ApiError> {
        let (
            Some(n1),
            Some(n2),
            Some(n3),
            Some(n4),
            Some(s1),
            Some(s2),
            Some(s3),
            Some(s4),
        ) = (
            self.player1_name,
            self.player2_name,
            self.player3_name,
            self.player4_name,
            self.player1_score,
            self.player2_score,
            self.player3_score,
            self.player4_score,
        )
        else {
            return Err(ApiError::bad_request("missing fields"));
        };

        let names = [n1, n2, n3, n4].map(|n| text_from_value(&n));
        if names.iter().any(String::is_empty) {
            return Err(ApiError::bad_request("all player names required"));
        }

        let mut scores = [0i64; SEATS];
        for (slot, raw) in scores.iter_mut().zip([s1, s2, s3, s4]) {
            *slot = int_from_value(&raw)
                .ok_or_else(|| ApiError::bad_request("scores must be integers"))?;
        }
        check_total(rules, &scores)?;

        Ok(NewGame {
            created_at,
            names,
            scores,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeatSubmission {
    /// Number or numeric string; forms post the selected option's value
    #[serde(default)]
    team_id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    score: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamGameSubmission {
    player1: Option<SeatSubmission>,
    player2: Option<SeatSubmission>,
    player3: Option<SeatSubmission>,
    player4: Option<SeatSubmission>,
}

impl TeamGameSubmission {
    /// Seats may omit a team or a name; every seat needs an integer score.
    pub fn validate(self, rules: &ScoringRules) -> Result<[TeamSeat; SEATS], ApiError> {
        let (Some(p1), Some(p2), Some(p3), Some(p4)) =
            (self.player1, self.player2, self.player3, self.player4)
        else {
            return Err(ApiError::bad_request("missing fields"));
        };

        let mut seats = Vec::with_capacity(SEATS);
        for seat in [p1, p2, p3, p4] {
            let team_id = match seat.team_id {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s.trim().is_empty() => None,
                Some(raw) => Some(
                    int_from_value(&raw)
                        .ok_or_else(|| ApiError::bad_request("team_id must be integer"))?,
                ),
            };
            let score = seat
                .score
                .as_ref()
                .and_then(int_from_value)
                .ok_or_else(|| ApiError::bad_request("scores must be integers"))?;
            let name = seat
                .name
                .as_ref()
                .map(text_from_value)
                .filter(|n| !n.is_empty());
            seats.push(TeamSeat {
                team_id,
                name,
                score,
            });
        }
        let seats: [TeamSeat; SEATS] = seats
            .try_into()
            .map_err(|_| ApiError::bad_request("missing fields"))?;

        let scores = [seats[0].score, seats[1].score, seats[2].score, seats[3].score];
        check_total(rules, &scores)?;
        Ok(seats)
    }
}
