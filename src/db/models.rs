use serde::{Deserialize, Serialize};

use crate::rating::aggregate::LabeledTable;
use crate::rating::SEATS;

/// Which game ledger a record belongs to. Both share one schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Individual,
    Tournament,
}

impl GameKind {
    pub fn table(self) -> &'static str {
        match self {
            GameKind::Individual => "games",
            GameKind::Tournament => "tournament_games",
        }
    }

    pub fn export_filename(self) -> &'static str {
        match self {
            GameKind::Individual => "madang_majhong_rating.csv",
            GameKind::Tournament => "madang_mahjong_tournament.csv",
        }
    }
}

/// A stored four-player game (individual, tournament or archived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: i64,
    /// Local time, `YYYY-MM-DDTHH:MM` for games entered through the API
    pub created_at: String,
    pub player1_name: String,
    pub player2_name: String,
    pub player3_name: String,
    pub player4_name: String,
    pub player1_score: i64,
    pub player2_score: i64,
    pub player3_score: i64,
    pub player4_score: i64,
}

impl GameRecord {
    pub fn names(&self) -> [&str; SEATS] {
        [
            &self.player1_name,
            &self.player2_name,
            &self.player3_name,
            &self.player4_name,
        ]
    }

    pub fn scores(&self) -> [i64; SEATS] {
        [
            self.player1_score,
            self.player2_score,
            self.player3_score,
            self.player4_score,
        ]
    }

    /// The table labelled by player name
    pub fn by_player(&self) -> LabeledTable<'_> {
        let [a, b, c, d] = self.names();
        LabeledTable {
            labels: [Some(a), Some(b), Some(c), Some(d)],
            scores: self.scores(),
        }
    }
}

/// A validated game ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub created_at: String,
    pub names: [String; SEATS],
    pub scores: [i64; SEATS],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    /// Club-assigned unique number
    pub code: i64,
    pub name: String,
    pub grade: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBadge {
    pub code: i64,
    pub name: String,
    pub grade: String,
    pub description: String,
}

/// A badge granted to a player, joined with the badge definition.
/// Definition fields are empty when the badge has since been removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBadge {
    pub id: i64,
    pub player_name: String,
    pub badge_code: i64,
    /// Same as `badge_code`; older clients read this name
    pub code: i64,
    pub granted_at: String,
    pub name: String,
    pub grade: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayerBadge {
    pub player_name: String,
    pub badge_code: i64,
    pub granted_at: String,
}

/// A closed season (or one-off event) snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub game_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    /// URL path of the uploaded logo, e.g. `/static/logos/team_3.png`
    pub logo: Option<String>,
    pub created_at: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub player_name: String,
    pub joined_at: String,
}

/// One seat of a team game as submitted
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSeat {
    pub team_id: Option<i64>,
    pub name: Option<String>,
    pub score: i64,
}

/// A stored team game with team names resolved.
/// `playerN_team_name` is `None` when the team was deleted or never set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameRecord {
    pub id: i64,
    pub created_at: String,
    pub player1_team_id: Option<i64>,
    pub player1_name: Option<String>,
    pub player1_score: Option<i64>,
    pub player2_team_id: Option<i64>,
    pub player2_name: Option<String>,
    pub player2_score: Option<i64>,
    pub player3_team_id: Option<i64>,
    pub player3_name: Option<String>,
    pub player3_score: Option<i64>,
    pub player4_team_id: Option<i64>,
    pub player4_name: Option<String>,
    pub player4_score: Option<i64>,
    pub player1_team_name: Option<String>,
    pub player2_team_name: Option<String>,
    pub player3_team_name: Option<String>,
    pub player4_team_name: Option<String>,
}

impl TeamGameRecord {
    /// Seat scores; a missing score counts as zero
    pub fn scores(&self) -> [i64; SEATS] {
        [
            self.player1_score.unwrap_or(0),
            self.player2_score.unwrap_or(0),
            self.player3_score.unwrap_or(0),
            self.player4_score.unwrap_or(0),
        ]
    }

    pub fn by_team(&self) -> LabeledTable<'_> {
        LabeledTable {
            labels: [
                self.player1_team_name.as_deref(),
                self.player2_team_name.as_deref(),
                self.player3_team_name.as_deref(),
                self.player4_team_name.as_deref(),
            ],
            scores: self.scores(),
        }
    }

    pub fn by_player(&self) -> LabeledTable<'_> {
        LabeledTable {
            labels: [
                self.player1_name.as_deref(),
                self.player2_name.as_deref(),
                self.player3_name.as_deref(),
                self.player4_name.as_deref(),
            ],
            scores: self.scores(),
        }
    }
}
