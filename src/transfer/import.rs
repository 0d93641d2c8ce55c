//! Row interpretation for uploaded CSV documents.
//!
//! Headers are matched by alias so that both our own exports (Korean
//! headers) and hand-made sheets with column names like `player1_name`
//! are accepted.

use super::CsvRow;
use crate::db::models::{NewBadge, NewGame, NewPlayerBadge};
use crate::rating::SEATS;

const CREATED_AT: &[&str] = &["created_at", "시간"];

const NAME_COLUMNS: [&[&str]; SEATS] = [
    &["player1_name", "P1 이름", "P1이름"],
    &["player2_name", "P2 이름", "P2이름"],
    &["player3_name", "P3 이름", "P3이름"],
    &["player4_name", "P4 이름", "P4이름"],
];

const SCORE_COLUMNS: [&[&str]; SEATS] = [
    &["player1_score", "P1 점수", "P1점수"],
    &["player2_score", "P2 점수", "P2점수"],
    &["player3_score", "P3 점수", "P3점수"],
    &["player4_score", "P4 점수", "P4점수"],
];

const BADGE_CODE: &[&str] = &["code", "코드"];
const BADGE_NAME: &[&str] = &["name", "이름"];
const BADGE_GRADE: &[&str] = &["grade", "등급"];
const BADGE_DESCRIPTION: &[&str] = &["description", "설명"];

const GRANT_PLAYER: &[&str] = &["player_name", "플레이어", "이름"];
const GRANT_CODE: &[&str] = &["badge_code", "code", "뱃지코드", "뱃지 코드"];
const GRANT_TIME: &[&str] = &["granted_at", "부여시각", "시간"];

/// Game rows; rows with four blank names are dropped and a missing time
/// becomes `now`. Scores are taken as-is, the table total is not checked.
pub fn parse_games(rows: &[CsvRow], now: &str) -> Vec<NewGame> {
    rows.iter()
        .filter_map(|row| {
            let names = NAME_COLUMNS.map(|aliases| row.pick_trimmed(aliases).to_string());
            if names.iter().all(String::is_empty) {
                return None;
            }
            let created_at = match row.pick_trimmed(CREATED_AT) {
                "" => now.to_string(),
                at => at.to_string(),
            };
            Some(NewGame {
                created_at,
                names,
                scores: SCORE_COLUMNS.map(|aliases| row.pick_int(aliases)),
            })
        })
        .collect()
}

/// Badge definitions; rows without a non-zero code, a name and a grade
/// are dropped.
pub fn parse_badges(rows: &[CsvRow]) -> Vec<NewBadge> {
    rows.iter()
        .filter_map(|row| {
            let code = row.pick_int(BADGE_CODE);
            let name = row.pick_trimmed(BADGE_NAME);
            let grade = row.pick_trimmed(BADGE_GRADE);
            if code == 0 || name.is_empty() || grade.is_empty() {
                return None;
            }
            Some(NewBadge {
                code,
                name: name.to_string(),
                grade: grade.to_string(),
                description: row.pick_trimmed(BADGE_DESCRIPTION).to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Default, PartialEq)]
pub struct GrantRows {
    pub grants: Vec<NewPlayerBadge>,
    /// Rows missing a player name or badge code
    pub invalid: usize,
}

/// Badge grants; a missing grant time becomes `now`.
pub fn parse_player_badges(rows: &[CsvRow], now: &str) -> GrantRows {
    let mut parsed = GrantRows::default();
    for row in rows {
        let player_name = row.pick_trimmed(GRANT_PLAYER);
        let badge_code = row.pick_int(GRANT_CODE);
        if player_name.is_empty() || badge_code == 0 {
            parsed.invalid += 1;
            continue;
        }
        let granted_at = match row.pick_trimmed(GRANT_TIME) {
            "" => now.to_string(),
            at => at.to_string(),
        };
        parsed.grants.push(NewPlayerBadge {
            player_name: player_name.to_string(),
            badge_code,
            granted_at,
        });
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::read_rows;

    const NOW: &str = "2025-04-01T12:00";

    #[test]
    fn games_from_exported_sheet() {
        let text = "ID,시간,P1 이름,P1 점수,P1 pt,P2 이름,P2 점수,P2 pt,P3 이름,P3 점수,P3 pt,P4 이름,P4 점수,P4 pt\n\
                    1,2025-03-01T19:30,kim,40000,60.0,lee,30000,10.0,park,20000,-20.0,choi,10000,-50.0\n\
                    2,,a,25000.5,0,b,25000,0,c,25000,0,d,24999,0\n\
                    3,2025-03-02T19:30,,,,,,,,,,,,\n";
        let games = parse_games(&read_rows(text).unwrap(), NOW);
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].created_at, "2025-03-01T19:30");
        assert_eq!(games[0].names, ["kim", "lee", "park", "choi"].map(String::from));
        assert_eq!(games[0].scores, [40_000, 30_000, 20_000, 10_000]);
        assert_eq!(games[1].created_at, NOW);
        assert_eq!(games[1].scores, [25_000, 25_000, 25_000, 24_999]);
    }

    #[test]
    fn games_from_english_headers_and_semicolons() {
        let text = "player1_name;player2_name;player3_name;player4_name;player1_score;player2_score;player3_score;player4_score\n\
                    kim;lee;;choi;50000;x;30000;20000\n";
        let games = parse_games(&read_rows(text).unwrap(), NOW);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].names[2], "");
        assert_eq!(games[0].scores, [50_000, 0, 30_000, 20_000]);
    }

    #[test]
    fn badges_need_code_name_and_grade() {
        let text = "code,name,grade,description\n\
                    1,First win, bronze ,\n\
                    0,Zero,gold,\n\
                    2,,gold,\n\
                    3,No grade,,\n\
                    4.0,Ten games,silver,Play ten games\n";
        let badges = parse_badges(&read_rows(text).unwrap());
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].grade, "bronze");
        assert_eq!(badges[1].code, 4);
        assert_eq!(badges[1].description, "Play ten games");
    }

    #[test]
    fn grants_count_invalid_rows() {
        let text = "플레이어,뱃지코드,부여시각\n\
                    kim,1,2025-01-01T00:00\n\
                    lee,2,\n\
                    ,3,2025-01-01T00:00\n\
                    park,abc,\n";
        let parsed = parse_player_badges(&read_rows(text).unwrap(), NOW);
        assert_eq!(parsed.invalid, 2);
        assert_eq!(parsed.grants.len(), 2);
        assert_eq!(parsed.grants[1].granted_at, NOW);
        assert_eq!(parsed.grants[0].badge_code, 1);
    }
}
