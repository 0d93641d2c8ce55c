//! CSV downloads, encoded as CP949 for spreadsheet tools.

use super::encode_cp949;
use crate::db::models::{Badge, GameRecord, PlayerBadge};
use crate::error::TransferError;
use crate::rating::{ScoringRules, TableOutcome};

pub const BADGES_FILENAME: &str = "badges.csv";
pub const PLAYER_BADGES_FILENAME: &str = "player_badges.csv";

const GAME_HEADER: [&str; 14] = [
    "ID", "시간", "P1 이름", "P1 점수", "P1 pt", "P2 이름", "P2 점수", "P2 pt", "P3 이름",
    "P3 점수", "P3 pt", "P4 이름", "P4 점수", "P4 pt",
];

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, TransferError> {
    let utf8 = writer
        .into_inner()
        .map_err(|e| TransferError::Csv(e.into_error().into()))?;
    Ok(encode_cp949(&String::from_utf8_lossy(&utf8)))
}

/// Games in the given order with each seat's point to one decimal.
pub fn games_csv(rules: &ScoringRules, games: &[GameRecord]) -> Result<Vec<u8>, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(GAME_HEADER)?;

    for game in games {
        let scores = game.scores();
        let outcome = TableOutcome::for_scores(rules, scores);
        let mut record = vec![game.id.to_string(), game.created_at.clone()];
        for (seat, name) in game.names().into_iter().enumerate() {
            record.push(name.to_string());
            record.push(scores[seat].to_string());
            record.push(format!("{:.1}", outcome.points[seat]));
        }
        writer.write_record(&record)?;
    }
    finish(writer)
}

pub fn badges_csv(badges: &[Badge]) -> Result<Vec<u8>, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["code", "name", "grade", "description"])?;
    for badge in badges {
        writer.write_record([
            badge.code.to_string().as_str(),
            badge.name.as_str(),
            badge.grade.as_str(),
            badge.description.as_str(),
        ])?;
    }
    finish(writer)
}

pub fn player_badges_csv(grants: &[PlayerBadge]) -> Result<Vec<u8>, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "player_name",
        "badge_code",
        "granted_at",
        "badge_name",
        "badge_grade",
        "badge_description",
    ])?;
    for grant in grants {
        writer.write_record([
            grant.player_name.as_str(),
            grant.badge_code.to_string().as_str(),
            grant.granted_at.as_str(),
            grant.name.as_str(),
            grant.grade.as_str(),
            grant.description.as_str(),
        ])?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{decode_text, import::parse_games, read_rows, TextEncoding};

    fn record(id: i64, names: [&str; 4], scores: [i64; 4]) -> GameRecord {
        GameRecord {
            id,
            created_at: "2025-03-01T19:30".into(),
            player1_name: names[0].into(),
            player2_name: names[1].into(),
            player3_name: names[2].into(),
            player4_name: names[3].into(),
            player1_score: scores[0],
            player2_score: scores[1],
            player3_score: scores[2],
            player4_score: scores[3],
        }
    }

    #[test]
    fn game_export_has_points_per_seat() {
        let games = vec![record(7, ["김", "lee", "park", "choi"], [40_000, 30_000, 20_000, 10_000])];
        let bytes = games_csv(&ScoringRules::default(), &games).unwrap();
        let (text, encoding) = decode_text(&bytes).unwrap();
        assert_eq!(encoding, TextEncoding::Cp949);

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,시간,P1 이름,P1 점수,P1 pt,P2 이름,P2 점수,P2 pt,P3 이름,P3 점수,P3 pt,P4 이름,P4 점수,P4 pt")
        );
        assert_eq!(
            lines.next(),
            Some("7,2025-03-01T19:30,김,40000,60.0,lee,30000,10.0,park,20000,-20.0,choi,10000,-50.0")
        );
    }

    #[test]
    fn exported_games_import_back() {
        let games = vec![
            record(1, ["kim", "lee", "park", "choi"], [45_500, 30_000, 14_500, 10_000]),
            record(2, ["a", "b", "c", "d"], [25_000, 25_000, 25_000, 25_000]),
        ];
        let bytes = games_csv(&ScoringRules::default(), &games).unwrap();
        let (text, _) = decode_text(&bytes).unwrap();
        let parsed = parse_games(&read_rows(&text).unwrap(), "unused");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].scores, games[0].scores());
        assert_eq!(parsed[1].names[3], "d");
    }

    #[test]
    fn badge_exports() {
        let badges = vec![Badge {
            id: 1,
            code: 3,
            name: "역만".into(),
            grade: "gold".into(),
            description: "a, b".into(),
        }];
        let (text, _) = decode_text(&badges_csv(&badges).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["code,name,grade,description", "3,역만,gold,\"a, b\""]);

        let grants = vec![PlayerBadge {
            id: 1,
            player_name: "kim".into(),
            badge_code: 9,
            code: 9,
            granted_at: "2025-01-01T00:00".into(),
            name: String::new(),
            grade: String::new(),
            description: String::new(),
        }];
        let (text, _) = decode_text(&player_badges_csv(&grants).unwrap()).unwrap();
        assert_eq!(text.lines().last(), Some("kim,9,2025-01-01T00:00,,,"));
    }
}
