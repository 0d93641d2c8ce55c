//! Individual and tournament ledgers, their rankings and player detail.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::intake::GameSubmission;
use super::{created, ok_response, RankingQuery, SharedState};
use crate::db::models::GameKind;
use crate::db::timestamp_now;
use crate::error::ApiError;
use crate::rating::aggregate::{aggregate, Standing};
use crate::rating::player::{daily_history, player_detail, DailySnapshot, DatedTable, PlayerDetail};
use crate::rating::season::{self, SeasonStanding, SEASON_MIN_GAMES};
use crate::rating::{points_and_ranks, TableOutcome};

fn list(state: &SharedState, kind: GameKind) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_games(kind)?))
}

fn create(
    state: &SharedState,
    kind: GameKind,
    payload: Result<Json<GameSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let game = submission.validate(&state.rules, timestamp_now())?;
    let id = state.db.insert_game(kind, &game)?;
    Ok(created(id))
}

fn remove(state: &SharedState, kind: GameKind, id: i64) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_game(kind, id)? {
        return Err(ApiError::not_found("not found"));
    }
    info!("Deleted game {} from {}", id, kind.table());
    Ok(ok_response())
}

fn reset(state: &SharedState, kind: GameKind) -> Result<impl IntoResponse, ApiError> {
    let removed = state.db.reset_games(kind)?;
    info!("Reset {}: {} game(s) removed", kind.table(), removed);
    Ok(ok_response())
}

fn ranking(
    state: &SharedState,
    kind: GameKind,
    query: &RankingQuery,
) -> Result<Vec<Standing>, ApiError> {
    let games = state.db.list_games(kind)?;
    let standings = aggregate(&state.rules, games.iter().map(|g| g.by_player()));
    Ok(query.apply(standings))
}

/// GET /api/games
pub(super) async fn list_individual(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    list(&state, GameKind::Individual)
}

/// POST /api/games
pub(super) async fn create_individual(
    State(state): State<SharedState>,
    payload: Result<Json<GameSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    create(&state, GameKind::Individual, payload)
}

/// DELETE /api/games/:id
pub(super) async fn delete_individual(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&state, GameKind::Individual, id)
}

/// GET /api/tournament_games
pub(super) async fn list_tournament(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    list(&state, GameKind::Tournament)
}

/// POST /api/tournament_games
pub(super) async fn create_tournament(
    State(state): State<SharedState>,
    payload: Result<Json<GameSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    create(&state, GameKind::Tournament, payload)
}

/// DELETE /api/tournament_games/:id
pub(super) async fn delete_tournament(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    remove(&state, GameKind::Tournament, id)
}

/// POST /api/admin/reset_games
pub(super) async fn reset_individual(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    reset(&state, GameKind::Individual)
}

/// POST /api/admin/reset_tournament
pub(super) async fn reset_tournament(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    reset(&state, GameKind::Tournament)
}

/// GET /api/ranking?min_games=N
pub(super) async fn individual_ranking(
    State(state): State<SharedState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    ranking(&state, GameKind::Individual, &query).map(Json)
}

/// GET /api/tournament_ranking?min_games=N
pub(super) async fn tournament_ranking(
    State(state): State<SharedState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    ranking(&state, GameKind::Tournament, &query).map(Json)
}

#[derive(Debug, Deserialize)]
pub(super) struct PointsRequest {
    scores: Vec<i64>,
}

/// POST /api/points
///
/// Preview of the standard points a table would earn, without storing it.
pub(super) async fn table_points(
    State(state): State<SharedState>,
    payload: Result<Json<PointsRequest>, JsonRejection>,
) -> Result<Json<TableOutcome>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(points_and_ranks(&state.rules, &request.scores)?))
}

#[derive(Debug, Deserialize)]
pub(super) struct StatsQuery {
    kind: Option<GameKind>,
}

/// GET /api/players/:name/stats?kind=individual|tournament
pub(super) async fn player_stats(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<PlayerDetail>, ApiError> {
    let games = state
        .db
        .list_games_ascending(query.kind.unwrap_or(GameKind::Individual))?;
    let tables = games
        .iter()
        .map(|g| (g.created_at.as_str(), g.by_player()));
    Ok(Json(player_detail(&state.rules, &name, tables)))
}

/// GET /api/players/:name/history
///
/// Day-by-day point total, season score and ranks over both ledgers.
pub(super) async fn player_history(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DailySnapshot>>, ApiError> {
    let individual = state.db.list_games_ascending(GameKind::Individual)?;
    let tournament = state.db.list_games_ascending(GameKind::Tournament)?;
    let tables = individual
        .iter()
        .map(|g| (g, false))
        .chain(tournament.iter().map(|g| (g, true)))
        .map(|(g, tournament)| DatedTable {
            created_at: &g.created_at,
            table: g.by_player(),
            tournament,
        });
    Ok(Json(daily_history(&state.rules, &name, tables)))
}

/// GET /api/season_ranking
///
/// Players with enough individual games, scored on their individual
/// total plus the tournament archives that fall inside the season.
pub(super) async fn season_ranking(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SeasonStanding>>, ApiError> {
    let games = state.db.list_games(GameKind::Individual)?;
    let standings = aggregate(&state.rules, games.iter().map(|g| g.by_player()));

    let mut archived = Vec::new();
    for archive in state.db.list_archives()? {
        if state.season.contains(&archive.name) {
            archived.push(state.db.archive_games(archive.id)?);
        }
    }
    let tables: Vec<Vec<_>> = archived
        .iter()
        .map(|games| games.iter().map(|g| g.by_player()).collect())
        .collect();
    let tallies = season::tournament_tallies(&state.rules, &tables);

    Ok(Json(season::season_ranking(
        &standings,
        &tallies,
        SEASON_MIN_GAMES,
    )))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{game_body, TestApp};
    use crate::db::models::GameKind;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn create_list_and_delete_game() {
        let app = TestApp::new();
        let (status, body) = app
            .send_json(
                "POST",
                "/api/games",
                game_body(["kim", "lee", "park", "choi"], [40_000, 30_000, 20_000, 10_000]),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);

        let (_, games) = app.get_json("/api/games").await;
        assert_eq!(games.as_array().unwrap().len(), 1);
        assert_eq!(games[0]["player2_name"], "lee");

        let (status, _) = app.delete("/api/games/1").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.delete("/api/games/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");
    }

    #[tokio::test]
    async fn unbalanced_table_is_rejected() {
        let app = TestApp::new();
        let (status, body) = app
            .send_json(
                "POST",
                "/api/tournament_games",
                game_body(["kim", "lee", "park", "choi"], [40_000, 30_000, 20_000, 9_000]),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "total score must be 100000");

        let (_, games) = app.get_json("/api/tournament_games").await;
        assert!(games.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ranking_is_rounded_and_filterable() {
        let app = TestApp::new();
        for scores in [[40_000, 30_000, 20_000, 10_000], [33_333, 33_333, 23_334, 10_000]] {
            app.send_json("POST", "/api/games", game_body(["kim", "lee", "park", "choi"], scores))
                .await;
        }
        app.send_json(
            "POST",
            "/api/games",
            game_body(["kim", "lee", "park", "jung"], [25_000, 25_000, 25_000, 25_000]),
        )
        .await;

        let (status, ranking) = app.get_json("/api/ranking").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ranking[0]["name"], "kim");
        assert_eq!(ranking[0]["games"], 3);
        // 60 + 53.333 + 45
        assert_eq!(ranking[0]["total_pt"], 158.3);
        assert_eq!(ranking[0]["rank_counts"], json!([3, 0, 0, 0]));

        let (_, filtered) = app.get_json("/api/ranking?min_games=3").await;
        let names: Vec<&str> = filtered
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["kim", "lee", "park"]);
    }

    #[tokio::test]
    async fn points_preview() {
        let app = TestApp::new();
        let (status, body) = app
            .send_json("POST", "/api/points", json!({ "scores": [10000, 20000, 40000, 30000] }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ranks"], json!([4, 3, 1, 2]));
        assert_eq!(body["points"], json!([-50.0, -20.0, 60.0, 10.0]));

        let (status, body) = app
            .send_json("POST", "/api/points", json!({ "scores": [25000, 25000] }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid input: expected 4 scores, got 2");
    }

    #[tokio::test]
    async fn reset_restarts_the_ledger() {
        let app = TestApp::new();
        let body = game_body(["a", "b", "c", "d"], [25_000, 25_000, 25_000, 25_000]);
        app.send_json("POST", "/api/games", body.clone()).await;
        let (status, _) = app.send_json("POST", "/api/admin/reset_games", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (_, created) = app.send_json("POST", "/api/games", body).await;
        assert_eq!(created["id"], 1);
    }

    #[tokio::test]
    async fn player_stats_by_ledger() {
        let app = TestApp::new();
        app.send_json(
            "POST",
            "/api/tournament_games",
            game_body(["kim", "lee", "park", "choi"], [-5_000, 60_000, 25_000, 20_000]),
        )
        .await;

        let (_, detail) = app.get_json("/api/players/kim/stats?kind=tournament").await;
        assert_eq!(detail["games"], 1);
        assert_eq!(detail["bust_count"], 1);
        assert_eq!(detail["recent"][0]["rank"], 4);
        assert_eq!(detail["co_players"].as_array().unwrap().len(), 3);

        let (_, detail) = app.get_json("/api/players/kim/stats").await;
        assert_eq!(detail["games"], 0);
    }

    #[tokio::test]
    async fn season_ranking_counts_tournament_archives() {
        let app = TestApp::new();
        for _ in 0..4 {
            app.send_json(
                "POST",
                "/api/games",
                game_body(["kim", "lee", "park", "choi"], [40_000, 30_000, 20_000, 10_000]),
            )
            .await;
        }
        let rows = vec![app_new_game(["choi", "lee", "park", "kim"])];
        app.state
            .db
            .create_archive("2025년 3월 대회", "2025-03-31T22:00", &rows)
            .unwrap();
        app.state
            .db
            .create_archive("2025년 9월 대회", "2025-09-30T22:00", &rows)
            .unwrap();

        let (status, ranking) = app.get_json("/api/season_ranking").await;
        assert_eq!(status, StatusCode::OK);
        let choi = ranking
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == "choi")
            .unwrap();
        assert_eq!(choi["tournament_joins"], 1);
        assert_eq!(choi["tournament_pt_sum"], 60.0);
        assert_eq!(ranking.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn player_history_spans_both_ledgers() {
        let app = TestApp::new();
        let dated = |created_at: &str, names: [&str; 4]| crate::db::models::NewGame {
            created_at: created_at.into(),
            ..app_new_game(names)
        };
        let db = &app.state.db;
        db.insert_game(GameKind::Individual, &dated("2025-03-01T19:00", ["kim", "lee", "park", "choi"]))
            .unwrap();
        db.insert_game(GameKind::Tournament, &dated("2025-03-02T18:00", ["jung", "lee", "park", "choi"]))
            .unwrap();
        db.insert_game(GameKind::Individual, &dated("2025-03-02T23:30", ["lee", "park", "kim", "choi"]))
            .unwrap();

        let (status, history) = app.get_json("/api/players/lee/history").await;
        assert_eq!(status, StatusCode::OK);
        let days = history.as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["date"], "2025-03-01");
        assert_eq!(days[0]["total_pt"], 10.0);
        assert_eq!(days[0]["pt_rank"], 2);
        assert_eq!(days[1]["date"], "2025-03-02");
        assert_eq!(days[1]["total_pt"], 70.0);
        assert_eq!(days[1]["pt_rank"], 1);
        assert_eq!(days[1]["total_players"], 5);

        let (_, history) = app.get_json("/api/players/jung/history").await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        let (_, history) = app.get_json("/api/players/nobody/history").await;
        assert!(history.as_array().unwrap().is_empty());
    }

    fn app_new_game(names: [&str; 4]) -> crate::db::models::NewGame {
        crate::db::models::NewGame {
            created_at: "2025-03-31T20:00".into(),
            names: names.map(String::from),
            scores: [40_000, 30_000, 20_000, 10_000],
        }
    }
}
