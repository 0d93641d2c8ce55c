use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::db::Database;
use crate::error::ApiError;
use crate::rating::aggregate::Standing;
use crate::rating::season::SeasonWindow;
use crate::rating::ScoringRules;

mod archives;
mod badges;
mod games;
mod intake;
mod pages;
mod teams;
mod transfer;

/// Uploads (CSV files, team logos) larger than this are rejected
const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub rules: ScoringRules,
    pub club_name: String,
    /// Served under `/static`; team logos live in `logos/` below it
    pub static_dir: PathBuf,
    pub season: SeasonWindow,
}

type SharedState = Arc<AppState>;

/// Build the Axum router for the whole site.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(pages::index_handler))
        .route("/api/config", get(config_handler))
        // individual and tournament ledgers
        .route("/api/games", get(games::list_individual).post(games::create_individual))
        .route("/api/games/:id", delete(games::delete_individual))
        .route(
            "/api/tournament_games",
            get(games::list_tournament).post(games::create_tournament),
        )
        .route("/api/tournament_games/:id", delete(games::delete_tournament))
        .route("/api/admin/reset_games", post(games::reset_individual))
        .route("/api/admin/reset_tournament", post(games::reset_tournament))
        .route("/api/ranking", get(games::individual_ranking))
        .route("/api/tournament_ranking", get(games::tournament_ranking))
        .route("/api/season_ranking", get(games::season_ranking))
        .route("/api/players/:name/stats", get(games::player_stats))
        .route("/api/players/:name/history", get(games::player_history))
        .route("/api/points", post(games::table_points))
        // badges
        .route("/api/badges", get(badges::list_badges).post(badges::create_badge))
        .route("/api/badges/:id", delete(badges::delete_badge))
        .route(
            "/api/player_badges",
            get(badges::list_grants).post(badges::grant_badge),
        )
        .route("/api/player_badges/:id", delete(badges::revoke_badge))
        .route(
            "/api/player_badges/by_player/:name",
            get(badges::list_grants_for_player),
        )
        // archives
        .route("/api/archives", get(archives::list_archives))
        .route("/api/archives/:id", delete(archives::delete_archive))
        .route("/api/archives/:id/games", get(archives::archive_games))
        .route("/api/archives/:id/ranking", get(archives::archive_ranking))
        .route("/admin/archive_import", post(archives::import_archive))
        // teams
        .route("/api/teams", get(teams::list_teams).post(teams::create_team))
        .route("/api/teams/:id", put(teams::update_team).delete(teams::delete_team))
        .route("/api/teams/:id/logo", post(teams::upload_logo))
        .route("/api/teams/:id/members", post(teams::add_member))
        .route("/api/team_members/:id", delete(teams::remove_member))
        .route(
            "/api/team_games",
            get(teams::list_team_games).post(teams::create_team_game),
        )
        .route("/api/team_games/:id", delete(teams::delete_team_game))
        .route("/api/team_ranking", get(teams::team_ranking))
        .route("/api/team_personal_ranking", get(teams::team_personal_ranking))
        // CSV transfer
        .route("/export", get(transfer::export_individual))
        .route("/export_tournament", get(transfer::export_tournament))
        .route("/export_badges", get(transfer::export_badges))
        .route("/export_player_badges", get(transfer::export_player_badges))
        .route(
            "/import",
            get(pages::import_games_form).post(transfer::import_individual),
        )
        .route(
            "/import_tournament",
            get(pages::import_tournament_form).post(transfer::import_tournament),
        )
        .route(
            "/import_badges",
            get(pages::import_badges_form).post(transfer::import_badges),
        )
        .route(
            "/import_player_badges",
            get(pages::import_player_badges_form).post(transfer::import_player_badges),
        )
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /api/config
async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "club_name": state.club_name,
        "uma": state.rules.uma,
        "return_score": state.rules.return_score,
        "table_total": state.rules.table_total,
        "season": state.season,
    }))
}

// ── Shared handler helpers ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankingQuery {
    pub min_games: Option<u32>,
}

impl RankingQuery {
    fn apply(&self, mut standings: Vec<Standing>) -> Vec<Standing> {
        if let Some(min) = self.min_games {
            standings.retain(|s| s.games >= min);
        }
        standings
    }
}

fn ok_response() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

fn created(id: i64) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=cp949".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

/// Collect multipart fields by name. Parts submitted with an empty file
/// name (a file input left blank) are skipped.
async fn read_form(mut multipart: Multipart) -> Result<HashMap<String, Vec<u8>>, ApiError> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let blank_file = field.file_name() == Some("");
        let data = field.bytes().await?;
        if !blank_file {
            fields.insert(name, data.to_vec());
        }
    }
    Ok(fields)
}


#[cfg(test)]
mod tests {
    use super::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn config_exposes_house_rules() {
        let app = TestApp::new();
        let (status, body) = app.get_json("/api/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["club_name"], "마당");
        assert_eq!(body["uma"], serde_json::json!([50.0, 10.0, -10.0, -30.0]));
        assert_eq!(body["return_score"], 30_000);
        assert_eq!(body["table_total"], 100_000);
        assert_eq!(body["season"]["marker"], "대회");
    }
}
