use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use image::{imageops::FilterType, DynamicImage, ImageFormat};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::{Component, Path as FsPath, PathBuf};
use tracing::{info, warn};

use super::intake::{text_from_value, TeamGameSubmission};
use super::{created, ok_response, read_form, RankingQuery, SharedState};
use crate::db::timestamp_now;
use crate::error::ApiError;
use crate::rating::aggregate::{aggregate, Standing};

const LOGO_DIR: &str = "logos";
const LOGO_URL_PREFIX: &str = "/static/";

/// Side of the square every logo is cropped and scaled to
const LOGO_SIZE: u32 = 500;

fn logo_file_name(team_id: i64) -> String {
    format!("team_{}.png", team_id)
}

/// Decode any supported image, center-crop it to a square and re-encode as PNG.
fn normalize_logo(data: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let decoded = image::load_from_memory(data)?;
    let square = DynamicImage::ImageRgba8(decoded.to_rgba8()).resize_to_fill(
        LOGO_SIZE,
        LOGO_SIZE,
        FilterType::Lanczos3,
    );
    let mut png = Vec::new();
    square.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Map a stored logo URL back to a file under the static directory.
/// Anything outside `/static/` or containing `..` is refused.
fn logo_path(static_dir: &FsPath, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix(LOGO_URL_PREFIX)?;
    let relative = FsPath::new(relative);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    (plain && relative.components().next().is_some()).then(|| static_dir.join(relative))
}

async fn remove_file_quietly(path: &FsPath) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TeamSubmission {
    name: Option<Value>,
    color: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TeamUpdate {
    color: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MemberSubmission {
    player_name: Option<Value>,
}

/// GET /api/teams
pub(super) async fn list_teams(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_teams()?))
}

/// POST /api/teams
pub(super) async fn create_team(
    State(state): State<SharedState>,
    payload: Result<Json<TeamSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let name = submission.name.as_ref().map(text_from_value).unwrap_or_default();
    let color = submission.color.as_ref().map(text_from_value).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::bad_request("team name required"));
    }
    match state.db.insert_team(&name, &color, &timestamp_now())? {
        Some(id) => Ok(created(id)),
        None => Err(ApiError::Conflict("team name already exists".into())),
    }
}

/// PUT /api/teams/:id
pub(super) async fn update_team(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    payload: Result<Json<TeamUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(update) = payload?;
    let Some(color) = update.color.as_ref().map(text_from_value) else {
        return Err(ApiError::bad_request("color is required"));
    };
    if !state.db.update_team_color(id, &color)? {
        return Err(ApiError::not_found("team not found"));
    }
    Ok(ok_response())
}

/// DELETE /api/teams/:id
pub(super) async fn delete_team(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(deleted) = state.db.delete_team(id)? else {
        return Err(ApiError::not_found("team not found"));
    };
    if let Some(path) = deleted
        .logo
        .as_deref()
        .and_then(|url| logo_path(&state.static_dir, url))
    {
        remove_file_quietly(&path).await;
    }
    info!("Deleted team {}", id);
    Ok(ok_response())
}

/// POST /api/teams/:id/logo (multipart field `logo`)
pub(super) async fn upload_logo(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = read_form(multipart).await?;
    let Some(data) = form.remove("logo") else {
        return Err(ApiError::bad_request("no logo file provided"));
    };
    if data.is_empty() {
        return Err(ApiError::bad_request("no selected file"));
    }
    // decoding and Lanczos resampling are CPU-bound
    let png = tokio::task::spawn_blocking(move || normalize_logo(&data))
        .await
        .map_err(|e| anyhow::anyhow!("logo processing task failed: {}", e))?
        .map_err(|e| ApiError::bad_request(format!("unsupported image: {}", e)))?;

    let dir = state.static_dir.join(LOGO_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| anyhow::anyhow!("creating {}: {}", dir.display(), e))?;
    let file_name = logo_file_name(id);
    let path = dir.join(&file_name);
    tokio::fs::write(&path, &png)
        .await
        .map_err(|e| anyhow::anyhow!("writing {}: {}", path.display(), e))?;

    let url = format!("{LOGO_URL_PREFIX}{LOGO_DIR}/{file_name}");
    if !state.db.set_team_logo(id, &url)? {
        remove_file_quietly(&path).await;
        return Err(ApiError::not_found("team not found"));
    }
    info!("Stored logo for team {} at {}", id, url);
    Ok(Json(json!({ "ok": true, "logo": url })))
}

/// POST /api/teams/:id/members
pub(super) async fn add_member(
    State(state): State<SharedState>,
    Path(team_id): Path<i64>,
    payload: Result<Json<MemberSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let player_name = submission
        .player_name
        .as_ref()
        .map(text_from_value)
        .unwrap_or_default();
    if player_name.is_empty() {
        return Err(ApiError::bad_request("player name required"));
    }
    match state
        .db
        .add_team_member(team_id, &player_name, &timestamp_now())?
    {
        Some(id) => Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id })))),
        None => Err(ApiError::Conflict("already joined".into())),
    }
}

/// DELETE /api/team_members/:id
pub(super) async fn remove_member(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.remove_team_member(id)? {
        return Err(ApiError::not_found("member not found"));
    }
    Ok(ok_response())
}

/// GET /api/team_games
pub(super) async fn list_team_games(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_team_games()?))
}

/// POST /api/team_games
pub(super) async fn create_team_game(
    State(state): State<SharedState>,
    payload: Result<Json<TeamGameSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let seats = submission.validate(&state.rules)?;
    let id = state.db.insert_team_game(&timestamp_now(), &seats)?;
    Ok(created(id))
}

/// DELETE /api/team_games/:id
pub(super) async fn delete_team_game(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_team_game(id)? {
        return Err(ApiError::not_found("game not found"));
    }
    Ok(ok_response())
}

/// GET /api/team_ranking?min_games=N
pub(super) async fn team_ranking(
    State(state): State<SharedState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    let games = state.db.list_team_games()?;
    let standings = aggregate(&state.rules, games.iter().map(|g| g.by_team()));
    Ok(Json(query.apply(standings)))
}

/// GET /api/team_personal_ranking?min_games=N
pub(super) async fn team_personal_ranking(
    State(state): State<SharedState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    let games = state.db.list_team_games()?;
    let standings = aggregate(&state.rules, games.iter().map(|g| g.by_player()));
    Ok(Json(query.apply(standings)))
}
