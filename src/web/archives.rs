use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use tracing::info;

use super::{ok_response, read_form, RankingQuery, SharedState};
use crate::db::timestamp_now;
use crate::error::ApiError;
use crate::rating::aggregate::{aggregate, Standing};
use crate::transfer::{import::parse_games, read_upload};

/// GET /api/archives
pub(super) async fn list_archives(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_archives()?))
}

/// GET /api/archives/:id/games
pub(super) async fn archive_games(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.archive_games(id)?))
}

/// GET /api/archives/:id/ranking?min_games=N
pub(super) async fn archive_ranking(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    if !state.db.list_archives()?.iter().any(|a| a.id == id) {
        return Err(ApiError::not_found("archive not found"));
    }
    let games = state.db.archive_games(id)?;
    let standings = aggregate(&state.rules, games.iter().map(|g| g.by_player()));
    Ok(Json(query.apply(standings)))
}

/// DELETE /api/archives/:id
pub(super) async fn delete_archive(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_archive(id)? {
        return Err(ApiError::not_found("archive not found"));
    }
    info!("Deleted archive {}", id);
    Ok(ok_response())
}

/// POST /admin/archive_import (multipart: `archive_name`, `file`)
pub(super) async fn import_archive(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let form = read_form(multipart).await?;
    let name = form
        .get("archive_name")
        .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::bad_request("archive name required"));
    }
    let Some(raw) = form.get("file") else {
        return Err(ApiError::bad_request("CSV file required"));
    };

    let created_at = timestamp_now();
    let games = parse_games(&read_upload(raw)?, &created_at);
    let Some(archive_id) = state.db.create_archive(&name, &created_at, &games)? else {
        return Err(ApiError::bad_request("no readable games in CSV"));
    };
    info!(
        "Archive {} '{}' created with {} game(s)",
        archive_id,
        name,
        games.len()
    );
    Ok(Redirect::to("/"))
}
