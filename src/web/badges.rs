use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::intake::{int_from_value, text_from_value};
use super::{created, ok_response, SharedState};
use crate::db::models::{NewBadge, NewPlayerBadge};
use crate::db::timestamp_now;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub(super) struct BadgeSubmission {
    code: Option<Value>,
    name: Option<Value>,
    grade: Option<Value>,
    description: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GrantSubmission {
    player_name: Option<Value>,
    badge_code: Option<Value>,
}

fn text(value: &Option<Value>) -> String {
    value.as_ref().map(text_from_value).unwrap_or_default()
}

/// Missing counts as 0; present but non-numeric is an error.
fn code(value: &Option<Value>, field: &str) -> Result<i64, ApiError> {
    match value {
        None => Ok(0),
        Some(v) => int_from_value(v)
            .ok_or_else(|| ApiError::bad_request(format!("{field} must be integer"))),
    }
}

/// GET /api/badges
pub(super) async fn list_badges(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_badges()?))
}

/// POST /api/badges
pub(super) async fn create_badge(
    State(state): State<SharedState>,
    payload: Result<Json<BadgeSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let badge = NewBadge {
        code: code(&submission.code, "code")?,
        name: text(&submission.name),
        grade: text(&submission.grade),
        description: text(&submission.description),
    };
    if badge.code == 0 || badge.name.is_empty() || badge.grade.is_empty() {
        return Err(ApiError::bad_request("code, name, grade required"));
    }
    match state.db.insert_badge(&badge)? {
        Some(id) => Ok(created(id)),
        None => Err(ApiError::Conflict("badge code already exists".into())),
    }
}

/// DELETE /api/badges/:id
pub(super) async fn delete_badge(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_badge(id)? {
        return Err(ApiError::not_found("badge not found"));
    }
    info!("Deleted badge {} and its grants", id);
    Ok(ok_response())
}

/// GET /api/player_badges
pub(super) async fn list_grants(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_player_badges()?))
}

/// GET /api/player_badges/by_player/:name
pub(super) async fn list_grants_for_player(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.list_player_badges_for(name.trim())?))
}

/// POST /api/player_badges
pub(super) async fn grant_badge(
    State(state): State<SharedState>,
    payload: Result<Json<GrantSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let grant = NewPlayerBadge {
        player_name: text(&submission.player_name),
        badge_code: code(&submission.badge_code, "badge_code")?,
        granted_at: timestamp_now(),
    };
    if grant.player_name.is_empty() || grant.badge_code == 0 {
        return Err(ApiError::bad_request("player_name and badge_code required"));
    }
    match state.db.grant_badge(&grant)? {
        Some(id) => Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id })))),
        None => Err(ApiError::bad_request("badge not found")),
    }
}

/// DELETE /api/player_badges/:id
pub(super) async fn revoke_badge(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.revoke_badge(id)? {
        return Err(ApiError::not_found("not found"));
    }
    Ok(ok_response())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn badge_lifecycle() {
        let app = TestApp::new();
        let badge = json!({ "code": "7", "name": "Nine gates", "grade": "gold" });
        let (status, body) = app.send_json("POST", "/api/badges", badge.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        let badge_id = body["id"].as_i64().unwrap();

        let (status, body) = app.send_json("POST", "/api/badges", badge).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "badge code already exists");

        let (status, _) = app
            .send_json("POST", "/api/player_badges", json!({ "player_name": "kim", "badge_code": 7 }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, grants) = app.get_json("/api/player_badges/by_player/kim").await;
        assert_eq!(grants[0]["name"], "Nine gates");
        assert_eq!(grants[0]["badge_code"], 7);
        assert_eq!(grants[0]["code"], 7);

        let (status, _) = app.delete(&format!("/api/badges/{badge_id}")).await;
        assert_eq!(status, StatusCode::OK);
        let (_, grants) = app.get_json("/api/player_badges").await;
        assert!(grants.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn badge_validation() {
        let app = TestApp::new();
        let (status, body) = app
            .send_json("POST", "/api/badges", json!({ "code": "x", "name": "n", "grade": "g" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "code must be integer");

        let (_, body) = app
            .send_json("POST", "/api/badges", json!({ "code": 1, "name": "n" }))
            .await;
        assert_eq!(body["error"], "code, name, grade required");

        let (status, body) = app
            .send_json("POST", "/api/player_badges", json!({ "player_name": "kim", "badge_code": 99 }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "badge not found");

        let (status, _) = app.delete("/api/player_badges/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
