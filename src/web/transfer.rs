//! CSV downloads and uploads for the ledgers and badges.

use axum::{
    extract::{Multipart, State},
    response::{Redirect, Response},
};
use tracing::info;

use super::{csv_attachment, read_form, SharedState};
use crate::db::models::GameKind;
use crate::db::timestamp_now;
use crate::error::ApiError;
use crate::transfer::{export, import, read_upload, CsvRow};

/// Rows of the uploaded `file` field.
async fn uploaded_rows(multipart: Multipart) -> Result<Vec<CsvRow>, ApiError> {
    let form = read_form(multipart).await?;
    let Some(raw) = form.get("file") else {
        return Err(ApiError::bad_request("file is required"));
    };
    Ok(read_upload(raw)?)
}

fn export_games(state: &SharedState, kind: GameKind) -> Result<Response, ApiError> {
    let games = state.db.list_games_ascending(kind)?;
    let body = export::games_csv(&state.rules, &games)?;
    Ok(csv_attachment(kind.export_filename(), body))
}

async fn import_games(
    state: &SharedState,
    kind: GameKind,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let rows = uploaded_rows(multipart).await?;
    let games = import::parse_games(&rows, &timestamp_now());
    let inserted = state.db.insert_games(kind, &games)?;
    info!(
        "Imported {} game(s) into {} ({} row(s) read)",
        inserted,
        kind.table(),
        rows.len()
    );
    Ok(Redirect::to("/"))
}

/// GET /export
pub(super) async fn export_individual(
    State(state): State<SharedState>,
) -> Result<Response, ApiError> {
    export_games(&state, GameKind::Individual)
}

/// GET /export_tournament
pub(super) async fn export_tournament(
    State(state): State<SharedState>,
) -> Result<Response, ApiError> {
    export_games(&state, GameKind::Tournament)
}

/// GET /export_badges
pub(super) async fn export_badges(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let body = export::badges_csv(&state.db.list_badges()?)?;
    Ok(csv_attachment(export::BADGES_FILENAME, body))
}

/// GET /export_player_badges
pub(super) async fn export_player_badges(
    State(state): State<SharedState>,
) -> Result<Response, ApiError> {
    let body = export::player_badges_csv(&state.db.list_player_badges_ascending()?)?;
    Ok(csv_attachment(export::PLAYER_BADGES_FILENAME, body))
}

/// POST /import
pub(super) async fn import_individual(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    import_games(&state, GameKind::Individual, multipart).await
}

/// POST /import_tournament
pub(super) async fn import_tournament(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    import_games(&state, GameKind::Tournament, multipart).await
}

/// POST /import_badges
///
/// Existing codes are overwritten with the uploaded name, grade and description.
pub(super) async fn import_badges(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let rows = uploaded_rows(multipart).await?;
    let badges = import::parse_badges(&rows);
    let (inserted, updated) = state.db.upsert_badges(&badges)?;
    info!(
        "Badge import: {} inserted, {} updated, {} row(s) skipped",
        inserted,
        updated,
        rows.len() - badges.len()
    );
    Ok(Redirect::to("/"))
}

/// POST /import_player_badges
pub(super) async fn import_player_badges(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let rows = uploaded_rows(multipart).await?;
    let parsed = import::parse_player_badges(&rows, &timestamp_now());
    let (inserted, skipped) = state.db.import_player_badges(&parsed.grants)?;
    info!(
        "Badge grant import: {} inserted, {} duplicate(s) skipped, {} invalid row(s)",
        inserted, skipped, parsed.invalid
    );
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{game_body, TestApp};
    use crate::transfer::decode_text;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn download(app: &TestApp, uri: &str) -> (StatusCode, String, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let (text, _) = decode_text(&bytes).unwrap();
        (status, disposition, text)
    }

    #[tokio::test]
    async fn games_export_is_cp949_with_points() {
        let app = TestApp::new();
        app.send_json(
            "POST",
            "/api/games",
            game_body(["김철수", "lee", "park", "choi"], [40_000, 30_000, 20_000, 10_000]),
        )
        .await;

        let (status, disposition, text) = download(&app, "/export").await;
        assert_eq!(status, StatusCode::OK);
        assert!(disposition.contains("madang_majhong_rating.csv"));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ID,시간,P1 이름"));
        assert!(lines[1].contains("김철수,40000,60.0"));
        assert!(lines[1].ends_with("choi,10000,-50.0"));
    }

    #[tokio::test]
    async fn exported_games_import_into_the_other_ledger() {
        let app = TestApp::new();
        for scores in [[40_000, 30_000, 20_000, 10_000], [10_000, 20_000, 30_000, 40_000]] {
            app.send_json("POST", "/api/games", game_body(["kim", "lee", "park", "choi"], scores))
                .await;
        }
        let request = Request::builder().uri("/export").body(Body::empty()).unwrap();
        let (_, sheet) = app.send(request).await;

        let (status, _, location) = app
            .post_multipart("/import_tournament", &[("file", Some("games.csv"), sheet.as_slice())])
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/"));

        let (_, games) = app.get_json("/api/tournament_games").await;
        assert_eq!(games.as_array().unwrap().len(), 2);
        let (_, ranking) = app.get_json("/api/tournament_ranking").await;
        assert_eq!(ranking[0]["games"], 2);
    }

    #[tokio::test]
    async fn badge_sheets_upsert_and_grant() {
        let app = TestApp::new();
        let badges = "code,name,grade,description\n7,Nine gates,gold,rare\n8,Thirteen orphans,gold,\n,no code,x,\n";
        let (status, _, _) = app
            .post_multipart("/import_badges", &[("file", Some("badges.csv"), badges.as_bytes())])
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let updated = "code,name,grade,description\n7,Nine gates,platinum,rarer\n";
        app.post_multipart("/import_badges", &[("file", Some("badges.csv"), updated.as_bytes())])
            .await;
        let (_, list) = app.get_json("/api/badges").await;
        assert_eq!(list.as_array().unwrap().len(), 2);
        assert_eq!(list[0]["grade"], "platinum");

        let grants = "player_name,badge_code,granted_at\nkim,7,2025-01-02T10:00\nlee,99,\n,7,\n";
        app.post_multipart(
            "/import_player_badges",
            &[("file", Some("grants.csv"), grants.as_bytes())],
        )
        .await;
        // grants are kept even when the badge code is not defined
        let (_, granted) = app.get_json("/api/player_badges").await;
        assert_eq!(granted.as_array().unwrap().len(), 2);
        assert_eq!(granted[1]["player_name"], "kim");

        let (status, disposition, text) = download(&app, "/export_player_badges").await;
        assert_eq!(status, StatusCode::OK);
        assert!(disposition.contains("player_badges.csv"));
        assert!(text.lines().nth(1).unwrap().starts_with("kim,7,2025-01-02T10:00"));
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let app = TestApp::new();
        let (status, body, _) = app
            .post_multipart("/import", &[("note", None, b"hello".as_slice())])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "file is required");
    }
}
