use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::auth::session;
use crate::error::{ApiError, ApiResult};
use crate::services::admin_service::CsvExport;
use crate::AppState;

#[derive(Deserialize)]
pub struct LogsQuery {
    limit: Option<i64>,
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let stats = state.admin_service.stats().await?;
    Ok(Json(json!({ "stats": stats })))
}

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let users = state.admin_service.list_users().await?;
    Ok(Json(json!({ "users": users })))
}

/// GET /api/admin/parties
pub async fn list_parties(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let parties = state.admin_service.list_parties().await?;
    Ok(Json(json!({ "parties": parties })))
}

/// DELETE /api/admin/user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    session_handle: Session,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let admin = current(&session_handle).await?;
    state.admin_service.delete_user(admin.id, user_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}

/// DELETE /api/admin/party/{id}
pub async fn delete_party(
    State(state): State<AppState>,
    session_handle: Session,
    Path(party_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let admin = current(&session_handle).await?;
    state.admin_service.delete_party(admin.id, party_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Party deleted successfully",
    })))
}

/// GET /api/admin/logs?limit=N (default 100)
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Value>> {
    // SQLite reads a negative LIMIT as "no limit", so clamp.
    let limit = query.limit.unwrap_or(100).max(0);
    let logs = state.admin_service.logs(limit).await?;
    Ok(Json(json!({ "logs": logs })))
}

/// POST /api/admin/reset — clears votes and flags, keeps the audit trail.
pub async fn reset_election(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Json<Value>> {
    let admin = current(&session_handle).await?;

    state.admin_service.reset_election(admin.id).await?;
    // The acting admin's own snapshot also goes back to not-voted.
    session::set_has_voted(&session_handle, false).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Election reset successfully",
    })))
}

/// GET /api/admin/export/users
pub async fn export_users(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Response> {
    let admin = current(&session_handle).await?;
    let export = state.admin_service.export_users(admin.id).await?;
    Ok(csv_response(export))
}

/// GET /api/admin/export/parties
pub async fn export_parties(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Response> {
    let admin = current(&session_handle).await?;
    let export = state.admin_service.export_parties(admin.id).await?;
    Ok(csv_response(export))
}

/// GET /api/admin/export/votes
pub async fn export_votes(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Response> {
    let admin = current(&session_handle).await?;
    let export = state.admin_service.export_votes(admin.id).await?;
    Ok(csv_response(export))
}

/// GET /api/admin/export/logs
pub async fn export_logs(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Response> {
    let admin = current(&session_handle).await?;
    let export = state.admin_service.export_logs(admin.id).await?;
    Ok(csv_response(export))
}

async fn current(session_handle: &Session) -> ApiResult<session::SessionUser> {
    session::current_user(session_handle)
        .await?
        .ok_or_else(ApiError::unauthenticated)
}

fn csv_response(export: CsvExport) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", export.filename),
            ),
        ],
        export.content,
    )
        .into_response()
}
