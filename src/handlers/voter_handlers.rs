use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::auth::session;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Deserialize)]
pub struct VoteBody {
    party_id: Option<i64>,
}

/// GET /api/voter/parties — every party with its live tally.
pub async fn list_parties(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let parties = state.voter_service.list_parties().await?;
    Ok(Json(json!({ "parties": parties })))
}

/// GET /api/voter/campaigns — the cross-party campaign feed.
pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let campaigns = state.voter_service.list_campaigns().await?;
    Ok(Json(json!({ "campaigns": campaigns })))
}

/// POST /api/voter/vote — the one irreversible voter action.
pub async fn cast_vote(
    State(state): State<AppState>,
    session_handle: Session,
    Json(body): Json<VoteBody>,
) -> ApiResult<Json<Value>> {
    let user = session::current_user(&session_handle)
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    let party_id = body
        .party_id
        .ok_or_else(|| ApiError::Validation("Party ID required".to_string()))?;

    state.voter_service.cast_vote(user.id, party_id).await?;
    session::set_has_voted(&session_handle, true).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Vote cast successfully",
    })))
}

/// GET /api/voter/status — reads the database, not the session.
pub async fn status(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Json<Value>> {
    let user = session::current_user(&session_handle)
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    let status = state.voter_service.status(user.id).await?;

    Ok(Json(json!({
        "hasVoted": status.has_voted,
        "votedParty": status.voted_party,
    })))
}
