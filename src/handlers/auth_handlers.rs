use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::auth::session::{self, SessionUser};
use crate::error::{ApiError, ApiResult};
use crate::services::auth_service::RegisterRequest;
use crate::AppState;

#[derive(Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// POST /api/auth/register — creates the account but does not log in.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    state
        .auth_service
        .register(RegisterRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful. Please log in.",
        })),
    ))
}

/// POST /api/auth/login — verifies credentials and stores the user
/// snapshot in the session.
pub async fn login(
    State(state): State<AppState>,
    session_handle: Session,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<Value>> {
    let user = state.auth_service.login(&body.email, &body.password).await?;

    let session_user = SessionUser::from(&user);
    session::store_user(&session_handle, &session_user).await?;

    Ok(Json(json!({
        "success": true,
        "user": session_user,
    })))
}

/// POST /api/auth/logout — drops the session entirely.
pub async fn logout(
    State(state): State<AppState>,
    session_handle: Session,
) -> ApiResult<Json<Value>> {
    let user = session::current_user(&session_handle)
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    state.auth_service.log_logout(user.id).await;
    session::clear(&session_handle).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully",
    })))
}

/// GET /api/auth/session — introspection; answers from the login-time
/// snapshot and never touches the database.
pub async fn session_info(session_handle: Session) -> ApiResult<Json<Value>> {
    match session::current_user(&session_handle).await? {
        Some(user) => Ok(Json(json!({
            "authenticated": true,
            "user": user,
        }))),
        None => Ok(Json(json!({ "authenticated": false }))),
    }
}
