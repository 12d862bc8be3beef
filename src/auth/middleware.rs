use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::ApiError;
use crate::models::Role;

use super::session::current_user;

/// Requires any authenticated session.
pub async fn require_login(session: Session, request: Request, next: Next) -> Response {
    match current_user(&session).await {
        Ok(Some(_)) => next.run(request).await,
        Ok(None) => ApiError::unauthenticated().into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn require_voter(session: Session, request: Request, next: Next) -> Response {
    require_role(Role::Voter, session, request, next).await
}

pub async fn require_party(session: Session, request: Request, next: Next) -> Response {
    require_role(Role::Party, session, request, next).await
}

pub async fn require_admin(session: Session, request: Request, next: Next) -> Response {
    require_role(Role::Admin, session, request, next).await
}

/// 401 without a session, 403 when the session's role differs.
async fn require_role(role: Role, session: Session, request: Request, next: Next) -> Response {
    match current_user(&session).await {
        Ok(Some(user)) if user.role == role => next.run(request).await,
        Ok(Some(_)) => ApiError::unauthorized().into_response(),
        Ok(None) => ApiError::unauthenticated().into_response(),
        Err(e) => e.into_response(),
    }
}
