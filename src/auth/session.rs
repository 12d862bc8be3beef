use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::ApiResult;
use crate::models::{Role, User};

/// Session key holding the logged-in user snapshot.
const USER_KEY: &str = "user";

/// Snapshot of the logged-in user, taken at login time.
///
/// `has_voted` mirrors the flag as of the last session write: login,
/// vote casting and election reset update it, but other devices'
/// votes are invisible until re-login. The voter status endpoint
/// re-reads the database for this reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "hasVoted")]
    pub has_voted: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            has_voted: user.has_voted,
        }
    }
}

pub async fn current_user(session: &Session) -> ApiResult<Option<SessionUser>> {
    Ok(session.get::<SessionUser>(USER_KEY).await?)
}

pub async fn store_user(session: &Session, user: &SessionUser) -> ApiResult<()> {
    session.insert(USER_KEY, user).await?;
    Ok(())
}

/// Rewrites the cached flag after a vote or a reset.
pub async fn set_has_voted(session: &Session, has_voted: bool) -> ApiResult<()> {
    if let Some(mut user) = current_user(session).await? {
        user.has_voted = has_voted;
        store_user(session, &user).await?;
    }
    Ok(())
}

pub async fn clear(session: &Session) -> ApiResult<()> {
    session.flush().await?;
    Ok(())
}
