use serde::Serialize;
use sqlx::FromRow;

/// Audit trail row, joined with the acting user when they still exist.
/// Deleting a user nulls the reference instead of dropping their history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub action: String,
    pub user_id: Option<i64>,
    pub details: Option<String>,
    pub created_at: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}
