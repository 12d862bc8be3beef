use crate::models::LogEntry;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::RepositoryResult;

/// Append-only audit trail. Rows are never updated or deleted; an
/// election reset logs itself instead of clearing history.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuditRepository: Send + Sync {
    async fn append(
        &self,
        action: &str,
        user_id: Option<i64>,
        details: Option<String>,
    ) -> RepositoryResult<i64>;
    async fn recent(&self, limit: i64) -> RepositoryResult<Vec<LogEntry>>;
}

pub struct SqliteAuditRepository {
    pool: SqlitePool,
}

impl SqliteAuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for SqliteAuditRepository {
    async fn append(
        &self,
        action: &str,
        user_id: Option<i64>,
        details: Option<String>,
    ) -> RepositoryResult<i64> {
        let result = sqlx::query("INSERT INTO logs (action, user_id, details) VALUES (?, ?, ?)")
            .bind(action)
            .bind(user_id)
            .bind(details)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: i64) -> RepositoryResult<Vec<LogEntry>> {
        let entries = sqlx::query_as::<_, LogEntry>(
            "SELECT l.id, l.action, l.user_id, l.details, l.created_at,
                    u.name AS user_name, u.email AS user_email
             FROM logs l
             LEFT JOIN users u ON u.id = l.user_id
             ORDER BY l.created_at DESC, l.id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
