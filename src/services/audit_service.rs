use std::sync::Arc;

use crate::error::ApiResult;
use crate::models::LogEntry;
use crate::repositories::AuditRepository;

/// Best-effort audit trail writer.
///
/// A failed append is reported through `tracing::warn!` and otherwise
/// dropped: logging must never fail the operation it describes.
pub struct AuditLogger {
    repository: Arc<dyn AuditRepository>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    pub async fn record(&self, action: &str, user_id: Option<i64>) {
        self.record_with(action, user_id, None).await;
    }

    pub async fn record_with(&self, action: &str, user_id: Option<i64>, details: Option<&str>) {
        let details = details.map(str::to_string);
        if let Err(e) = self.repository.append(action, user_id, details).await {
            tracing::warn!(action, error = %e, "failed to append audit log entry");
        }
    }

    /// Reads back the trail for the admin log view. Unlike writes,
    /// read failures do propagate.
    pub async fn recent(&self, limit: i64) -> ApiResult<Vec<LogEntry>> {
        Ok(self.repository.recent(limit).await?)
    }
}
