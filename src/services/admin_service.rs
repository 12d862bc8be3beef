use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{LogEntry, PartyAdminRow, Role, User};
use crate::repositories::{PartyRepository, UserRepository, VoteRepository};
use crate::storage::FileStorage;

use super::audit_service::AuditLogger;

#[derive(Debug, Serialize)]
pub struct ElectionStats {
    #[serde(rename = "totalVoters")]
    pub total_voters: i64,
    #[serde(rename = "totalParties")]
    pub total_parties: i64,
    #[serde(rename = "totalVotes")]
    pub total_votes: i64,
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
}

/// A generated CSV document, ready to be served as a file download.
pub struct CsvExport {
    pub filename: &'static str,
    pub content: String,
}

pub struct AdminService {
    users: Arc<dyn UserRepository>,
    parties: Arc<dyn PartyRepository>,
    votes: Arc<dyn VoteRepository>,
    storage: Arc<FileStorage>,
    audit: Arc<AuditLogger>,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        parties: Arc<dyn PartyRepository>,
        votes: Arc<dyn VoteRepository>,
        storage: Arc<FileStorage>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            users,
            parties,
            votes,
            storage,
            audit,
        }
    }

    pub async fn stats(&self) -> ApiResult<ElectionStats> {
        Ok(ElectionStats {
            total_voters: self.users.count_by_role(Role::Voter).await?,
            total_parties: self.parties.count_all().await?,
            total_votes: self.votes.count_all().await?,
            total_users: self.users.count_all().await?,
        })
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.users.list_users().await?)
    }

    pub async fn list_parties(&self) -> ApiResult<Vec<PartyAdminRow>> {
        let mut parties = self.parties.list_admin().await?;
        for party in &mut parties {
            party.logo_url = self.storage.absolutize(&party.logo_url);
        }
        Ok(parties)
    }

    /// Removes a user and, through the cascade rules, their party,
    /// campaigns and vote. Admins cannot remove themselves.
    pub async fn delete_user(&self, admin_id: i64, user_id: i64) -> ApiResult<()> {
        if admin_id == user_id {
            return Err(ApiError::Conflict(
                "Cannot delete your own account".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        self.users.delete_user(user_id).await?;

        self.audit
            .record(
                &format!("User deleted: {} ({})", user.name, user.email),
                Some(admin_id),
            )
            .await;

        Ok(())
    }

    pub async fn delete_party(&self, admin_id: i64, party_id: i64) -> ApiResult<()> {
        let party = self
            .parties
            .find_by_id(party_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Party not found".to_string()))?;

        self.parties.delete_party(party_id).await?;

        self.audit
            .record(&format!("Party deleted: {}", party.name), Some(admin_id))
            .await;

        Ok(())
    }

    pub async fn logs(&self, limit: i64) -> ApiResult<Vec<LogEntry>> {
        self.audit.recent(limit).await
    }

    /// Wipes every vote and clears every has_voted flag in a single
    /// transaction, then logs the reset. The audit trail itself is
    /// never touched.
    pub async fn reset_election(&self, admin_id: i64) -> ApiResult<u64> {
        let removed = self.votes.reset_all().await?;

        self.audit
            .record("Election reset - all votes cleared", Some(admin_id))
            .await;

        tracing::info!(removed, "election reset complete");

        Ok(removed)
    }

    pub async fn export_users(&self, admin_id: i64) -> ApiResult<CsvExport> {
        let mut users = self.users.list_users().await?;
        users.sort_by_key(|u| u.id);

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["ID", "Name", "Email", "Role", "Has Voted", "Created At"])
            .map_err(csv_error)?;
        for user in &users {
            writer
                .write_record([
                    user.id.to_string(),
                    user.name.clone(),
                    user.email.clone(),
                    user.role.to_string(),
                    yes_no(user.has_voted).to_string(),
                    user.created_at.clone(),
                ])
                .map_err(csv_error)?;
        }

        self.audit.record("Users data exported", Some(admin_id)).await;

        finish_csv(writer, "users.csv")
    }

    pub async fn export_parties(&self, admin_id: i64) -> ApiResult<CsvExport> {
        let parties = self.parties.list_admin().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "ID",
                "Party Name",
                "Description",
                "Creator",
                "Vote Count",
                "Created At",
            ])
            .map_err(csv_error)?;
        for party in &parties {
            writer
                .write_record([
                    party.id.to_string(),
                    party.name.clone(),
                    party.description.clone(),
                    party.creator_name.clone(),
                    party.vote_count.to_string(),
                    party.created_at.clone(),
                ])
                .map_err(csv_error)?;
        }

        self.audit
            .record("Parties data exported", Some(admin_id))
            .await;

        finish_csv(writer, "parties.csv")
    }

    pub async fn export_votes(&self, admin_id: i64) -> ApiResult<CsvExport> {
        let votes = self.votes.export_rows().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "ID",
                "Voter ID",
                "Voter Name",
                "Voter Email",
                "Party ID",
                "Party Name",
                "Voted At",
            ])
            .map_err(csv_error)?;
        for vote in &votes {
            writer
                .write_record([
                    vote.id.to_string(),
                    vote.voter_id.to_string(),
                    vote.voter_name.clone(),
                    vote.voter_email.clone(),
                    vote.party_id.to_string(),
                    vote.party_name.clone(),
                    vote.voted_at.clone(),
                ])
                .map_err(csv_error)?;
        }

        self.audit.record("Votes data exported", Some(admin_id)).await;

        finish_csv(writer, "votes.csv")
    }

    pub async fn export_logs(&self, admin_id: i64) -> ApiResult<CsvExport> {
        // No cap on exports: unlike the admin view, the whole trail goes out.
        let logs = self.audit.recent(i64::MAX).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "ID",
                "Action",
                "User Name",
                "User Email",
                "Details",
                "Created At",
            ])
            .map_err(csv_error)?;
        for entry in &logs {
            writer
                .write_record([
                    entry.id.to_string(),
                    entry.action.clone(),
                    entry.user_name.clone().unwrap_or_else(|| "N/A".to_string()),
                    entry.user_email.clone().unwrap_or_else(|| "N/A".to_string()),
                    entry.details.clone().unwrap_or_default(),
                    entry.created_at.clone(),
                ])
                .map_err(csv_error)?;
        }

        self.audit.record("Logs data exported", Some(admin_id)).await;

        finish_csv(writer, "logs.csv")
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn csv_error(e: csv::Error) -> ApiError {
    ApiError::Internal(anyhow::anyhow!("CSV serialization failed: {}", e))
}

fn finish_csv(writer: csv::Writer<Vec<u8>>, filename: &'static str) -> ApiResult<CsvExport> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV buffer flush failed: {}", e))?;
    let content = String::from_utf8(bytes).map_err(|e| anyhow::anyhow!("CSV not UTF-8: {}", e))?;

    Ok(CsvExport { filename, content })
}
