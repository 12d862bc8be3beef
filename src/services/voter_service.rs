use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{CampaignWithParty, PartySummary, VotedParty};
use crate::repositories::{PartyRepository, RepositoryError, UserRepository, VoteRepository};
use crate::storage::FileStorage;

use super::audit_service::AuditLogger;

pub struct VoteStatus {
    pub has_voted: bool,
    pub voted_party: Option<VotedParty>,
}

pub struct VoterService {
    users: Arc<dyn UserRepository>,
    parties: Arc<dyn PartyRepository>,
    votes: Arc<dyn VoteRepository>,
    storage: Arc<FileStorage>,
    audit: Arc<AuditLogger>,
}

impl VoterService {
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

    pub async fn list_parties(&self) -> ApiResult<Vec<PartySummary>> {
        let mut parties = self.parties.list_with_votes().await?;
        for party in &mut parties {
            party.logo_url = self.storage.absolutize(&party.logo_url);
        }
        Ok(parties)
    }

    pub async fn list_campaigns(&self) -> ApiResult<Vec<CampaignWithParty>> {
        let mut campaigns = self.parties.list_campaigns_with_party().await?;
        for campaign in &mut campaigns {
            campaign.image_url = self.storage.absolutize(&campaign.image_url);
        }
        Ok(campaigns)
    }

    /// Records the caller's single vote.
    ///
    /// The has_voted pre-check reads fresh state for a friendly error;
    /// the UNIQUE index on votes.voter_id is what actually guarantees
    /// one vote per voter when requests race.
    pub async fn cast_vote(&self, voter_id: i64, party_id: i64) -> ApiResult<()> {
        let user = self
            .users
            .find_by_id(voter_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        if user.has_voted {
            return Err(ApiError::Conflict("You have already voted".to_string()));
        }

        if self.parties.find_by_id(party_id).await?.is_none() {
            return Err(ApiError::NotFound("Party not found".to_string()));
        }

        match self.votes.cast_vote(voter_id, party_id).await {
            Ok(_) => {}
            Err(RepositoryError::AlreadyExists) => {
                return Err(ApiError::Conflict("You have already voted".to_string()))
            }
            // The party disappeared between the check and the insert.
            Err(RepositoryError::NotFound) => {
                return Err(ApiError::NotFound("Party not found".to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        self.audit
            .record(
                &format!("Vote cast for party ID: {}", party_id),
                Some(voter_id),
            )
            .await;

        Ok(())
    }

    /// Always answers from the database, not the session snapshot, so a
    /// vote cast on another device shows up immediately.
    pub async fn status(&self, voter_id: i64) -> ApiResult<VoteStatus> {
        let user = self
            .users
            .find_by_id(voter_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let voted_party = if user.has_voted {
            self.votes.voted_party(voter_id).await?
        } else {
            None
        };

        Ok(VoteStatus {
            has_voted: user.has_voted,
            voted_party,
        })
    }
}
