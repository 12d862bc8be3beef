use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{Campaign, PartyProfile};
use crate::repositories::{PartyRepository, RepositoryError};
use crate::storage::FileStorage;

use super::audit_service::AuditLogger;

pub struct CreatePartyRequest {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

pub struct CreateCampaignRequest {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Everything a party-role user can do with their own party.
///
/// All methods are scoped by the caller's user id; a party user can
/// never touch another party's rows.
pub struct PartyService {
    parties: Arc<dyn PartyRepository>,
    storage: Arc<FileStorage>,
    audit: Arc<AuditLogger>,
}

impl PartyService {
    pub fn new(
        parties: Arc<dyn PartyRepository>,
        storage: Arc<FileStorage>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            parties,
            storage,
            audit,
        }
    }

    pub async fn get_profile(&self, user_id: i64) -> ApiResult<Option<PartyProfile>> {
        let profile = self.parties.profile_for(user_id).await?;
        Ok(profile.map(|mut p| {
            p.logo_url = self.storage.absolutize(&p.logo_url);
            p
        }))
    }

    pub async fn create_party(
        &self,
        user_id: i64,
        request: CreatePartyRequest,
    ) -> ApiResult<i64> {
        if request.name.trim().is_empty() {
            return Err(ApiError::Validation("Party name is required".to_string()));
        }

        // Pre-checks give the caller a precise message; the UNIQUE
        // constraints on created_by and name decide races.
        if self.parties.find_by_creator(user_id).await?.is_some() {
            return Err(ApiError::Conflict("You already have a party".to_string()));
        }
        if self.parties.name_exists(&request.name).await? {
            return Err(ApiError::Conflict("Party name already exists".to_string()));
        }

        let description = request.description.unwrap_or_default();
        let logo_url = request.logo_url.filter(|l| !l.is_empty());

        let party_id = match self
            .parties
            .create_party(
                &request.name,
                &description,
                logo_url.as_deref().unwrap_or("🎯"),
                user_id,
            )
            .await
        {
            Ok(id) => id,
            Err(RepositoryError::AlreadyExists) => {
                // Lost a race on one of the two unique columns.
                if self.parties.find_by_creator(user_id).await?.is_some() {
                    return Err(ApiError::Conflict("You already have a party".to_string()));
                }
                return Err(ApiError::Conflict("Party name already exists".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.audit
            .record(&format!("Party created: {}", request.name), Some(user_id))
            .await;

        Ok(party_id)
    }

    /// Partial update: omitted fields keep their stored value. Supplying
    /// nothing is still a success.
    pub async fn update_party(
        &self,
        user_id: i64,
        description: Option<String>,
        logo_url: Option<String>,
    ) -> ApiResult<()> {
        let party = self
            .parties
            .find_by_creator(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Party not found".to_string()))?;

        self.parties
            .update_party(party.id, description, logo_url)
            .await?;

        self.audit
            .record("Party profile updated", Some(user_id))
            .await;

        Ok(())
    }

    pub async fn create_campaign(
        &self,
        user_id: i64,
        request: CreateCampaignRequest,
    ) -> ApiResult<i64> {
        if request.title.trim().is_empty() {
            return Err(ApiError::Validation("Campaign title required".to_string()));
        }

        let party = self
            .parties
            .find_by_creator(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Create a party first".to_string()))?;

        let image_url = match request.image.as_deref() {
            Some(image) if image.starts_with("data:image/") => {
                self.storage
                    .save_data_uri("campaigns", "campaign", image)
                    .await?
            }
            Some(image) if image.starts_with("http://") || image.starts_with("https://") => {
                image.to_string()
            }
            _ => "📢".to_string(),
        };

        let campaign_id = self
            .parties
            .create_campaign(
                party.id,
                &request.title,
                request.description.as_deref().unwrap_or(""),
                &image_url,
            )
            .await?;

        self.audit
            .record(
                &format!("Campaign created: {}", request.title),
                Some(user_id),
            )
            .await;

        Ok(campaign_id)
    }

    /// Stores an uploaded campaign image and returns its relative path
    /// with the public URL.
    pub async fn upload_campaign_image(
        &self,
        user_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> ApiResult<(String, String)> {
        self.require_party(user_id).await?;

        let ext = Self::validated_extension(filename)?;
        let rel_path = self
            .storage
            .save_image("campaigns", "campaign", &ext, bytes)
            .await?;
        let url = self.storage.public_url(&rel_path);

        Ok((rel_path, url))
    }

    /// Stores a new logo, points the party row at it and removes the
    /// previous file when it lived in our upload directory.
    pub async fn upload_party_logo(
        &self,
        user_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> ApiResult<(String, String)> {
        let party = self.require_party(user_id).await?;

        let ext = Self::validated_extension(filename)?;
        let rel_path = self.storage.save_image("logos", "logo", &ext, bytes).await?;

        if FileStorage::is_stored_path(&party.logo_url) {
            self.storage.delete(&party.logo_url).await;
        }

        self.parties
            .update_party(party.id, None, Some(rel_path.clone()))
            .await?;

        self.audit.record("Party logo updated", Some(user_id)).await;

        let url = self.storage.public_url(&rel_path);
        Ok((rel_path, url))
    }

    pub async fn list_campaigns(&self, user_id: i64) -> ApiResult<Vec<Campaign>> {
        let Some(party) = self.parties.find_by_creator(user_id).await? else {
            return Ok(Vec::new());
        };

        let mut campaigns = self.parties.campaigns_for(party.id).await?;
        for campaign in &mut campaigns {
            campaign.image_url = self.storage.absolutize(&campaign.image_url);
        }

        Ok(campaigns)
    }

    pub async fn vote_count(&self, user_id: i64) -> ApiResult<i64> {
        match self.parties.find_by_creator(user_id).await? {
            Some(party) => Ok(self.parties.vote_count(party.id).await?),
            None => Ok(0),
        }
    }

    async fn require_party(&self, user_id: i64) -> ApiResult<crate::models::Party> {
        self.parties
            .find_by_creator(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Party not found".to_string()))
    }

    fn validated_extension(filename: &str) -> ApiResult<String> {
        let ext = FileStorage::extension_of(filename)
            .ok_or_else(|| ApiError::Validation("File has no extension".to_string()))?;
        if !FileStorage::allowed_extension(&ext) {
            return Err(ApiError::Validation(format!(
                "Invalid image type: {}",
                ext
            )));
        }
        Ok(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Party;
    use crate::repositories::audit_repository::MockAuditRepository;
    use crate::repositories::party_repository::MockPartyRepository;
    use mockall::predicate::*;

    fn quiet_audit() -> Arc<AuditLogger> {
        let mut mock = MockAuditRepository::new();
        mock.expect_append()
            .returning(|_, _, _| Box::pin(async { Ok(1) }));
        Arc::new(AuditLogger::new(Arc::new(mock)))
    }

    fn service(parties: MockPartyRepository, dir: &std::path::Path) -> PartyService {
        PartyService::new(
            Arc::new(parties),
            Arc::new(FileStorage::new(dir.to_path_buf(), "http://localhost:5000")),
            quiet_audit(),
        )
    }

    fn existing_party(id: i64, created_by: i64) -> Party {
        Party {
            id,
            name: "Green".to_string(),
            description: "".to_string(),
            logo_url: "🌿".to_string(),
            created_by,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn create_party_rejects_second_party_for_same_user() {
        let dir = tempfile::tempdir().unwrap();
        let mut parties = MockPartyRepository::new();
        parties
            .expect_find_by_creator()
            .with(eq(7))
            .returning(|_| Box::pin(async { Ok(Some(existing_party(1, 7))) }));

        let result = service(parties, dir.path())
            .create_party(
                7,
                CreatePartyRequest {
                    name: "Different Name".to_string(),
                    description: None,
                    logo_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_party_rejects_taken_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut parties = MockPartyRepository::new();
        parties
            .expect_find_by_creator()
            .returning(|_| Box::pin(async { Ok(None) }));
        parties
            .expect_name_exists()
            .with(eq("Green"))
            .returning(|_| Box::pin(async { Ok(true) }));

        let result = service(parties, dir.path())
            .create_party(
                8,
                CreatePartyRequest {
                    name: "Green".to_string(),
                    description: None,
                    logo_url: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_campaign_requires_existing_party() {
        let dir = tempfile::tempdir().unwrap();
        let mut parties = MockPartyRepository::new();
        parties
            .expect_find_by_creator()
            .returning(|_| Box::pin(async { Ok(None) }));

        let result = service(parties, dir.path())
            .create_campaign(
                9,
                CreateCampaignRequest {
                    title: "Vote for us".to_string(),
                    description: None,
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_campaign_substitutes_placeholder_for_odd_image_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut parties = MockPartyRepository::new();
        parties
            .expect_find_by_creator()
            .returning(|_| Box::pin(async { Ok(Some(existing_party(3, 9))) }));
        parties
            .expect_create_campaign()
            .withf(|party_id, title, _, image| {
                *party_id == 3 && title == "Vote for us" && image == "📢"
            })
            .times(1)
            .returning(|_, _, _, _| Box::pin(async { Ok(11) }));

        let result = service(parties, dir.path())
            .create_campaign(
                9,
                CreateCampaignRequest {
                    title: "Vote for us".to_string(),
                    description: None,
                    image: Some("not-a-data-uri".to_string()),
                },
            )
            .await;

        assert_eq!(result.unwrap(), 11);
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut parties = MockPartyRepository::new();
        parties
            .expect_find_by_creator()
            .returning(|_| Box::pin(async { Ok(Some(existing_party(3, 9))) }));

        let result = service(parties, dir.path())
            .upload_campaign_image(9, "malware.exe", b"bytes")
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn vote_count_is_zero_without_a_party() {
        let dir = tempfile::tempdir().unwrap();
        let mut parties = MockPartyRepository::new();
        parties
            .expect_find_by_creator()
            .returning(|_| Box::pin(async { Ok(None) }));

        let count = service(parties, dir.path()).vote_count(9).await.unwrap();
        assert_eq!(count, 0);
    }
}
