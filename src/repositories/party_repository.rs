use crate::models::{Campaign, CampaignWithParty, Party, PartyAdminRow, PartyProfile, PartySummary};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{map_constraint_violation, RepositoryError, RepositoryResult};

/// Data access for parties and their campaign posts. Campaigns never
/// exist without a party, so they share a repository.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PartyRepository: Send + Sync {
    async fn create_party(
        &self,
        name: &str,
        description: &str,
        logo_url: &str,
        created_by: i64,
    ) -> RepositoryResult<i64>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Party>>;
    async fn find_by_creator(&self, user_id: i64) -> RepositoryResult<Option<Party>>;
    async fn name_exists(&self, name: &str) -> RepositoryResult<bool>;
    async fn update_party(
        &self,
        id: i64,
        description: Option<String>,
        logo_url: Option<String>,
    ) -> RepositoryResult<()>;
    async fn delete_party(&self, id: i64) -> RepositoryResult<()>;
    async fn list_with_votes(&self) -> RepositoryResult<Vec<PartySummary>>;
    async fn list_admin(&self) -> RepositoryResult<Vec<PartyAdminRow>>;
    async fn profile_for(&self, user_id: i64) -> RepositoryResult<Option<PartyProfile>>;
    async fn count_all(&self) -> RepositoryResult<i64>;
    async fn vote_count(&self, party_id: i64) -> RepositoryResult<i64>;
    async fn create_campaign(
        &self,
        party_id: i64,
        title: &str,
        description: &str,
        image_url: &str,
    ) -> RepositoryResult<i64>;
    async fn campaigns_for(&self, party_id: i64) -> RepositoryResult<Vec<Campaign>>;
    async fn list_campaigns_with_party(&self) -> RepositoryResult<Vec<CampaignWithParty>>;
}

pub struct SqlitePartyRepository {
    pool: SqlitePool,
}

impl SqlitePartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PartyRepository for SqlitePartyRepository {
    async fn create_party(
        &self,
        name: &str,
        description: &str,
        logo_url: &str,
        created_by: i64,
    ) -> RepositoryResult<i64> {
        let result = sqlx::query(
            "INSERT INTO parties (name, description, logo_url, created_by) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(logo_url)
        .bind(created_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => Ok(res.last_insert_rowid()),
            Err(e) => Err(map_constraint_violation(e)),
        }
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Party>> {
        let party = sqlx::query_as::<_, Party>(
            "SELECT id, name, description, logo_url, created_by, created_at
             FROM parties
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(party)
    }

    async fn find_by_creator(&self, user_id: i64) -> RepositoryResult<Option<Party>> {
        let party = sqlx::query_as::<_, Party>(
            "SELECT id, name, description, logo_url, created_by, created_at
             FROM parties
             WHERE created_by = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(party)
    }

    async fn name_exists(&self, name: &str) -> RepositoryResult<bool> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parties WHERE name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    async fn update_party(
        &self,
        id: i64,
        description: Option<String>,
        logo_url: Option<String>,
    ) -> RepositoryResult<()> {
        // COALESCE keeps the stored value for fields the caller omitted.
        let result = sqlx::query(
            "UPDATE parties
             SET description = COALESCE(?, description),
                 logo_url = COALESCE(?, logo_url)
             WHERE id = ?",
        )
        .bind(description)
        .bind(logo_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_party(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM parties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_with_votes(&self) -> RepositoryResult<Vec<PartySummary>> {
        let parties = sqlx::query_as::<_, PartySummary>(
            "SELECT p.id, p.name, p.description, p.logo_url, COUNT(v.id) AS vote_count
             FROM parties p
             LEFT JOIN votes v ON v.party_id = p.id
             GROUP BY p.id
             ORDER BY p.name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(parties)
    }

    async fn list_admin(&self) -> RepositoryResult<Vec<PartyAdminRow>> {
        let parties = sqlx::query_as::<_, PartyAdminRow>(
            "SELECT p.id, p.name, p.description, p.logo_url, p.created_by, p.created_at,
                    u.name AS creator_name, u.email AS creator_email,
                    COUNT(v.id) AS vote_count
             FROM parties p
             JOIN users u ON u.id = p.created_by
             LEFT JOIN votes v ON v.party_id = p.id
             GROUP BY p.id
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(parties)
    }

    async fn profile_for(&self, user_id: i64) -> RepositoryResult<Option<PartyProfile>> {
        let profile = sqlx::query_as::<_, PartyProfile>(
            "SELECT p.id, p.name, p.description, p.logo_url, p.created_at,
                    COUNT(v.id) AS vote_count
             FROM parties p
             LEFT JOIN votes v ON v.party_id = p.id
             WHERE p.created_by = ?
             GROUP BY p.id",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn count_all(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parties")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn vote_count(&self, party_id: i64) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes WHERE party_id = ?")
            .bind(party_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_campaign(
        &self,
        party_id: i64,
        title: &str,
        description: &str,
        image_url: &str,
    ) -> RepositoryResult<i64> {
        let result = sqlx::query(
            "INSERT INTO campaigns (party_id, title, description, image_url) VALUES (?, ?, ?, ?)",
        )
        .bind(party_id)
        .bind(title)
        .bind(description)
        .bind(image_url)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => Ok(res.last_insert_rowid()),
            Err(e) => Err(map_constraint_violation(e)),
        }
    }

    async fn campaigns_for(&self, party_id: i64) -> RepositoryResult<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT id, title, description, image_url, created_at
             FROM campaigns
             WHERE party_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(party_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    async fn list_campaigns_with_party(&self) -> RepositoryResult<Vec<CampaignWithParty>> {
        let campaigns = sqlx::query_as::<_, CampaignWithParty>(
            "SELECT c.id, c.party_id, c.title, c.description, c.image_url, c.created_at,
                    p.name AS party_name
             FROM campaigns c
             JOIN parties p ON p.id = c.party_id
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }
}
