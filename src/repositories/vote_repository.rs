use crate::models::{VoteExportRow, VotedParty};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{map_constraint_violation, RepositoryResult};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait VoteRepository: Send + Sync {
    /// Records a vote and flips the voter's has_voted flag in one
    /// transaction. The UNIQUE index on voter_id makes a second vote
    /// fail with `AlreadyExists` no matter how the requests interleave.
    async fn cast_vote(&self, voter_id: i64, party_id: i64) -> RepositoryResult<i64>;
    async fn voted_party(&self, voter_id: i64) -> RepositoryResult<Option<VotedParty>>;
    async fn count_all(&self) -> RepositoryResult<i64>;
    async fn export_rows(&self) -> RepositoryResult<Vec<VoteExportRow>>;
    /// Deletes every vote and clears all has_voted flags atomically.
    /// Returns the number of votes removed.
    async fn reset_all(&self) -> RepositoryResult<u64>;
}

pub struct SqliteVoteRepository {
    pool: SqlitePool,
}

impl SqliteVoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteRepository for SqliteVoteRepository {
    async fn cast_vote(&self, voter_id: i64, party_id: i64) -> RepositoryResult<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO votes (voter_id, party_id) VALUES (?, ?)")
            .bind(voter_id)
            .bind(party_id)
            .execute(&mut *tx)
            .await;

        let vote_id = match result {
            Ok(res) => res.last_insert_rowid(),
            Err(e) => return Err(map_constraint_violation(e)),
        };

        sqlx::query("UPDATE users SET has_voted = TRUE WHERE id = ?")
            .bind(voter_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(vote_id)
    }

    async fn voted_party(&self, voter_id: i64) -> RepositoryResult<Option<VotedParty>> {
        let party = sqlx::query_as::<_, VotedParty>(
            "SELECT p.id, p.name, v.voted_at
             FROM votes v
             JOIN parties p ON p.id = v.party_id
             WHERE v.voter_id = ?",
        )
        .bind(voter_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(party)
    }

    async fn count_all(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn export_rows(&self) -> RepositoryResult<Vec<VoteExportRow>> {
        let rows = sqlx::query_as::<_, VoteExportRow>(
            "SELECT v.id, v.voter_id, u.name AS voter_name, u.email AS voter_email,
                    v.party_id, p.name AS party_name, v.voted_at
             FROM votes v
             JOIN users u ON u.id = v.voter_id
             JOIN parties p ON p.id = v.party_id
             ORDER BY v.voted_at DESC, v.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn reset_all(&self) -> RepositoryResult<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM votes").execute(&mut *tx).await?;

        sqlx::query("UPDATE users SET has_voted = FALSE")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(deleted.rows_affected())
    }
}
