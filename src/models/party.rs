use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Party {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub created_by: i64,
    pub created_at: String,
}

/// Voter-facing listing row with the live tally.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartySummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub vote_count: i64,
}

/// A party's own profile as shown on its dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartyProfile {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub created_at: String,
    pub vote_count: i64,
}

/// Admin listing row joining creator details and the tally.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartyAdminRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub created_by: i64,
    pub created_at: String,
    pub creator_name: String,
    pub creator_email: String,
    pub vote_count: i64,
}
