use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub created_at: String,
}

/// Feed row for the voter dashboard, annotated with the owning party.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignWithParty {
    pub id: i64,
    pub party_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub created_at: String,
    pub party_name: String,
}
