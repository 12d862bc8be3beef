use serde::Serialize;
use sqlx::FromRow;

/// The party a voter picked, shown on their status panel.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VotedParty {
    pub id: i64,
    pub name: String,
    pub voted_at: String,
}

/// Flattened row for the votes CSV export.
#[derive(Debug, Clone, FromRow)]
pub struct VoteExportRow {
    pub id: i64,
    pub voter_id: i64,
    pub voter_name: String,
    pub voter_email: String,
    pub party_id: i64,
    pub party_name: String,
    pub voted_at: String,
}
