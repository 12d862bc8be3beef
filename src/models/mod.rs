pub mod audit;
pub mod campaign;
pub mod party;
pub mod user;
pub mod vote;

pub use audit::LogEntry;
pub use campaign::{Campaign, CampaignWithParty};
pub use party::{Party, PartyAdminRow, PartyProfile, PartySummary};
pub use user::{Role, User};
pub use vote::{VoteExportRow, VotedParty};
