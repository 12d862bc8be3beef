pub mod admin_service;
pub mod audit_service;
pub mod auth_service;
pub mod party_service;
pub mod voter_service;

pub use admin_service::AdminService;
pub use audit_service::AuditLogger;
pub use auth_service::AuthService;
pub use party_service::PartyService;
pub use voter_service::VoterService;
