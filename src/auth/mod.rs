pub mod middleware;
pub mod session;

pub use middleware::{require_admin, require_login, require_party, require_voter};
pub use session::SessionUser;
