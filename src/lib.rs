pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<services::AuthService>,
    pub voter_service: Arc<services::VoterService>,
    pub party_service: Arc<services::PartyService>,
    pub admin_service: Arc<services::AdminService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wires repositories and services over one shared pool.
    pub fn new(pool: sqlx::SqlitePool, file_storage: Arc<storage::FileStorage>) -> Self {
        use repositories::{
            SqliteAuditRepository, SqlitePartyRepository, SqliteUserRepository,
            SqliteVoteRepository,
        };

        let users: Arc<dyn repositories::UserRepository> =
            Arc::new(SqliteUserRepository::new(pool.clone()));
        let parties: Arc<dyn repositories::PartyRepository> =
            Arc::new(SqlitePartyRepository::new(pool.clone()));
        let votes: Arc<dyn repositories::VoteRepository> =
            Arc::new(SqliteVoteRepository::new(pool.clone()));
        let audit_repo: Arc<dyn repositories::AuditRepository> =
            Arc::new(SqliteAuditRepository::new(pool.clone()));

        let audit = Arc::new(services::AuditLogger::new(audit_repo));

        Self {
            auth_service: Arc::new(services::AuthService::new(users.clone(), audit.clone())),
            voter_service: Arc::new(services::VoterService::new(
                users.clone(),
                parties.clone(),
                votes.clone(),
                file_storage.clone(),
                audit.clone(),
            )),
            party_service: Arc::new(services::PartyService::new(
                parties.clone(),
                file_storage.clone(),
                audit.clone(),
            )),
            admin_service: Arc::new(services::AdminService::new(
                users,
                parties,
                votes,
                file_storage,
                audit,
            )),
            pool,
        }
    }
}

/// Assembles the full API router. The session layer is applied by the
/// caller so the server and tests can configure cookies differently.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth_handlers::register))
        .route("/login", post(handlers::auth_handlers::login))
        .route(
            "/logout",
            post(handlers::auth_handlers::logout)
                .layer(middleware::from_fn(auth::require_login)),
        )
        .route("/session", get(handlers::auth_handlers::session_info));

    // Listings are open to any logged-in role; casting and status are
    // voter-only.
    let voter_routes = Router::new()
        .route(
            "/parties",
            get(handlers::voter_handlers::list_parties)
                .layer(middleware::from_fn(auth::require_login)),
        )
        .route(
            "/campaigns",
            get(handlers::voter_handlers::list_campaigns)
                .layer(middleware::from_fn(auth::require_login)),
        )
        .route(
            "/vote",
            post(handlers::voter_handlers::cast_vote)
                .layer(middleware::from_fn(auth::require_voter)),
        )
        .route(
            "/status",
            get(handlers::voter_handlers::status)
                .layer(middleware::from_fn(auth::require_voter)),
        );

    let party_routes = Router::new()
        .route("/profile", get(handlers::party_handlers::get_profile))
        .route("/create", post(handlers::party_handlers::create_party))
        .route("/update", put(handlers::party_handlers::update_party))
        .route("/campaign", post(handlers::party_handlers::create_campaign))
        .route(
            "/campaign/upload",
            post(handlers::party_handlers::upload_campaign_image),
        )
        .route(
            "/logo/upload",
            post(handlers::party_handlers::upload_party_logo),
        )
        .route("/campaigns", get(handlers::party_handlers::list_campaigns))
        .route("/votes", get(handlers::party_handlers::vote_count))
        .layer(middleware::from_fn(auth::require_party));

    let admin_routes = Router::new()
        .route("/stats", get(handlers::admin_handlers::stats))
        .route("/users", get(handlers::admin_handlers::list_users))
        .route("/parties", get(handlers::admin_handlers::list_parties))
        .route("/user/{id}", delete(handlers::admin_handlers::delete_user))
        .route(
            "/party/{id}",
            delete(handlers::admin_handlers::delete_party),
        )
        .route("/logs", get(handlers::admin_handlers::logs))
        .route("/reset", post(handlers::admin_handlers::reset_election))
        .route(
            "/export/users",
            get(handlers::admin_handlers::export_users),
        )
        .route(
            "/export/parties",
            get(handlers::admin_handlers::export_parties),
        )
        .route(
            "/export/votes",
            get(handlers::admin_handlers::export_votes),
        )
        .route("/export/logs", get(handlers::admin_handlers::export_logs))
        .layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/voter", voter_routes)
        .nest("/api/party", party_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
