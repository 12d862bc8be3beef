use ballotbox::{
    build_router,
    config::{
        session::{validate_production_config, SessionConfig},
        AppConfig,
    },
    db,
    storage::FileStorage,
    AppState,
};

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ballotbox=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // File storage for logos and campaign images
    let file_storage = Arc::new(FileStorage::new(
        config.upload_dir.clone(),
        config.public_base_url.clone(),
    ));

    let app_state = AppState::new(pool.clone(), file_storage);

    // Session store
    validate_production_config();
    let session_store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .expect("Invalid session table name for sessions");
    session_store.migrate().await?;

    let session_layer = SessionConfig::from_env().create_layer(session_store);

    // CORS: explicit origins with credentials so the session cookie works.
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors_layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let app: Router = build_router(app_state)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(session_layer)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
