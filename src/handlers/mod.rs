pub mod admin_handlers;
pub mod auth_handlers;
pub mod party_handlers;
pub mod voter_handlers;

use axum::response::Json;
use serde_json::{json, Value};

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Online Voting System API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": ["/api/auth", "/api/voter", "/api/party", "/api/admin"],
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
