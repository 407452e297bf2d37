use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{State, get, routes};

use crate::config::AppConfig;
use crate::db::ConnectionManager;
use crate::models::HealthResponse;

/// Liveness only. Never touches the database.
#[get("/health")]
pub async fn health(
    config: &State<AppConfig>,
    connections: &State<ConnectionManager>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        env: config.env.clone(),
        has_mongo_uri: connections.has_default_target(),
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![health]
}
