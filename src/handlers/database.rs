use rocket::serde::json::Json;
use rocket::{State, get, post, routes};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::ConnectionManager;
use crate::models::{DbInitResponse, DbStatusResponse, InitRequest};
use crate::setup;

#[get("/db/status?<uri>")]
pub async fn status(
    config: &State<AppConfig>,
    connections: &State<ConnectionManager>,
    uri: Option<String>,
) -> DbStatusResponse {
    let target = match config.resolve_target(uri.as_deref()) {
        Ok(target) => target,
        Err(e) => {
            warn!(error = %e, "db status requested without a connection string");
            return e.into();
        }
    };

    match connections.probe(&target).await {
        Ok(diagnostics) => {
            info!(
                uri = %target,
                version = %diagnostics.db_version,
                db = %diagnostics.db_name,
                "db status probe succeeded"
            );
            DbStatusResponse::connected(diagnostics)
        }
        Err(e) => {
            warn!(uri = %target, error = %e, "db status probe failed");
            e.into()
        }
    }
}

/// A missing or malformed body is treated as "no override".
#[post("/db/init", data = "<body>")]
pub async fn init(
    config: &State<AppConfig>,
    connections: &State<ConnectionManager>,
    body: Option<Json<InitRequest>>,
) -> DbInitResponse {
    let request = body.map(Json::into_inner).unwrap_or_default();

    match setup::initialize_target(config, connections, request.uri.as_deref()).await {
        Ok(report) => {
            info!(
                created = ?report.created,
                seeded = report.seeded,
                "database initialization finished"
            );
            DbInitResponse::initialized(report.collections)
        }
        Err(e) => {
            warn!(error = %e, "database initialization failed");
            e.into()
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![status, init]
}
