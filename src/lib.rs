//! # Docbroker
//!
//! Brokers access to a MongoDB instance: a health check, connection probes against
//! arbitrary connection strings, and idempotent first-run setup of the required
//! collections plus a seed admin record.
//!
//! Routes are mounted under `/api`:
//!
//! - `GET /api/health`
//! - `GET /api/db/status?uri=<connection string>`
//! - `POST /api/db/init` with an optional `{"uri": "..."}` body

use rocket::http::Method;
use rocket::{Build, Rocket, catchers};
use rocket_cors::{AllowedOrigins, CorsOptions};

use crate::config::AppConfig;
use crate::db::ConnectionManager;

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod setup;

/// Assembles the Rocket instance with its managed state, CORS and catchers.
pub fn build(
    config: AppConfig,
    connections: ConnectionManager,
) -> Result<Rocket<Build>, rocket_cors::Error> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .to_cors()?;

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port));

    Ok(rocket::custom(figment)
        .manage(config)
        .manage(connections)
        .attach(cors)
        .register("/", catchers![handlers::catch404, handlers::catch500])
        .mount("/api", handlers::health::routes())
        .mount("/api", handlers::database::routes()))
}
