//! First-run schema setup: required collections plus the seed admin record.
//!
//! Safe to re-run. Collections that already exist are skipped and the seed is only
//! written while `users` is empty. Nothing is rolled back on failure.
//!
//! Two concurrent first runs can both see an empty `users` collection and insert a
//! seed each; no lock guards against that.

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::db::{ConnectionManager, DocumentStore};
use crate::errors::ServiceError;
use crate::models::SeedRecord;

pub const USERS_COLLECTION: &str = "users";

pub const REQUIRED_COLLECTIONS: [&str; 5] = [USERS_COLLECTION, "domains", "files", "notes", "seo_analysis"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// Collections created by this run, in creation order.
    pub created: Vec<String>,
    pub seeded: bool,
    /// Every collection present once the run finished, sorted.
    pub collections: Vec<String>,
}

pub async fn initialize(store: &dyn DocumentStore) -> Result<InitReport, ServiceError> {
    let existing = store.list_collection_names().await?;
    debug!(db = store.database_name(), existing = ?existing, "listed collections");

    let mut created = Vec::new();
    for name in REQUIRED_COLLECTIONS {
        if existing.iter().any(|c| c == name) {
            continue;
        }

        if store.create_collection(name).await? {
            info!(db = store.database_name(), collection = name, "created collection");
            created.push(name.to_string());
        } else {
            debug!(db = store.database_name(), collection = name, "collection appeared concurrently");
        }
    }

    let users = store.count_documents(USERS_COLLECTION).await?;
    let seeded = users == 0;
    if seeded {
        let record = SeedRecord::admin();
        store
            .insert_document(USERS_COLLECTION, record.to_document()?)
            .await?;
        info!(db = store.database_name(), email = %record.email, "inserted seed admin record");
    }

    let mut collections = store.list_collection_names().await?;
    collections.sort();

    Ok(InitReport {
        created,
        seeded,
        collections,
    })
}

/// Resolves the target, connects, and runs [`initialize`].
///
/// Driver failures of any kind come back as [`ServiceError::Database`].
pub async fn initialize_target(
    config: &AppConfig,
    connections: &ConnectionManager,
    explicit: Option<&str>,
) -> Result<InitReport, ServiceError> {
    let target = config.resolve_target(explicit)?;
    info!(uri = %target, "initializing database");

    let store = connections
        .handle_for(&target)
        .await
        .map_err(ServiceError::into_database)?;

    initialize(store.as_ref())
        .await
        .map_err(ServiceError::into_database)
}
