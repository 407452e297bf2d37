//! # Database access
//!
//! The rest of the crate talks to MongoDB through two narrow traits:
//!
//! - [`Connector`] opens a [`DocumentStore`] for a [`ConnectionTarget`]
//! - [`DocumentStore`] exposes the handful of calls the service needs
//!
//! [`ConnectionManager`] sits on top of a connector. It is built once at startup,
//! managed by Rocket, and owns the lazily created default client.

use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ConnectionTarget};
use crate::errors::ServiceError;

pub const CLIENT_TYPE: &str = "MongoDB";

/// Extra time a probe may take on top of its server selection timeout.
const PROBE_GRACE: Duration = Duration::from_secs(2);

/// A reusable, already established connection to one database.
pub type ClientHandle = Arc<dyn DocumentStore>;

#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the database this handle operates on.
    fn database_name(&self) -> &str;

    async fn ping(&self) -> Result<(), ServiceError>;

    async fn server_version(&self) -> Result<String, ServiceError>;

    async fn list_collection_names(&self) -> Result<Vec<String>, ServiceError>;

    /// `Ok(false)` when the collection already existed.
    async fn create_collection(&self, name: &str) -> Result<bool, ServiceError>;

    async fn count_documents(&self, collection: &str) -> Result<u64, ServiceError>;

    async fn insert_document(&self, collection: &str, document: Document) -> Result<(), ServiceError>;
}

#[rocket::async_trait]
pub trait Connector: Send + Sync {
    /// Opens a verified connection. `timeout` bounds server selection; `None` keeps the driver default.
    async fn connect(
        &self,
        target: &ConnectionTarget,
        timeout: Option<Duration>,
    ) -> Result<ClientHandle, ServiceError>;
}

pub struct MongoConnector {
    fallback_db_name: String,
}

impl MongoConnector {
    pub fn new(fallback_db_name: impl Into<String>) -> Self {
        Self {
            fallback_db_name: fallback_db_name.into(),
        }
    }
}

#[rocket::async_trait]
impl Connector for MongoConnector {
    async fn connect(
        &self,
        target: &ConnectionTarget,
        timeout: Option<Duration>,
    ) -> Result<ClientHandle, ServiceError> {
        let mut options = ClientOptions::parse(target.as_str())
            .await
            .map_err(ServiceError::connection)?;

        if let Some(timeout) = timeout {
            options.server_selection_timeout = Some(timeout);
            options.connect_timeout = Some(timeout);
        }

        let client = Client::with_options(options).map_err(ServiceError::connection)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&self.fallback_db_name));

        let store = MongoStore { client, database };
        store.ping().await?;

        debug!(uri = %target, db = store.database_name(), "mongodb connection verified");

        Ok(Arc::new(store))
    }
}

pub struct MongoStore {
    client: Client,
    database: Database,
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    fn database_name(&self) -> &str {
        self.database.name()
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(ServiceError::connection)?;

        Ok(())
    }

    async fn server_version(&self) -> Result<String, ServiceError> {
        let info = self
            .client
            .database("admin")
            .run_command(doc! { "buildInfo": 1 })
            .await
            .map_err(ServiceError::connection)?;

        Ok(info.get_str("version").unwrap_or("unknown").to_string())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, ServiceError> {
        self.database
            .list_collection_names()
            .await
            .map_err(ServiceError::database)
    }

    async fn create_collection(&self, name: &str) -> Result<bool, ServiceError> {
        match self.database.create_collection(name).await {
            Ok(()) => Ok(true),
            Err(e) if is_namespace_exists(&e) => Ok(false),
            Err(e) => Err(ServiceError::database(e)),
        }
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, ServiceError> {
        self.database
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(ServiceError::database)
    }

    async fn insert_document(&self, collection: &str, document: Document) -> Result<(), ServiceError> {
        self.database
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(ServiceError::database)?;

        Ok(())
    }
}

/// Server error code for a collection created concurrently by someone else.
const NAMESPACE_EXISTS: i32 = 48;

fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Command(command) if command.code == NAMESPACE_EXISTS
    )
}

/// Diagnostics gathered by a successful probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub client_type: String,
    pub db_version: String,
    pub db_name: String,
}

pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    default_target: Option<ConnectionTarget>,
    connect_timeout: Duration,
    probe_timeout: Duration,
    default_handle: OnceCell<ClientHandle>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, config: &AppConfig) -> Self {
        Self {
            connector,
            default_target: config.mongodb_uri.clone(),
            connect_timeout: config.connect_timeout,
            probe_timeout: config.probe_timeout,
            default_handle: OnceCell::new(),
        }
    }

    /// Manager backed by the real MongoDB driver.
    pub fn mongo(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(MongoConnector::new(config.fallback_db_name.clone())),
            config,
        )
    }

    pub fn has_default_target(&self) -> bool {
        self.default_target.is_some()
    }

    /// Returns the shared client for the configured target, connecting on first use.
    ///
    /// `None` means either that no target is configured or that connecting failed.
    /// Failures are logged and never cached, so a later call tries again. Concurrent
    /// callers wait on the same attempt instead of opening their own connections.
    /// While the target is unreachable, queued callers retry one after another, so
    /// the last of N waits up to N times the connect timeout.
    pub async fn get_default_handle(&self) -> Option<ClientHandle> {
        let target = self.default_target.as_ref()?;

        let result = self
            .default_handle
            .get_or_try_init(|| async {
                info!(uri = %target, "opening default mongodb connection");
                self.connector
                    .connect(target, Some(self.connect_timeout))
                    .await
            })
            .await;

        match result {
            Ok(handle) => Some(Arc::clone(handle)),
            Err(e) => {
                warn!(uri = %target, error = %e, "default mongodb connection failed");
                None
            }
        }
    }

    /// One-off connectivity check against `target`. Never touches the cached default handle.
    pub async fn probe(&self, target: &ConnectionTarget) -> Result<ProbeReport, ServiceError> {
        let attempt = async {
            let store = self.connector.connect(target, Some(self.probe_timeout)).await?;
            store.ping().await?;
            let version = store.server_version().await?;

            Ok::<_, ServiceError>(ProbeReport {
                client_type: CLIENT_TYPE.to_string(),
                db_version: if version.trim().is_empty() {
                    "unknown".to_string()
                } else {
                    version
                },
                db_name: store.database_name().to_string(),
            })
        };

        match tokio::time::timeout(self.probe_timeout + PROBE_GRACE, attempt).await {
            Ok(result) => result,
            Err(_) => {
                warn!(uri = %target, "mongodb probe timed out");
                Err(ServiceError::Connection(
                    "MongoDB connection timed out".to_string(),
                ))
            }
        }
    }

    /// Handle for an administrative operation on `target`.
    ///
    /// The configured default reuses the shared client; any other target gets a
    /// fresh connection without a shortened timeout.
    pub async fn handle_for(&self, target: &ConnectionTarget) -> Result<ClientHandle, ServiceError> {
        if self.default_target.as_ref() == Some(target)
            && let Some(handle) = self.get_default_handle().await
        {
            return Ok(handle);
        }

        self.connector.connect(target, None).await
    }
}
