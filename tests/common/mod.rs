#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use docbroker::config::{AppConfig, ConnectionTarget};
use docbroker::db::{ClientHandle, ConnectionManager, Connector, DocumentStore};
use docbroker::errors::ServiceError;
use mongodb::bson::Document;

pub const VERSION: &str = "7.0.4";

/// In-memory database. Collections map to their documents.
pub struct MemoryStore {
    name: String,
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    fail_create: Mutex<Option<String>>,
    unlisted: Mutex<HashSet<String>>,
    version: Mutex<String>,
}

impl MemoryStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            collections: Mutex::new(BTreeMap::new()),
            fail_create: Mutex::new(None),
            unlisted: Mutex::new(HashSet::new()),
            version: Mutex::new(VERSION.to_string()),
        }
    }

    pub fn set_version(&self, version: &str) {
        *self.version.lock().unwrap() = version.to_string();
    }

    /// Creates `name` behind the next listing's back, as a concurrent run would.
    pub fn create_unlisted(&self, name: &str) {
        self.with_collection(name, Vec::new());
        self.unlisted.lock().unwrap().insert(name.to_string());
    }

    pub fn with_collection(&self, name: &str, documents: Vec<Document>) {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), documents);
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections.lock().unwrap().keys().cloned().collect()
    }

    pub fn fail_on_create(&self, collection: &str) {
        *self.fail_create.lock().unwrap() = Some(collection.to_string());
    }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn server_version(&self) -> Result<String, ServiceError> {
        Ok(self.version.lock().unwrap().clone())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, ServiceError> {
        let hidden: Vec<String> = self.unlisted.lock().unwrap().drain().collect();
        Ok(self
            .collection_names()
            .into_iter()
            .filter(|name| !hidden.contains(name))
            .collect())
    }

    async fn create_collection(&self, name: &str) -> Result<bool, ServiceError> {
        if self.fail_create.lock().unwrap().as_deref() == Some(name) {
            return Err(ServiceError::Database(format!("cannot create {name}")));
        }

        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(name) {
            return Ok(false);
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(true)
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, ServiceError> {
        Ok(self.documents(collection).len() as u64)
    }

    async fn insert_document(&self, collection: &str, document: Document) -> Result<(), ServiceError> {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }
}

/// Hands out one shared [`MemoryStore`] per connection string.
#[derive(Default)]
pub struct MemoryConnector {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
    unreachable: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    connects: AtomicUsize,
    timeouts: Mutex<Vec<Option<Duration>>>,
}

impl MemoryConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn store(&self, uri: &str) -> Arc<MemoryStore> {
        let mut stores = self.stores.lock().unwrap();
        Arc::clone(
            stores
                .entry(uri.to_string())
                .or_insert_with(|| Arc::new(MemoryStore::new(&db_name(uri)))),
        )
    }

    pub fn set_unreachable(&self, uri: &str, unreachable: bool) {
        let mut set = self.unreachable.lock().unwrap();
        if unreachable {
            set.insert(uri.to_string());
        } else {
            set.remove(uri);
        }
    }

    pub fn set_hanging(&self, uri: &str) {
        self.hanging.lock().unwrap().insert(uri.to_string());
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn timeouts(&self) -> Vec<Option<Duration>> {
        self.timeouts.lock().unwrap().clone()
    }
}

fn db_name(uri: &str) -> String {
    uri.split_once("://")
        .and_then(|(_, rest)| rest.split_once('/'))
        .map(|(_, path)| path.split('?').next().unwrap_or_default().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "domain_manager".to_string())
}

#[rocket::async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        target: &ConnectionTarget,
        timeout: Option<Duration>,
    ) -> Result<ClientHandle, ServiceError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.timeouts.lock().unwrap().push(timeout);

        if self.hanging.lock().unwrap().contains(target.as_str()) {
            std::future::pending::<()>().await;
        }

        if self.unreachable.lock().unwrap().contains(target.as_str()) {
            return Err(ServiceError::Connection(
                "Server selection timeout: No available servers".to_string(),
            ));
        }

        let store: ClientHandle = self.store(target.as_str());
        Ok(store)
    }
}

pub fn config_with(uri: Option<&str>) -> AppConfig {
    AppConfig {
        mongodb_uri: uri.and_then(ConnectionTarget::parse),
        ..AppConfig::default()
    }
}

pub fn manager(connector: &Arc<MemoryConnector>, config: &AppConfig) -> ConnectionManager {
    let connector: Arc<dyn Connector> = connector.clone();
    ConnectionManager::new(connector, config)
}
