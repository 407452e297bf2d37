use mongodb::bson::{self, DateTime as BsonDateTime, Document};
use rocket::Request;
use rocket::http::Status;
use rocket::response::{self, Responder};
use serde::{Deserialize, Serialize};

use crate::db::ProbeReport;
use crate::errors::{ServiceError, json_response};

/// Default administrative account written on first initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRecord {
    pub email: String,
    /// Placeholder value, not a real credential hash.
    pub password: String,
    pub role: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

impl SeedRecord {
    pub fn admin() -> Self {
        Self {
            email: "admin@example.com".to_string(),
            password: "hashed_password".to_string(),
            role: "admin".to_string(),
            name: "Admin User".to_string(),
            created_at: BsonDateTime::now(),
        }
    }

    pub fn to_document(&self) -> Result<Document, ServiceError> {
        Ok(bson::to_document(self)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitRequest {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub env: String,
    pub has_mongo_uri: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStatusResponse {
    pub status: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<ProbeReport>,
}

impl DbStatusResponse {
    pub fn connected(diagnostics: ProbeReport) -> Self {
        Self {
            status: "ok".to_string(),
            connected: true,
            message: None,
            status_code: Status::Ok.code,
            diagnostics: Some(diagnostics),
        }
    }
}

impl From<ServiceError> for DbStatusResponse {
    fn from(err: ServiceError) -> Self {
        Self {
            status: "error".to_string(),
            connected: false,
            status_code: err.status_code(),
            message: Some(err.to_string()),
            diagnostics: None,
        }
    }
}

impl<'r> Responder<'r, 'static> for DbStatusResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        json_response(Status::new(self.status_code), &self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInitResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
    pub status_code: u16,
}

impl DbInitResponse {
    pub fn initialized(collections: Vec<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: "Database initialized successfully".to_string(),
            collections: Some(collections),
            status_code: Status::Ok.code,
        }
    }
}

impl From<ServiceError> for DbInitResponse {
    fn from(err: ServiceError) -> Self {
        Self {
            status: "error".to_string(),
            status_code: err.status_code(),
            message: err.to_string(),
            collections: None,
        }
    }
}

impl<'r> Responder<'r, 'static> for DbInitResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        json_response(Status::new(self.status_code), &self)
    }
}
