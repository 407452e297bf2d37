use rocket::http::{ContentType, Status};
use rocket::response::{self, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No connection target could be resolved from the request or the environment.
    #[error("{0}")]
    Configuration(String),
    /// Establishing or probing a connection failed.
    #[error("{0}")]
    Connection(String),
    /// A read or write failed after the connection was up.
    #[error("{0}")]
    Database(String),
}

impl ServiceError {
    pub fn connection(err: mongodb::error::Error) -> Self {
        ServiceError::Connection(err.to_string())
    }

    pub fn database(err: mongodb::error::Error) -> Self {
        ServiceError::Database(err.to_string())
    }

    /// Reclassifies connection failures as database failures, keeping the message.
    pub fn into_database(self) -> Self {
        match self {
            ServiceError::Connection(message) => ServiceError::Database(message),
            other => other,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ServiceError::Configuration(_) => Status::BadRequest,
            ServiceError::Connection(_) | ServiceError::Database(_) => Status::InternalServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status().code
    }
}

impl From<mongodb::bson::ser::Error> for ServiceError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ServiceError::Database(err.to_string())
    }
}

/// Serializes `body` and sends it with the given status and a JSON content type.
pub fn json_response<T: Serialize>(status: Status, body: &T) -> response::Result<'static> {
    let body = serde_json::to_string(body).map_err(|_| Status::InternalServerError)?;

    Response::build()
        .status(status)
        .header(ContentType::JSON)
        .sized_body(body.len(), std::io::Cursor::new(body))
        .ok()
}
