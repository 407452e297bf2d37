use rocket::Request;
use rocket::catch;
use rocket::http::Status;
use rocket::serde::json::{Json, Value, json};

pub mod database;
pub mod health;

#[catch(404)]
pub fn catch404(_req: &Request) -> Json<Value> {
    Json(json!({
        "error": "API endpoint not found",
        "status": Status::NotFound.code
    }))
}

#[catch(500)]
pub fn catch500(_req: &Request) -> Json<Value> {
    Json(json!({
        "error": "Internal server error",
        "status": Status::InternalServerError.code
    }))
}
