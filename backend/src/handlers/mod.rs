use axum::Json;
use serde_json::{json, Value};

pub mod check_in;
pub mod config;
pub mod sessions;
pub mod tokens;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Attendance API is running" }))
}
