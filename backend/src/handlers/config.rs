use axum::{extract::State, Json};
use serde::Serialize;

use crate::{config::SinkDelivery, state::AppState};

/// Settings the check-in page needs to render countdowns and messages.
#[derive(Debug, Serialize)]
pub struct PublicConfigResponse {
    pub time_zone: String,
    pub token_ttl_seconds: i64,
    pub consume_on_validate: bool,
    pub background_delivery: bool,
}

pub async fn get_public_config(State(state): State<AppState>) -> Json<PublicConfigResponse> {
    let config = &state.config;
    Json(PublicConfigResponse {
        time_zone: config.time_zone.to_string(),
        token_ttl_seconds: config.token_ttl.as_secs(),
        consume_on_validate: config.consume_on_validate,
        background_delivery: config.sink_delivery == SinkDelivery::Background,
    })
}
