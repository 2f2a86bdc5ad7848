use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppError,
    models::token::{TokenIssuance, TokenValidationResponse},
    state::AppState,
};

pub async fn generate_token(State(state): State<AppState>) -> Json<TokenIssuance> {
    Json(state.service.issue_token())
}

/// Standalone validity check. Whether it spends the token is configured by
/// `CONSUME_ON_VALIDATE`.
pub async fn validate_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<TokenValidationResponse>, AppError> {
    let consume = state.config.consume_on_validate;
    let session_id = state.service.validate_token(&token, consume)?;

    Ok(Json(TokenValidationResponse {
        status: "success".to_string(),
        session_id,
        consumed: consume,
    }))
}
