use axum::{extract::State, Json};

use crate::{models::token::SessionResponse, state::AppState};

pub async fn current_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: state.service.current_session(),
    })
}

/// Starts a new session. Tokens already issued keep the session they were minted under.
pub async fn rotate_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: state.service.rotate_session(),
    })
}
