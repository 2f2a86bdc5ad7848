use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    config::SinkDelivery,
    error::AppError,
    models::{
        attendance::{CheckInRequest, CheckInResponse, DeliveryState},
        Provenance,
    },
    state::AppState,
};

pub async fn check_in(
    State(state): State<AppState>,
    provenance: Provenance,
    Json(payload): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>), AppError> {
    payload.validate()?;

    let pending = state
        .service
        .begin_check_in(&payload.token, &payload.student_id, provenance)?;

    match state.config.sink_delivery {
        SinkDelivery::Awaited => {
            let record = pending.deliver().await?;
            Ok((
                StatusCode::CREATED,
                Json(CheckInResponse {
                    delivery: DeliveryState::Recorded,
                    record,
                }),
            ))
        }
        SinkDelivery::Background => {
            // Sink failures from here on are only visible in the logs.
            let (record, _handle) = pending.submit();
            Ok((
                StatusCode::ACCEPTED,
                Json(CheckInResponse {
                    delivery: DeliveryState::Submitted,
                    record,
                }),
            ))
        }
    }
}
