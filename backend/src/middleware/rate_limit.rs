use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Response, StatusCode};
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};

use crate::config::Config;

pub type CheckInRateLimiter = GovernorLayer<SmartIpKeyExtractor, StateInformationMiddleware, Body>;

/// Per-IP limiter for routes that accept tokens, which slows down anyone
/// trying to guess live tokens. Returns `None` when disabled in config.
///
/// Clients are keyed by the forwarded address (`x-forwarded-for`,
/// `x-real-ip`, `forwarded`) and fall back to the peer address, matching
/// what [`Provenance`](crate::models::Provenance) records. The proxy in
/// front must overwrite these headers.
pub fn check_in_rate_limiter(config: &Config) -> anyhow::Result<Option<CheckInRateLimiter>> {
    let max_requests = config.rate_limit_check_in_max_requests;
    if max_requests == 0 {
        return Ok(None);
    }
    let window = Duration::from_secs(config.rate_limit_check_in_window_seconds.max(1));
    let replenish_every = (window / max_requests).max(Duration::from_millis(1));

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .period(replenish_every)
            .burst_size(max_requests)
            .key_extractor(SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid check-in rate limiter configuration"))?,
    );

    Ok(Some(
        GovernorLayer::new(governor_conf).error_handler(rate_limit_error_handler),
    ))
}

fn rate_limit_error_handler(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::warn!(wait_time, "Check-in rate limit exceeded");
            let mut response = json_error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many check-in attempts. Please try again later.",
                Some(wait_time),
            );
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => json_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "RATE_LIMIT_KEY_ERROR",
            "Unable to determine request identity.",
            None,
        ),
        GovernorError::Other { code, msg, headers } => {
            let mut response = json_error_response(
                code,
                "RATE_LIMIT_ERROR",
                &msg.unwrap_or_else(|| "Rate limit error".to_string()),
                None,
            );
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
    }
}

// Same body shape as `AppError` responses.
fn json_error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    retry_after: Option<u64>,
) -> Response<Body> {
    let mut body = serde_json::json!({
        "error": message,
        "code": code,
    });
    if let Some(retry_after) = retry_after {
        body["details"] = serde_json::json!({ "retry_after": retry_after });
    }

    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(retry_after) = retry_after {
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert("retry-after", value);
        }
    }
    response
}
