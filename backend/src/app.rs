use axum::{
    body::Body,
    http::Request,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, state::AppState, utils::redact::redact_path};

pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Routes that accept a token are rate limited per client IP.
    let mut token_routes = Router::new()
        .route("/api/check-in", post(handlers::check_in::check_in))
        .route(
            "/api/tokens/{token}/validate",
            get(handlers::tokens::validate_token),
        );
    if let Some(limiter) = middleware::check_in_rate_limiter(&state.config)? {
        token_routes = token_routes.layer(limiter);
    }

    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/api/config", get(handlers::config::get_public_config))
        .route(
            "/api/tokens/generate",
            get(handlers::tokens::generate_token),
        )
        .route(
            "/api/sessions/current",
            get(handlers::sessions::current_session),
        )
        .route(
            "/api/sessions/rotate",
            post(handlers::sessions::rotate_session),
        );

    let app = Router::new()
        .merge(public_routes)
        .merge(token_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %redact_path(request.uri().path()),
                        )
                    }),
                )
                .layer(axum_middleware::from_fn(middleware::log_error_responses))
                .layer(middleware::cors_layer(&state.config)),
        )
        .with_state(state);

    Ok(app)
}
