use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    LatencyUnit,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod error;
pub mod routes;

/// Builds the router with request limits and tracing applied.
pub fn app(app_state: config::AppState) -> Router {
    let request_timeout_in_ms = app_state.env_vars.request_timeout_in_ms;
    let request_body_size_limit = app_state.env_vars.request_body_size_limit;

    Router::new()
        .route("/status/ping", get(routes::get_status_ping))
        .route(
            "/question-bank/parse",
            post(routes::post_parse_question_bank),
        )
        .route("/exam/create", post(routes::post_create_exam))
        .route("/exam/submit", post(routes::post_submit_exam))
        .layer(TimeoutLayer::new(Duration::from_millis(
            request_timeout_in_ms,
        )))
        .layer(RequestBodyLimitLayer::new(request_body_size_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        .with_state(app_state)
}
