//! HTTP surface for the articles feed.
//! Routes bind requests, delegate to the core store and render the shared
//! JSON envelope; no domain rules live here.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;

use crate::config::HttpConfig;
use crate::error::ApiError;
use articles_feed_core::ArticleStore;
use axum::error_handling::HandleErrorLayer;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{BoxError, Router};
use log::{info, warn};
use std::time::Instant;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleStore,
    pub max_page_size: Option<i64>,
}

impl AppState {
    pub fn new(articles: ArticleStore, max_page_size: Option<i64>) -> Self {
        Self {
            articles,
            max_page_size,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(http.request_timeout)),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        warn!("event=http_request module=http status=error error_kind=timeout");
        ApiError::timeout()
    } else {
        warn!("event=http_request module=http status=error error={err}");
        ApiError::internal()
    }
}

/// Logs method, path, status and latency. Query strings are not logged.
async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let code = response.status();

    info!(
        "event=http_request module=http status={} method={} path={} code={} duration_ms={}",
        outcome(code),
        method,
        path,
        code.as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

/// `error` for 4xx and 5xx responses, `ok` otherwise.
fn outcome(code: StatusCode) -> &'static str {
    if code.is_client_error() || code.is_server_error() {
        "error"
    } else {
        "ok"
    }
}
