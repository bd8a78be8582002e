//! Router setup.

use axum::error_handling::HandleErrorLayer;
use axum::extract::OriginalUri;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::routes;
use crate::state::AppState;

/// Creates the pricing API router.
///
/// The request timeout only wraps reads. A write that has reached the store
/// commits whether or not the caller is still waiting, so writes are never
/// cut off with an error response.
pub fn pricetree_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;
    let concurrency_limit = state.config.concurrency_limit;

    let reads = Router::new()
        .merge(routes::categories::routes())
        .merge(routes::vendors::routes())
        .merge(routes::price_nodes::routes())
        .merge(routes::sheets::routes())
        .route("/health", axum::routing::get(|| async { "ok" }));

    let reads = match request_timeout {
        Some(timeout) => reads.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(timeout)),
        ),
        None => reads,
    };

    let router = reads
        .merge(routes::categories::writes())
        .merge(routes::vendors::writes())
        .merge(routes::price_nodes::writes())
        .merge(routes::sheets::writes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http());

    let router = match concurrency_limit {
        Some(limit) => router.layer(ConcurrencyLimitLayer::new(limit)),
        None => router,
    };

    router.with_state(state)
}

async fn not_found(uri: OriginalUri) -> ApiError {
    ApiError::not_found(format!("not found: {}", uri.0.path()))
}

async fn handle_timeout_error(_err: tower::BoxError) -> ApiError {
    ApiError::Timeout {
        message: "Request timed out".to_string(),
    }
}
