//! HTTP surface for the catalog and vendor price nodes
//!
//! Routes:
//! - `GET|PUT /categories`, `GET /categories/:id`
//! - `GET|POST /vendors`
//! - `POST /vendor-price-nodes/sync` and the node queries under `/vendor-price-nodes`
//! - `GET|POST /sheets/:categoryName/rows`, `DELETE /sheets/:categoryName/rows/:rowId`

pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiResult};
pub use router::pricetree_router;
pub use state::{AppState, ServerConfig};

use tokio::net::TcpListener;
use tracing::info;

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }
    axum::serve(listener, pricetree_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
