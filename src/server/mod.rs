mod handlers;

use crate::core::store::TicketStore;
use crate::refresher::{Refresher, QR_FILE_NAME};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use handlers::TicketDataResponse;

/// Shared handler state: the refresher for manual triggers, the store for
/// reads, and the URL the QR image is served under.
#[derive(Clone)]
pub struct AppState {
    pub refresher: Arc<Refresher>,
    pub store: TicketStore,
    pub qr_url: String,
}

impl AppState {
    pub fn new(refresher: Arc<Refresher>, store: TicketStore) -> Self {
        Self {
            refresher,
            store,
            qr_url: format!("/static/{QR_FILE_NAME}"),
        }
    }
}

pub fn create_routes(state: AppState, data_dir: &Path) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/ticket-data", get(handlers::ticket_data))
        // both trigger spellings hit the same refresh
        .route("/api/update-ticket", post(handlers::trigger_update))
        .route("/api/force-update", post(handlers::trigger_update))
        .route("/health", get(handlers::health_check))
        .nest_service("/static", ServeDir::new(data_dir))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
