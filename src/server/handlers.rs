use crate::core::models::{RefreshOutcome, TicketRecord};
use crate::server::AppState;
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

const TICKET_PAGE_HTML: &str = include_str!("page.html");

/// The current record plus the URL the QR image is served under.
#[derive(Debug, Serialize)]
pub struct TicketDataResponse {
    #[serde(flatten)]
    pub record: TicketRecord,
    pub qr_url: String,
}

#[derive(Serialize)]
pub struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn index() -> Html<&'static str> {
    Html(TICKET_PAGE_HTML)
}

/// Current record as JSON. Before the first refresh has ever run the store
/// is empty, so one is performed synchronously; the fallback path inside
/// `refresh` guarantees a record either way.
pub async fn ticket_data(State(state): State<AppState>) -> Json<TicketDataResponse> {
    let record = match state.store.get().await {
        Some(record) => record,
        None => {
            tracing::info!("No record yet, refreshing before first response");
            state.refresher.refresh().await.record
        }
    };

    Json(TicketDataResponse {
        record,
        qr_url: state.qr_url.clone(),
    })
}

/// Manual trigger: one synchronous refresh, outcome reported in the body.
/// Always 200; a failed scrape is a `success: false` payload, not an error
/// response.
pub async fn trigger_update(State(state): State<AppState>) -> Json<RefreshOutcome> {
    tracing::info!("Manual refresh triggered");
    Json(state.refresher.refresh().await)
}

pub async fn health_check() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "ok",
        service: "ticket-mirror",
    })
}
