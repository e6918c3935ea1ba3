//! End-to-end tests over real listeners: a fixture upstream serves the
//! ticket page on loopback and the full fetch-extract-persist-serve cycle
//! runs against it.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use ticket_mirror::refresher::ArtifactStore;
use ticket_mirror::server::{create_routes, AppState};
use ticket_mirror::{Refresher, Settings, TicketStore};

// base64 payload decodes to "ticket-qr"
const UPSTREAM_PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <body>
        <span id="ticketNumber">D-1234-5678-90</span>
        <img id="qrCodeImage" src="data:image/png;base64,dGlja2V0LXFy" alt="QR">
        <span id="validFrom">01.08.2025 00:00</span>
        <span id="validUntil">01.09.2025 03:00</span>
        <span id="region">Bundesweit</span>
    </body>
    </html>
"#;

const UPSTREAM_QR: &[u8] = b"ticket-qr";

/// Serve `UPSTREAM_PAGE` at /ticket.html on an ephemeral loopback port.
async fn spawn_upstream() -> SocketAddr {
    let app = Router::new().route("/ticket.html", get(|| async { Html(UPSTREAM_PAGE) }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// An address nothing listens on, for the failure paths.
async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn test_settings(url: String, data_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.source.url = url;
    settings.source.request_timeout_secs = 5;
    settings.source.retry_attempts = 2;
    settings.source.retry_backoff_secs = 0;
    settings.storage.data_dir = data_dir.to_path_buf();
    settings
}

/// Build the mirror from settings and serve it on an ephemeral port.
async fn spawn_mirror(settings: &Settings) -> SocketAddr {
    let store = TicketStore::new();
    let refresher = Arc::new(Refresher::new(settings, store.clone()).unwrap());
    let app = create_routes(AppState::new(refresher, store), &settings.storage.data_dir);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn test_full_cycle_over_loopback() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = spawn_upstream().await;
    let settings = test_settings(format!("http://{upstream}/ticket.html"), dir.path());
    let mirror = spawn_mirror(&settings).await;

    // first request: no refresh has run yet, the handler performs one
    let data: serde_json::Value = reqwest::get(format!("http://{mirror}/api/ticket-data"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(data["ticket_number"], "D-1234-5678-90");
    assert_eq!(data["valid_from"], "01.08.2025 00:00");
    assert_eq!(data["valid_until"], "01.09.2025 03:00");
    assert_eq!(data["region"], "Bundesweit");
    assert_eq!(data["update_status"], "Update successful");
    assert_eq!(data["qr_url"], "/static/qr-code.png");

    // the decoded QR is served over the static route
    let qr = reqwest::get(format!("http://{mirror}/static/qr-code.png"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&qr[..], UPSTREAM_QR);

    // and both artifacts landed on disk
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    let persisted = artifacts.load_record().unwrap();
    assert_eq!(persisted.ticket_number, "D-1234-5678-90");
    assert_eq!(
        std::fs::read(artifacts.qr_path()).unwrap(),
        UPSTREAM_QR
    );
}

#[tokio::test]
async fn test_manual_trigger_success() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = spawn_upstream().await;
    let settings = test_settings(format!("http://{upstream}/ticket.html"), dir.path());
    let mirror = spawn_mirror(&settings).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{mirror}/api/update-ticket"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["message"], "Update successful");
    assert_eq!(outcome["ticket_data"]["ticket_number"], "D-1234-5678-90");
}

#[tokio::test]
async fn test_manual_trigger_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let unreachable = closed_addr().await;
    let settings = test_settings(format!("http://{unreachable}/ticket.html"), dir.path());

    // a QR from an earlier successful cycle must survive the failure
    let artifacts = ArtifactStore::new(dir.path().to_path_buf());
    artifacts.write_qr(b"previous qr").unwrap();

    let mirror = spawn_mirror(&settings).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{mirror}/api/force-update"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["success"], false);
    assert!(outcome["message"]
        .as_str()
        .unwrap()
        .starts_with("Update failed:"));
    // fallback record is still well-formed
    assert!(outcome["ticket_data"]["ticket_number"].is_string());

    assert_eq!(std::fs::read(artifacts.qr_path()).unwrap(), b"previous qr");
}

#[tokio::test]
async fn test_first_run_against_dead_upstream_still_serves() {
    let dir = tempfile::tempdir().unwrap();
    let unreachable = closed_addr().await;
    let settings = test_settings(format!("http://{unreachable}/ticket.html"), dir.path());
    let mirror = spawn_mirror(&settings).await;

    // no history at all: reserve record plus placeholder image
    let data: serde_json::Value = reqwest::get(format!("http://{mirror}/api/ticket-data"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(data["update_status"]
        .as_str()
        .unwrap()
        .starts_with("Update failed:"));
    assert!(data["ticket_number"].is_string());

    let qr = reqwest::get(format!("http://{mirror}/static/qr-code.png"))
        .await
        .unwrap();
    assert_eq!(qr.status(), 200);
    let bytes = qr.bytes().await.unwrap();
    // placeholder is a valid PNG
    assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
}

#[tokio::test]
async fn test_index_page_and_health() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = spawn_upstream().await;
    let settings = test_settings(format!("http://{upstream}/ticket.html"), dir.path());
    let mirror = spawn_mirror(&settings).await;

    let page = reqwest::get(format!("http://{mirror}/")).await.unwrap();
    assert_eq!(page.status(), 200);
    let html = page.text().await.unwrap();
    assert!(html.contains("id=\"qrCodeImage\""));
    assert!(html.contains("/api/update-ticket"));

    let health: serde_json::Value = reqwest::get(format!("http://{mirror}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_scheduler_keeps_artifacts_current() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = spawn_upstream().await;
    let settings = test_settings(format!("http://{upstream}/ticket.html"), dir.path());

    let store = TicketStore::new();
    let refresher = Arc::new(Refresher::new(&settings, store.clone()).unwrap());

    let token = tokio_util::sync::CancellationToken::new();
    let handle = ticket_mirror::scheduler::spawn(
        Arc::clone(&refresher),
        Duration::from_millis(100),
        token.clone(),
    );

    // wait for at least one scheduled cycle to land
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while store.is_empty().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "scheduler never produced a record"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler should stop on cancel")
        .unwrap();

    let record = store.get().await.unwrap();
    assert_eq!(record.ticket_number, "D-1234-5678-90");
    assert_eq!(
        ArtifactStore::new(dir.path().to_path_buf())
            .load_record()
            .unwrap(),
        record
    );
}
