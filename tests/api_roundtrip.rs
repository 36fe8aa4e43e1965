use parsha_tracker::api::create_router;
use parsha_tracker::gateway::{Gateway, HttpGateway, TransportError};
use parsha_tracker::reading::{Aliyah, Book, Parsha};
use parsha_tracker::storage::{Catalog, ProgressStore};
use parsha_tracker::tracker::Tracker;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn parsha(title: &str, book: Book, counts: &[(u64, u64)]) -> Parsha {
    Parsha {
        title: title.to_string(),
        name: String::new(),
        book,
        torah_portion: String::new(),
        aliyot: counts
            .iter()
            .enumerate()
            .map(|(i, (words, verses))| Aliyah::new(i as u32 + 1, "", *words, *verses))
            .collect(),
    }
}

/// Serves a catalog on an ephemeral port and returns the API root.
async fn spawn_server(dir: &TempDir) -> String {
    let readings = vec![
        parsha(
            "Parashat Bereshit",
            Book::Genesis,
            &[(100, 10), (150, 12), (200, 14)],
        ),
        parsha("Parashat V'Zot HaBerachah", Book::Deuteronomy, &[(50, 5), (70, 7)]),
    ];
    let data_file = dir.path().join("torah_readings.json");
    std::fs::write(&data_file, serde_json::to_string(&readings).unwrap()).unwrap();

    let store = ProgressStore::open(dir.path().join("progress.db")).unwrap();
    let catalog = Catalog::open(&data_file, store).unwrap();
    let app = create_router(Arc::new(catalog));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}

fn gateway(base_url: &str) -> HttpGateway {
    HttpGateway::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_health_reports_initialized_data() {
    let dir = TempDir::new().unwrap();
    let base_url = spawn_server(&dir).await;

    let body: serde_json::Value = reqwest::get(format!("{base_url}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["data_initialized"], true);
}

#[tokio::test]
async fn test_toggle_all_round_trip_through_http() {
    let dir = TempDir::new().unwrap();
    let base_url = spawn_server(&dir).await;
    let mut tracker = Tracker::new(Arc::new(gateway(&base_url)));

    tracker.refresh().await.unwrap();
    let bereshit = tracker.selection().selected().cloned().unwrap();
    assert_eq!(bereshit.title, "Parashat Bereshit");

    let target = tracker.toggle_all(&bereshit).await.unwrap();
    assert!(target);
    assert!(tracker.selection().selected().unwrap().is_complete());

    let stats = tracker.gateway().fetch_stats().await.unwrap();
    assert_eq!(stats.completed.words, 450);
    assert_eq!(stats.total.words, 570);
    assert_eq!(stats.percentage.aliyot, 60);

    // Everything complete now, so the second bulk toggle clears the parsha.
    let target = tracker.toggle_all(&bereshit).await.unwrap();
    assert!(!target);
    assert_eq!(tracker.selection().selected().unwrap().completed_aliyot(), 0);
}

#[tokio::test]
async fn test_title_with_spaces_and_apostrophe() {
    let dir = TempDir::new().unwrap();
    let base_url = spawn_server(&dir).await;
    let gateway = gateway(&base_url);

    let title = "Parashat V'Zot HaBerachah";
    let aliyah = gateway.update_aliyah(title, 2, true).await.unwrap();
    assert_eq!(aliyah.number, 2);
    assert!(aliyah.is_complete);
    assert!(aliyah.date_completed.is_some());

    let fetched = gateway.fetch_parsha(title).await.unwrap();
    assert!(fetched.aliyah(2).unwrap().is_complete);
    assert!(!fetched.aliyah(1).unwrap().is_complete);
}

#[tokio::test]
async fn test_unknown_targets_are_not_found() {
    let dir = TempDir::new().unwrap();
    let base_url = spawn_server(&dir).await;
    let gateway = gateway(&base_url);

    let missing = gateway.fetch_parsha("Parashat Nowhere").await;
    assert!(matches!(missing, Err(TransportError::NotFound(_))));

    let bad_aliyah = gateway.update_aliyah("Parashat Bereshit", 9, true).await;
    assert!(matches!(bad_aliyah, Err(TransportError::NotFound(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop so the port is very likely closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = gateway(&format!("http://{addr}/api"));
    let result = gateway.fetch_parshiot().await;
    assert!(matches!(result, Err(TransportError::Http(_))));
}
