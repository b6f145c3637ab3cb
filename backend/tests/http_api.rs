//! Router-level tests for the quote endpoints.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tower::ServiceExt;

use backend::config::CorsOrigins;
use backend::http::{AppState, create_router};
use backend::query::QueryService;
use market::{BatchRefresher, FetchError, QuoteMetrics, QuoteSource, SnapshotStore, Symbol};
use scheduler::RefreshGate;

const ORIGIN: &str = "https://gleaming-lokum-2106f6.netlify.app";

#[derive(Default)]
struct StubSource {
    calls: AtomicUsize,
    fail: AtomicBool,
    hold: Option<Arc<Semaphore>>,
}

#[async_trait]
impl QuoteSource for StubSource {
    async fn fetch(&self, symbol: &Symbol) -> Result<QuoteMetrics, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold {
            let _permit = hold.acquire().await.unwrap();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::NoData);
        }
        match symbol.as_str() {
            "TCS.NS" => QuoteMetrics::from_closes(100.0, 105.0),
            _ => QuoteMetrics::from_closes(50.0, 45.0),
        }
    }
}

fn setup(source: Arc<StubSource>, symbols: &[&str]) -> (Router, Arc<RefreshGate>) {
    let universe: Vec<Symbol> = symbols.iter().map(|s| Symbol::from(*s)).collect();
    let refresher = BatchRefresher::new(
        source,
        universe,
        SnapshotStore::new(),
        2,
        chrono_tz::Asia::Kolkata,
    );
    let gate = RefreshGate::new(Arc::new(refresher), Duration::from_secs(60));

    let origins = CorsOrigins::List(vec![HeaderValue::from_static(ORIGIN)]);
    let app = create_router(
        AppState::new(QueryService::new(Arc::clone(&gate))),
        &origins,
    );
    (app, gate)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

#[tokio::test]
async fn cold_start_refreshes_then_serves() {
    let source = Arc::new(StubSource::default());
    let (app, _gate) = setup(Arc::clone(&source), &["TCS.NS", "ACC.NS"]);

    let (status, json) = get(app, "/get_stock_data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"]["TCS.NS"],
        json!({"current_price": 105.0, "previous_close": 100.0, "percentage_change": 5.0})
    );
    assert_eq!(json["data"]["ACC.NS"]["percentage_change"], -10.0);
    assert!(json["last_updated"].is_string());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn warm_reads_do_not_fetch() {
    let source = Arc::new(StubSource::default());
    let (app, gate) = setup(Arc::clone(&source), &["TCS.NS"]);
    let snapshot = gate.refresh().await.unwrap();

    let (first, a) = get(app.clone(), "/get_stock_data").await;
    let (second, b) = get(app, "/get_stock_data").await;

    assert_eq!((first, second), (StatusCode::OK, StatusCode::OK));
    assert_eq!(a, b);
    assert_eq!(a["last_updated"], snapshot.last_updated_display());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cold_start_failure_is_a_500() {
    let source = Arc::new(StubSource::default());
    source.fail.store(true, Ordering::SeqCst);
    let (app, gate) = setup(Arc::clone(&source), &["TCS.NS"]);

    let (status, json) = get(app.clone(), "/get_stock_data").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Error fetching stock data."}));
    assert!(gate.store().is_cold());

    // Next request tries again
    source.fail.store(false, Ordering::SeqCst);
    let (status, _) = get(app, "/get_stock_data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_cold_start_requests_share_one_refresh() {
    let hold = Arc::new(Semaphore::new(0));
    let source = Arc::new(StubSource {
        hold: Some(Arc::clone(&hold)),
        ..StubSource::default()
    });
    let (app, gate) = setup(Arc::clone(&source), &["TCS.NS"]);

    let ((sa, a), (sb, b), _) = tokio::join!(
        get(app.clone(), "/get_stock_data"),
        get(app.clone(), "/get_stock_data"),
        async {
            while source.calls.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            hold.add_permits(1);
        }
    );

    assert_eq!((sa, sb), (StatusCode::OK, StatusCode::OK));
    assert_eq!(a, b);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        scheduler::SchedulerStats::get(&gate.stats().cycles_started),
        1
    );
}

#[tokio::test]
async fn last_updated_never_refreshes() {
    let source = Arc::new(StubSource::default());
    let (app, gate) = setup(Arc::clone(&source), &["TCS.NS"]);

    let (status, json) = get(app.clone(), "/get_last_updated").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"last_updated": null}));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);

    let snapshot = gate.refresh().await.unwrap();
    let (_, json) = get(app, "/get_last_updated").await;
    assert_eq!(json["last_updated"], snapshot.last_updated_display());
}

#[tokio::test]
async fn cors_allows_only_configured_origins() {
    let source = Arc::new(StubSource::default());
    let (app, gate) = setup(source, &["TCS.NS"]);
    gate.refresh().await.unwrap();

    let allowed = Request::builder()
        .uri("/get_stock_data")
        .header(header::ORIGIN, ORIGIN)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static(ORIGIN))
    );

    let foreign = Request::builder()
        .uri("/get_stock_data")
        .header(header::ORIGIN, "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(foreign).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _gate) = setup(Arc::new(StubSource::default()), &["TCS.NS"]);

    let (status, json) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}
