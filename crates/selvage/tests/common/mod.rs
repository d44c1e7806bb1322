//! shared test utilities
//!
//! functions here may be used by different test files, so dead_code warnings
//! are expected (each test file is compiled separately)

#![allow(dead_code)]

use std::time::Duration;

use axum::{Router, body::Body, http::Request, response::Response};
use chrono::Utc;
use selvage::{LicenseCache, LicenseService, RelayRegistry, create_app};
use selvage_db::{Database, SelvageDb};
use selvage_store::{FsObjectStore, Metadata, ObjectStore};
use selvage_types::{Config, License, LicenseStatus, Model, ModelVersion, Tier};
use tempfile::TempDir;

/// everything a test needs to exercise the app end to end.
pub struct TestContext {
    pub app: Router,
    pub db: SelvageDb,
    pub store: FsObjectStore,
    // keeps the temp storage directory alive for the test's lifetime
    _storage_dir: TempDir,
}

/// create a test app backed by an in-memory database and temp-dir storage.
pub async fn create_test_context() -> TestContext {
    let db = SelvageDb::new_in_memory()
        .await
        .expect("failed to create in-memory database");
    let storage_dir = TempDir::new().expect("failed to create temp storage dir");
    let store = FsObjectStore::new(storage_dir.path());
    let cache = LicenseCache::new(Duration::from_secs(86_400));
    let licenses = LicenseService::new(db.clone(), Some(cache));
    let relay = RelayRegistry::default();
    let config = Config::default();

    let app = create_app(db.clone(), store.clone(), licenses, relay, config);

    TestContext {
        app,
        db,
        store,
        _storage_dir: storage_dir,
    }
}

/// insert a license row with the given status.
pub async fn seed_license(
    db: &SelvageDb,
    key: &str,
    tier: Tier,
    status: LicenseStatus,
) -> License {
    let mut license = License::new(key.to_string(), tier, format!("owner-of-{}", key));
    license.status = status;
    if status == LicenseStatus::Active {
        license.activated_at = Some(Utc::now());
    }
    db.create_license(&license)
        .await
        .expect("failed to seed license")
}

/// insert a catalog row and its payload blob.
pub async fn seed_model(
    ctx: &TestContext,
    id: &str,
    version: &str,
    tier: Tier,
    payload: &[u8],
) -> Model {
    let mut metadata = Metadata::new();
    metadata.insert("version".to_string(), version.to_string());
    ctx.store
        .put(&format!("models/{}", id), payload, &metadata)
        .await
        .expect("failed to seed model blob");

    let model = Model {
        id: id.to_string(),
        name: id.to_string(),
        version: ModelVersion::from(version),
        tier,
        description: String::new(),
        size: payload.len() as i64,
    };
    ctx.db
        .upsert_model(&model)
        .await
        .expect("failed to seed model row")
}

/// build a json POST request.
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// build a json POST request with a bearer token.
pub fn post_json_bearer(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// read a response body as json.
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&body).expect("failed to parse response body")
}

/// bind an os-assigned port and serve the app in the background.
pub async fn spawn_test_server(
    app: Router,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("failed to get local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    (addr, handle)
}
