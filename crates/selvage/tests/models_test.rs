//! integration tests for the model catalog and download endpoints

mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use selvage_db::Database;
use selvage_store::ObjectStore;
use selvage_types::{LicenseStatus, Tier};
use tower::ServiceExt;

use common::{body_json, create_test_context, post_json, seed_license, seed_model};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

/// test that the catalog listing filters by tier and sorts by (tier, name)
#[tokio::test]
async fn test_available_filters_and_sorts_by_tier() {
    let ctx = create_test_context().await;
    seed_model(&ctx, "zeta-free", "1.0", Tier::Free, b"{}").await;
    seed_model(&ctx, "alpha-free", "1.0", Tier::Free, b"{}").await;
    seed_model(&ctx, "semantic-pro", "2.0", Tier::Pro, b"{}").await;
    seed_model(&ctx, "vault-enterprise", "3.0", Tier::Enterprise, b"{}").await;

    let response = ctx
        .app
        .oneshot(get("/models/available?tier=pro"))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<&str> = json["models"]
        .as_array()
        .expect("models should be an array")
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["alpha-free", "zeta-free", "semantic-pro"]);
}

/// test that an unknown or missing tier reads as free
#[tokio::test]
async fn test_available_unknown_tier_reads_as_free() {
    let ctx = create_test_context().await;
    seed_model(&ctx, "starter", "1.0", Tier::Free, b"{}").await;
    seed_model(&ctx, "semantic-pro", "2.0", Tier::Pro, b"{}").await;

    for uri in ["/models/available?tier=platinum", "/models/available"] {
        let response = ctx
            .app
            .clone()
            .oneshot(get(uri))
            .await
            .expect("request failed");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let models = json["models"].as_array().expect("models should be an array");
        assert_eq!(models.len(), 1, "only free models for {}", uri);
        assert_eq!(models[0]["id"], "starter");
    }
}

/// test that downloads require a license that validates active
#[tokio::test]
async fn test_download_rejects_invalid_license() {
    let ctx = create_test_context().await;
    seed_model(&ctx, "tfidf", "1.0", Tier::Free, b"{}").await;
    seed_license(&ctx.db, "slv-dormant", Tier::Pro, LicenseStatus::Inactive).await;

    for key in ["slv-unknown", "slv-dormant"] {
        let response = ctx
            .app
            .clone()
            .oneshot(post_json(
                "/models/download",
                serde_json::json!({"modelId": "tfidf", "licenseKey": key}),
            ))
            .await
            .expect("request failed");

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "key {}", key);
        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid or inactive license");
    }

    // no usage events for refused downloads
    assert_eq!(ctx.db.count_usage_events().await.unwrap(), 0);
}

/// test that a missing blob is a 404 and writes no usage event
#[tokio::test]
async fn test_download_missing_model_is_not_found() {
    let ctx = create_test_context().await;
    seed_license(&ctx.db, "slv-valid", Tier::Pro, LicenseStatus::Active).await;

    let response = ctx
        .app
        .oneshot(post_json(
            "/models/download",
            serde_json::json!({"modelId": "no-such-model", "licenseKey": "slv-valid"}),
        ))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "model not found");

    assert_eq!(ctx.db.count_usage_events().await.unwrap(), 0);
}

/// test the download success shape and the usage event written behind it
#[tokio::test]
async fn test_download_returns_payload_and_records_usage() {
    let ctx = create_test_context().await;
    seed_license(&ctx.db, "slv-valid", Tier::Pro, LicenseStatus::Active).await;
    seed_model(
        &ctx,
        "semantic-pro",
        "2.1",
        Tier::Pro,
        br#"{"weights": [0.3, 0.7]}"#,
    )
    .await;

    let response = ctx
        .app
        .oneshot(post_json(
            "/models/download",
            serde_json::json!({"modelId": "semantic-pro", "licenseKey": "slv-valid"}),
        ))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["modelId"], "semantic-pro");
    assert_eq!(json["version"], "2.1");
    assert_eq!(json["data"]["weights"][1], 0.7);

    // usage bookkeeping runs off the request path; give it a moment
    let mut count = 0;
    for _ in 0..50 {
        count = ctx.db.count_usage_events().await.unwrap();
        if count == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(count, 1, "download should record one usage event");
}

/// test that blob metadata without a version falls back to "1.0" and that
/// non-json payloads come back as text
#[tokio::test]
async fn test_download_version_defaults_when_metadata_missing() {
    let ctx = create_test_context().await;
    seed_license(&ctx.db, "slv-valid", Tier::Pro, LicenseStatus::Active).await;

    // blob stored without any metadata, row without a matching catalog entry
    ctx.store
        .put("models/raw-weights", b"w1 w2 w3", &selvage_store::Metadata::new())
        .await
        .expect("failed to store blob");

    let response = ctx
        .app
        .oneshot(post_json(
            "/models/download",
            serde_json::json!({"modelId": "raw-weights", "licenseKey": "slv-valid"}),
        ))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["data"], "w1 w2 w3");
}

/// test that an empty currentVersions list reports every visible model
#[tokio::test]
async fn test_check_updates_empty_current_reports_all() {
    let ctx = create_test_context().await;
    seed_model(&ctx, "tfidf", "1.2", Tier::Free, b"{}").await;
    seed_model(&ctx, "semantic-pro", "2.0", Tier::Pro, b"{}").await;

    let response = ctx
        .app
        .oneshot(post_json(
            "/models/check-updates",
            serde_json::json!({"tier": "pro", "currentVersions": []}),
        ))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let updates = json["updates"].as_array().expect("updates should be an array");
    assert_eq!(updates.len(), 2);
    for update in updates {
        assert_eq!(update["currentVersion"], "none");
    }
}

/// test that only strictly newer catalog versions are reported
#[tokio::test]
async fn test_check_updates_reports_only_strictly_newer() {
    let ctx = create_test_context().await;
    seed_model(&ctx, "tfidf", "1.3", Tier::Free, b"{}").await;
    seed_model(&ctx, "stopwords", "1.2", Tier::Free, b"{}").await;
    seed_model(&ctx, "semantic-pro", "2.0", Tier::Pro, b"{}").await;

    let response = ctx
        .app
        .oneshot(post_json(
            "/models/check-updates",
            serde_json::json!({
                "tier": "free",
                "currentVersions": [
                    {"id": "tfidf", "version": "1.2"},
                    // "1.2" == "1.2.0", not an update
                    {"id": "stopwords", "version": "1.2.0"},
                ],
            }),
        ))
        .await
        .expect("request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let updates = json["updates"].as_array().expect("updates should be an array");
    assert_eq!(updates.len(), 1, "pro models invisible, stopwords current");
    assert_eq!(updates[0]["model"], "tfidf");
    assert_eq!(updates[0]["currentVersion"], "1.2");
    assert_eq!(updates[0]["newVersion"], "1.3");
}
