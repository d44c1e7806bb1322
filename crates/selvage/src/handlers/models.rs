//! model catalog and download endpoints.
//!
//! endpoints:
//! - `GET /models/available` - catalog entries visible at a tier
//! - `POST /models/download` - fetch a model payload for a valid license
//! - `POST /models/check-updates` - diff caller versions against the catalog

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::{ApiError, OptionExt, ResultExt};
use selvage_db::Database;
use selvage_store::ObjectStore;
use selvage_types::{Model, ModelVersion, Tier, UsageEvent, sort_catalog};

/// query parameters for the available-models listing.
#[derive(Debug, Default, Deserialize)]
pub struct AvailableParams {
    /// tier to list for; unknown or missing values read as free
    pub tier: Option<String>,
}

/// response for the available-models listing.
#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    /// catalog entries visible at the requested tier
    pub models: Vec<Model>,
}

/// list catalog entries visible at a tier.
///
/// `GET /models/available?tier=pro`
pub async fn available(
    State(state): State<AppState>,
    Query(params): Query<AvailableParams>,
) -> Result<Json<AvailableResponse>, ApiError> {
    let tier = params
        .tier
        .as_deref()
        .map(Tier::parse_lenient)
        .unwrap_or_default();

    let mut models: Vec<Model> = state
        .db
        .list_models()
        .await
        .map_internal()?
        .into_iter()
        .filter(|m| m.visible_to(tier))
        .collect();
    sort_catalog(&mut models);

    Ok(Json(AvailableResponse { models }))
}

/// request for a model download.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    /// catalog id of the model
    pub model_id: String,
    /// license key authorizing the download
    pub license_key: String,
}

/// response for a model download.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// always true on the success path
    pub success: bool,
    /// catalog id of the model
    pub model_id: String,
    /// version recorded in blob metadata, "1.0" if absent
    pub version: String,
    /// decoded payload: json if the blob parses, a lossy string otherwise
    pub data: serde_json::Value,
}

/// download a model payload.
///
/// `POST /models/download`
///
/// the license must validate and the blob must exist; each failure has its
/// own status. usage bookkeeping happens off the request path and only for
/// downloads that found their blob.
pub async fn download(
    State(state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    state
        .licenses
        .validate(&req.license_key)
        .await
        .map_internal()?
        .or_forbidden("invalid or inactive license")?;

    let blob = match state.store.get(&format!("models/{}", req.model_id)).await {
        Ok(blob) => blob.or_not_found("model not found")?,
        // a key the store refuses cannot name a stored model
        Err(selvage_store::Error::InvalidKey(_)) => {
            return Err(ApiError::not_found("model not found"));
        }
        Err(e) => return Err(ApiError::internal(e)),
    };

    // fire-and-forget: a failed usage write must not fail the download
    let event = UsageEvent::model_download(req.license_key.clone(), req.model_id.clone());
    let db = state.db.clone();
    tokio::spawn(async move {
        if let Err(e) = db.record_usage(&event).await {
            tracing::warn!(error = %e, "failed to record download usage event");
        }
    });

    let version = blob
        .metadata
        .get("version")
        .cloned()
        .unwrap_or_else(|| "1.0".to_string());
    let data = decode_payload(&blob.data);

    Ok(Json(DownloadResponse {
        success: true,
        model_id: req.model_id,
        version,
        data,
    }))
}

/// payloads are json when they parse, otherwise passed through as text.
fn decode_payload(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// one caller-side version in a check-updates request.
#[derive(Debug, Deserialize)]
pub struct CurrentVersion {
    /// catalog id of the model
    pub id: String,
    /// version the caller currently has
    pub version: ModelVersion,
}

/// request for the update check.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUpdatesRequest {
    /// tier to check against; unknown or missing values read as free
    #[serde(default)]
    pub tier: Option<String>,
    /// versions the caller currently has installed
    #[serde(default)]
    pub current_versions: Vec<CurrentVersion>,
}

/// one available update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    /// catalog id of the model
    pub model: String,
    /// caller's version, "none" if the caller has no copy
    pub current_version: String,
    /// version available in the catalog
    pub new_version: ModelVersion,
}

/// response for the update check.
#[derive(Debug, Serialize)]
pub struct CheckUpdatesResponse {
    /// strictly newer catalog entries visible at the tier
    pub updates: Vec<UpdateEntry>,
}

/// diff the caller's versions against the catalog.
///
/// `POST /models/check-updates`
pub async fn check_updates(
    State(state): State<AppState>,
    Json(req): Json<CheckUpdatesRequest>,
) -> Result<Json<CheckUpdatesResponse>, ApiError> {
    let tier = req
        .tier
        .as_deref()
        .map(Tier::parse_lenient)
        .unwrap_or_default();
    let current: HashMap<String, ModelVersion> = req
        .current_versions
        .into_iter()
        .map(|c| (c.id, c.version))
        .collect();

    let catalog = state.db.list_models().await.map_internal()?;
    let updates = collect_updates(catalog, tier, &current);

    Ok(Json(CheckUpdatesResponse { updates }))
}

/// report every visible catalog entry strictly newer than the caller's
/// copy. a model the caller does not have at all is always outdated.
fn collect_updates(
    catalog: Vec<Model>,
    tier: Tier,
    current: &HashMap<String, ModelVersion>,
) -> Vec<UpdateEntry> {
    catalog
        .into_iter()
        .filter(|m| m.visible_to(tier))
        .filter_map(|model| match current.get(&model.id) {
            Some(have) if !model.version.is_newer_than(have) => None,
            Some(have) => Some(UpdateEntry {
                model: model.id,
                current_version: have.to_string(),
                new_version: model.version,
            }),
            None => Some(UpdateEntry {
                model: model.id,
                current_version: "none".to_string(),
                new_version: model.version,
            }),
        })
        .collect()
}
