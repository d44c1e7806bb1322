//! pattern sync endpoint.
//!
//! `POST /sync/patterns` archives a batch of detection patterns, registers
//! it in the sync registry and relays it to the key's live websocket
//! sessions. auth is a bearer license key.

use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::{ApiError, OptionExt, ResultExt};
use selvage_db::Database;
use selvage_store::{Metadata, ObjectStore};
use selvage_types::SyncRecord;

/// request body for a pattern sync.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    /// opaque pattern objects, archived verbatim
    #[serde(default)]
    pub patterns: Vec<serde_json::Value>,
}

/// response for an accepted sync batch.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    /// always true on the success path
    pub success: bool,
    /// number of patterns accepted
    pub synced: usize,
    /// batch timestamp in unix milliseconds, also the archive path segment
    pub timestamp: i64,
}

/// accept a pattern batch.
///
/// archive write and registry insert are part of the operation and fail it;
/// relay delivery is best-effort.
pub async fn patterns(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    let key = bearer_token(&headers).or_unauthorized("missing bearer token")?;
    state
        .licenses
        .validate(key)
        .await
        .map_internal()?
        .or_forbidden("invalid or inactive license")?;

    let now = Utc::now();
    let record = SyncRecord::new(key.to_string(), now, req.patterns.len() as u32);
    let batch = serde_json::Value::Array(req.patterns);
    let payload = serde_json::to_vec(&batch).map_internal()?;

    let mut metadata = Metadata::new();
    metadata.insert("licenseKey".to_string(), record.license_key.clone());
    metadata.insert("count".to_string(), record.pattern_count.to_string());
    metadata.insert(
        "timestamp".to_string(),
        now.timestamp_millis().to_string(),
    );

    state
        .store
        .put(&record.archive_path(), &payload, &metadata)
        .await
        .map_internal()?;
    state.db.create_sync_record(&record).await.map_internal()?;

    state.relay.broadcast_patterns(key, &batch);

    Ok(Json(SyncResponse {
        success: true,
        synced: record.pattern_count as usize,
        timestamp: now.timestamp_millis(),
    }))
}

/// pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer slv-abc"));
        assert_eq!(bearer_token(&headers), Some("slv-abc"));
    }

    #[test]
    fn test_missing_or_malformed_header_is_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_request_defaults_to_empty_batch() {
        let req: SyncRequest = serde_json::from_str("{}").unwrap();
        assert!(req.patterns.is_empty());

        let req: SyncRequest =
            serde_json::from_str(r#"{"patterns": [{"sig": "a"}, {"sig": "b"}]}"#).unwrap();
        assert_eq!(req.patterns.len(), 2);
    }
}
