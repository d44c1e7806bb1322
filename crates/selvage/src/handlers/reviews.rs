//! review verification endpoint.
//!
//! `POST /reviews/verify` looks up a verified review by (platform,
//! username) and mints a free-reviewer license when one exists. no match
//! is a plain negative answer, not an error.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::{ApiError, ResultExt};
use selvage_db::Database;

/// request body for a review verification.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// review platform, e.g. "amazon"
    pub platform: String,
    /// reviewer account name on the platform
    pub username: String,
}

/// response for a review verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// whether a verified review was found
    pub verified: bool,
    /// freshly minted reviewer license key, present only when verified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
}

/// verify a review and mint a reviewer license.
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let review = state
        .db
        .get_verified_review(&req.platform, &req.username)
        .await
        .map_internal()?;

    if review.is_none() {
        return Ok(Json(VerifyResponse {
            verified: false,
            license_key: None,
        }));
    }

    let license = state
        .licenses
        .mint_reviewer(&req.platform, &req.username)
        .await
        .map_internal()?;

    Ok(Json(VerifyResponse {
        verified: true,
        license_key: Some(license.key),
    }))
}
