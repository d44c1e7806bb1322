//! license validation and activation endpoints.
//!
//! endpoints:
//! - `POST /licenses/validate` - resolve a key to its tier and owner
//! - `POST /licenses/activate` - one-time flip from inactive to active

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::cache::LicenseStanding;
use crate::handlers::{ApiError, ResultExt};
use selvage_types::{License, Tier};

/// request carrying a bare license key.
#[derive(Debug, Deserialize)]
pub struct LicenseKeyRequest {
    /// the license key to act on
    pub key: String,
}

/// standing of a license key, shared by validate and activate.
///
/// an unknown or inactive key answers `{"valid": false}` with no further
/// fields; the caller cannot tell the two apart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStandingResponse {
    /// whether the key currently validates
    pub valid: bool,
    /// tier granted by the license
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// account the license belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl LicenseStandingResponse {
    fn invalid() -> Self {
        Self {
            valid: false,
            tier: None,
            owner_id: None,
        }
    }
}

impl From<LicenseStanding> for LicenseStandingResponse {
    fn from(standing: LicenseStanding) -> Self {
        Self {
            valid: true,
            tier: Some(standing.tier),
            owner_id: Some(standing.owner_id),
        }
    }
}

impl From<License> for LicenseStandingResponse {
    fn from(license: License) -> Self {
        Self {
            valid: true,
            tier: Some(license.tier),
            owner_id: Some(license.owner_id),
        }
    }
}

/// validate a license key.
///
/// `POST /licenses/validate`
///
/// an unknown key is a normal answer, not an error: the body says
/// `{"valid": false}` and the status stays 200.
pub async fn validate(
    State(state): State<AppState>,
    Json(req): Json<LicenseKeyRequest>,
) -> Result<Json<LicenseStandingResponse>, ApiError> {
    let standing = state.licenses.validate(&req.key).await.map_internal()?;

    Ok(Json(match standing {
        Some(standing) => standing.into(),
        None => LicenseStandingResponse::invalid(),
    }))
}

/// activate a license key.
///
/// `POST /licenses/activate`
///
/// only an inactive key can be activated, exactly once. the rejection does
/// not reveal whether the key was unknown or already used.
pub async fn activate(
    State(state): State<AppState>,
    Json(req): Json<LicenseKeyRequest>,
) -> Result<Json<LicenseStandingResponse>, ApiError> {
    let license = state
        .licenses
        .activate(&req.key, Utc::now())
        .await
        .map_internal()?;

    match license {
        Some(license) => Ok(Json(license.into())),
        None => Err(ApiError::conflict("license already activated or unknown")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_response_has_no_extra_fields() {
        let json = serde_json::to_string(&LicenseStandingResponse::invalid()).unwrap();
        assert_eq!(json, r#"{"valid":false}"#);
    }

    #[test]
    fn test_valid_response_uses_camel_case() {
        let response = LicenseStandingResponse::from(LicenseStanding {
            tier: Tier::Pro,
            owner_id: "owner-7".to_string(),
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""valid":true"#));
        assert!(json.contains(r#""tier":"pro""#));
        assert!(json.contains(r#""ownerId":"owner-7""#));
    }

    #[test]
    fn test_request_shape() {
        let req: LicenseKeyRequest = serde_json::from_str(r#"{"key": "slv-abc"}"#).unwrap();
        assert_eq!(req.key, "slv-abc");
    }
}
