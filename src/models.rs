// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. Types derive `Serialize`/`Deserialize` and `ToSchema`
//! for JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Session**: login status as seen by the client and its guard
//! - **Referral**: claiming and fetching the caller's referral code

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Session Models
// =============================================================================

/// Response of `GET /api/session`.
///
/// A logged-out session serializes as `{"isLoggedIn": false}` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_logged_in: bool,
    /// Wallet address of the session identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Cached referral flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_referral: Option<bool>,
    /// Unix milliseconds after which the session is expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl SessionStatus {
    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn logged_in(address: impl Into<String>, has_referral: bool, expires_at: i64) -> Self {
        Self {
            is_logged_in: true,
            address: Some(address.into()),
            has_referral: Some(has_referral),
            expires_at: Some(expires_at),
        }
    }
}

/// Response of `DELETE /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeleteSessionResponse {
    pub ok: bool,
}

/// Request body for `POST /api/session/dev-login`.
#[cfg(feature = "dev")]
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DevLoginRequest {
    pub address: String,
}

// =============================================================================
// Referral Models
// =============================================================================

/// Request body for claiming a referral code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimReferralRequest {
    /// Six characters from `[A-Z0-9]`.
    pub code: String,
}

/// Successful claim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ClaimReferralResponse {
    pub success: bool,
    pub message: String,
}

/// The caller's referral code, `data: null` when none is claimed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReferralCodeResponse {
    pub success: bool,
    pub data: Option<String>,
}

/// Error body shared by every failing API response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn logged_out_status_is_minimal() {
        let json = serde_json::to_value(SessionStatus::logged_out()).unwrap();
        assert_eq!(json, json!({"isLoggedIn": false}));
    }

    #[test]
    fn logged_in_status_uses_camel_case() {
        let json = serde_json::to_value(SessionStatus::logged_in("0xAAA", true, 42)).unwrap();
        assert_eq!(
            json,
            json!({"isLoggedIn": true, "address": "0xAAA", "hasReferral": true, "expiresAt": 42})
        );
    }

    #[test]
    fn status_parses_partial_payloads() {
        let status: SessionStatus = serde_json::from_str(r#"{"isLoggedIn":false}"#).unwrap();
        assert_eq!(status, SessionStatus::logged_out());
    }

    #[test]
    fn referral_response_keeps_null_data() {
        let json = serde_json::to_value(ReferralCodeResponse {
            success: true,
            data: None,
        })
        .unwrap();
        assert_eq!(json, json!({"success": true, "data": null}));
    }
}
