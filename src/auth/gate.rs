// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The auth gate: reduce a session to "authorized as identity X" or not.
//!
//! The gate does not check or destroy expired sessions; that belongs to the
//! `GET /api/session` read path. Between the client-side guard noticing an
//! expiry and the session actually being destroyed, a stale session can
//! still pass the gate. The sealed cookie's own expiry bounds that window.

use serde::Serialize;
use utoipa::ToSchema;

use super::AuthError;
use crate::session::SessionRecord;

/// Identity allowed to perform privileged actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Wallet address proven at login.
    pub address: String,
}

/// Serializable result of [`authorize`].
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AuthorizeOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub address: Option<String>,
}

impl AuthorizeOutcome {
    pub fn into_result(self) -> Result<AuthenticatedUser, AuthError> {
        match (self.success, self.address) {
            (true, Some(address)) => Ok(AuthenticatedUser { address }),
            _ => Err(AuthError::Unauthorized),
        }
    }
}

/// Authorize the holder of `record`.
pub fn authorize(record: &SessionRecord) -> AuthorizeOutcome {
    match record.identity() {
        Some(address) if !address.is_empty() => AuthorizeOutcome {
            success: true,
            error: None,
            address: Some(address.to_string()),
        },
        _ => AuthorizeOutcome {
            success: false,
            error: Some(AuthError::Unauthorized.to_string()),
            address: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SiweIdentity;

    #[test]
    fn identity_is_authorized() {
        let outcome = authorize(&SessionRecord::establish("0xAAA", 0));
        assert_eq!(
            outcome,
            AuthorizeOutcome {
                success: true,
                error: None,
                address: Some("0xAAA".into()),
            }
        );
        assert_eq!(outcome.into_result().unwrap().address, "0xAAA");
    }

    #[test]
    fn empty_session_is_unauthorized() {
        let outcome = authorize(&SessionRecord::default());
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Unauthorized"));
        assert!(outcome.address.is_none());
        assert!(matches!(outcome.into_result(), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn other_fields_do_not_grant_access() {
        let record = SessionRecord {
            nonce: Some("n".into()),
            siwe: None,
            has_referral: true,
            created_at: Some(0),
        };
        assert!(!authorize(&record).success);
    }

    #[test]
    fn blank_address_is_unauthorized() {
        let record = SessionRecord {
            siwe: Some(SiweIdentity { address: String::new() }),
            ..Default::default()
        };
        assert!(!authorize(&record).success);
    }

    #[test]
    fn expired_session_still_passes_gate() {
        // Expiry is enforced by the session read path, not the gate.
        let record = SessionRecord::establish("0xAAA", 0);
        assert!(record.is_expired(10_000_000));
        assert!(authorize(&record).success);
    }

    #[test]
    fn outcome_serializes_with_null_fields() {
        let json = serde_json::to_value(authorize(&SessionRecord::default())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Unauthorized", "address": null})
        );
    }
}
