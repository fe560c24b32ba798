// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The session record carried inside the sealed cookie.

use serde::{Deserialize, Serialize};

use crate::config::SESSION_TTL_SECS;

/// Identity proven by the wallet login flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiweIdentity {
    pub address: String,
}

/// Data held by a session.
///
/// A record without `siwe` is a logged-out session regardless of the other
/// fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Login-flow scratch value, carried opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siwe: Option<SiweIdentity>,
    /// Cached flag; the referral registry is authoritative.
    #[serde(default)]
    pub has_referral: bool,
    /// Unix milliseconds at which the session was established.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl SessionRecord {
    /// Fresh record for a newly authenticated identity.
    pub fn establish(identity: impl Into<String>, now_millis: i64) -> Self {
        Self {
            nonce: None,
            siwe: Some(SiweIdentity {
                address: identity.into(),
            }),
            has_referral: false,
            created_at: Some(now_millis),
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.siwe.as_ref().map(|s| s.address.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.siwe.is_some()
    }

    /// Expiry in unix milliseconds. A missing `created_at` counts as `now`.
    pub fn expires_at(&self, now_millis: i64) -> i64 {
        self.created_at.unwrap_or(now_millis) + (SESSION_TTL_SECS as i64) * 1000
    }

    /// True once `now` is strictly past the expiry instant.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis > self.expires_at(now_millis)
    }
}
