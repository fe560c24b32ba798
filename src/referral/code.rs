// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Referral code type.

use std::fmt;

use serde::Serialize;

/// Number of characters in a referral code.
pub const REFERRAL_CODE_LEN: usize = 6;

/// A validated referral code: exactly six characters from `[A-Z0-9]`.
///
/// Parsing is the only way to build one, so every code that reaches the
/// account store is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReferralCode(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("referral code must be 6 uppercase alphanumeric characters")]
pub struct InvalidReferralCode;

impl ReferralCode {
    pub fn parse(raw: &str) -> Result<Self, InvalidReferralCode> {
        let well_formed = raw.len() == REFERRAL_CODE_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidReferralCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferralCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
