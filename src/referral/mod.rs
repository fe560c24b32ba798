// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Referral Module
//!
//! Each account may own at most one referral code, and each code belongs to
//! at most one account. Codes are six characters from `[A-Z0-9]`.

pub mod code;
pub mod registry;

pub use code::{InvalidReferralCode, ReferralCode, REFERRAL_CODE_LEN};
pub use registry::{
    ReferralError, ReferralRegistry, MSG_CLAIMED, MSG_CLAIM_FAILED, MSG_CODE_TAKEN, MSG_FETCH_FAILED,
    MSG_INVALID_CODE,
};
