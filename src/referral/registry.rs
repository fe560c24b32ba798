// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Referral registry: claiming and looking up referral codes.
//!
//! ## Claim
//!
//! 1. Validate the code (`[A-Z0-9]{6}`).
//! 2. Fast path: if any account already holds the code, report a conflict.
//! 3. Atomic upsert keyed by identity. A uniqueness violation here is the
//!    authoritative conflict signal: two concurrent claims can both pass
//!    step 2, but only the first writer succeeds.
//!
//! Store calls run on the blocking thread pool so a slow disk never stalls
//! the async workers.

use std::sync::Arc;

use tracing::{info, warn};

use super::ReferralCode;
use crate::storage::{AccountStore, AccountStoreError, AccountStoreResult};

pub const MSG_INVALID_CODE: &str = "Invalid code. Must be 6 uppercase alphanumeric characters.";
pub const MSG_CODE_TAKEN: &str = "Code exists, try other";
pub const MSG_CLAIM_FAILED: &str = "Failed to create referral code";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch referral code";
pub const MSG_CLAIMED: &str = "Successfully claim referral code";

#[derive(Debug, thiserror::Error)]
pub enum ReferralError {
    #[error("{}", MSG_INVALID_CODE)]
    Validation,

    #[error("{}", MSG_CODE_TAKEN)]
    Conflict,

    #[error("{message}")]
    StoreFailure {
        message: &'static str,
        source: AccountStoreError,
    },

    #[error("Internal Server Error")]
    Internal(String),
}

/// Referral code registry over an [`AccountStore`].
#[derive(Clone)]
pub struct ReferralRegistry {
    store: Arc<dyn AccountStore>,
}

impl ReferralRegistry {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Claim `raw_code` for `identity`, replacing any code it held before.
    pub async fn claim(&self, identity: &str, raw_code: &str) -> Result<ReferralCode, ReferralError> {
        let code = ReferralCode::parse(raw_code).map_err(|_| ReferralError::Validation)?;

        let owner = self
            .blocking({
                let code = code.clone();
                move |store| store.owner_of(&code)
            })
            .await?
            .map_err(|source| ReferralError::StoreFailure {
                message: MSG_CLAIM_FAILED,
                source,
            })?;

        if owner.is_some() {
            info!(code = %code, "Referral code already taken");
            return Err(ReferralError::Conflict);
        }

        let result = self
            .blocking({
                let identity = identity.to_string();
                let code = code.clone();
                move |store| store.upsert_ref_code(&identity, &code)
            })
            .await?;

        match result {
            Ok(account) => {
                info!(address = %account.address, code = %code, "Referral code claimed");
                Ok(code)
            }
            Err(AccountStoreError::RefCodeTaken { .. }) => {
                warn!(code = %code, "Referral code taken by a concurrent claim");
                Err(ReferralError::Conflict)
            }
            Err(source) => Err(ReferralError::StoreFailure {
                message: MSG_CLAIM_FAILED,
                source,
            }),
        }
    }

    /// The code owned by `identity`. No account row is `Ok(None)`.
    pub async fn fetch_own(&self, identity: &str) -> Result<Option<ReferralCode>, ReferralError> {
        let account = self
            .blocking({
                let identity = identity.to_string();
                move |store| store.account(&identity)
            })
            .await?
            .map_err(|source| ReferralError::StoreFailure {
                message: MSG_FETCH_FAILED,
                source,
            })?;

        let Some(raw) = account.and_then(|a| a.ref_code) else {
            return Ok(None);
        };
        match ReferralCode::parse(&raw) {
            Ok(code) => Ok(Some(code)),
            Err(e) => {
                warn!(address = %identity, stored = %raw, error = %e, "Stored referral code is malformed");
                Err(ReferralError::StoreFailure {
                    message: MSG_FETCH_FAILED,
                    source: AccountStoreError::Corrupt(format!("ref_code {raw:?}: {e}")),
                })
            }
        }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<AccountStoreResult<T>, ReferralError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn AccountStore) -> AccountStoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| ReferralError::Internal(e.to_string()))
    }
}
