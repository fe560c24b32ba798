// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory account store.
//!
//! Same semantics as [`super::AccountDatabase`], with both maps guarded by a
//! single mutex so the uniqueness check and the write are one critical
//! section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::accounts::{
    account_key, AccountStore, AccountStoreError, AccountStoreResult, StoredAccount,
};
use crate::referral::ReferralCode;

#[derive(Default)]
struct Tables {
    accounts: HashMap<String, StoredAccount>,
    ref_codes: HashMap<String, String>,
}

#[derive(Default)]
pub struct InMemoryAccountStore {
    tables: Mutex<Tables>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AccountStore for InMemoryAccountStore {
    fn owner_of(&self, code: &ReferralCode) -> AccountStoreResult<Option<String>> {
        Ok(self.lock().ref_codes.get(code.as_str()).cloned())
    }

    fn account(&self, address: &str) -> AccountStoreResult<Option<StoredAccount>> {
        Ok(self.lock().accounts.get(&account_key(address)).cloned())
    }

    fn upsert_ref_code(
        &self,
        address: &str,
        code: &ReferralCode,
    ) -> AccountStoreResult<StoredAccount> {
        let key = account_key(address);
        let mut tables = self.lock();

        if let Some(owner) = tables.ref_codes.get(code.as_str()) {
            if *owner != key {
                return Err(AccountStoreError::RefCodeTaken {
                    code: code.to_string(),
                });
            }
        }

        let previous = tables
            .accounts
            .get(&key)
            .and_then(|account| account.ref_code.clone());
        if let Some(old) = previous {
            if old != code.as_str() {
                tables.ref_codes.remove(&old);
            }
        }

        let account = StoredAccount {
            address: key.clone(),
            ref_code: Some(code.to_string()),
            updated_at: Utc::now(),
        };
        tables.ref_codes.insert(code.to_string(), key.clone());
        tables.accounts.insert(key, account.clone());
        Ok(account)
    }

    fn health_check(&self) -> AccountStoreResult<()> {
        Ok(())
    }
}
