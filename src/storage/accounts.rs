// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account records and the [`AccountStore`] abstraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::referral::ReferralCode;

/// Durable account row, keyed by address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredAccount {
    /// Owning identity (lowercased wallet address).
    pub address: String,
    /// Claimed referral code, unique across all accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_code: Option<String>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountStoreError {
    #[error("referral code {code} is owned by another account")]
    RefCodeTaken { code: String },

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("account store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt account row: {0}")]
    Corrupt(String),
}

pub type AccountStoreResult<T> = Result<T, AccountStoreError>;

/// Durable storage for accounts.
///
/// Implementations must make [`AccountStore::upsert_ref_code`] atomic with
/// respect to code uniqueness: the check that no *other* account owns the
/// code and the write of the caller's row happen in one step, so concurrent
/// claims for the same code cannot both succeed.
pub trait AccountStore: Send + Sync {
    /// Address of the account currently holding `code`.
    fn owner_of(&self, code: &ReferralCode) -> AccountStoreResult<Option<String>>;

    /// Account row for `address`, if any.
    fn account(&self, address: &str) -> AccountStoreResult<Option<StoredAccount>>;

    /// Insert or overwrite the account row for `address` with `code`.
    ///
    /// Fails with [`AccountStoreError::RefCodeTaken`] when a different
    /// account owns `code`. A previous code held by `address` is released.
    fn upsert_ref_code(
        &self,
        address: &str,
        code: &ReferralCode,
    ) -> AccountStoreResult<StoredAccount>;

    /// Verify the backing store is usable.
    fn health_check(&self) -> AccountStoreResult<()>;
}

/// Canonical key for an address.
pub fn account_key(address: &str) -> String {
    address.trim().to_lowercase()
}
