// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded account database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: lowercase address → serialized StoredAccount
//! - `ref_code_index`: referral code → lowercase address (unique index)
//!
//! Both tables are written in the same write transaction, and redb
//! serializes write transactions, so the uniqueness check inside
//! [`AccountStore::upsert_ref_code`] is authoritative.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

use super::accounts::{
    account_key, AccountStore, AccountStoreError, AccountStoreResult, StoredAccount,
};
use crate::referral::ReferralCode;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: address → serialized StoredAccount (JSON bytes).
const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Unique index: referral code → owning address.
const REF_CODE_INDEX: TableDefinition<&str, &str> = TableDefinition::new("ref_code_index");

// =============================================================================
// AccountDatabase
// =============================================================================

/// Durable account store.
pub struct AccountDatabase {
    db: Database,
}

impl AccountDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> AccountStoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AccountStoreError::Unavailable(e.to_string()))?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(REF_CODE_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn apply_upsert(
        txn: &WriteTransaction,
        key: &str,
        code: &ReferralCode,
    ) -> AccountStoreResult<StoredAccount> {
        let mut codes = txn.open_table(REF_CODE_INDEX)?;
        let mut accounts = txn.open_table(ACCOUNTS)?;

        let owner = codes.get(code.as_str())?.map(|v| v.value().to_string());
        if owner.as_deref().is_some_and(|owner| owner != key) {
            return Err(AccountStoreError::RefCodeTaken {
                code: code.to_string(),
            });
        }

        let previous: Option<StoredAccount> = match accounts.get(key)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };

        if let Some(old) = previous.and_then(|p| p.ref_code) {
            if old != code.as_str() {
                codes.remove(old.as_str())?;
            }
        }

        let account = StoredAccount {
            address: key.to_string(),
            ref_code: Some(code.to_string()),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_vec(&account)?;

        codes.insert(code.as_str(), key)?;
        accounts.insert(key, json.as_slice())?;

        Ok(account)
    }
}

impl AccountStore for AccountDatabase {
    fn owner_of(&self, code: &ReferralCode) -> AccountStoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REF_CODE_INDEX)?;
        Ok(table.get(code.as_str())?.map(|v| v.value().to_string()))
    }

    fn account(&self, address: &str) -> AccountStoreResult<Option<StoredAccount>> {
        let key = account_key(address);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(key.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn upsert_ref_code(
        &self,
        address: &str,
        code: &ReferralCode,
    ) -> AccountStoreResult<StoredAccount> {
        let key = account_key(address);
        let write_txn = self.db.begin_write()?;

        match Self::apply_upsert(&write_txn, &key, code) {
            Ok(account) => {
                write_txn.commit()?;
                Ok(account)
            }
            Err(e) => {
                write_txn.abort()?;
                Err(e)
            }
        }
    }

    fn health_check(&self) -> AccountStoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(ACCOUNTS)?;
        let _ = read_txn.open_table(REF_CODE_INDEX)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_db() -> (AccountDatabase, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = AccountDatabase::open(&dir.path().join("accounts.redb")).expect("open db");
        (db, dir)
    }

    fn code(raw: &str) -> ReferralCode {
        ReferralCode::parse(raw).unwrap()
    }

    #[test]
    fn upsert_then_read_back() {
        let (db, _dir) = test_db();

        let stored = db.upsert_ref_code("0xAAA", &code("AB12CD")).unwrap();
        assert_eq!(stored.address, "0xaaa");
        assert_eq!(stored.ref_code.as_deref(), Some("AB12CD"));

        let loaded = db.account("0xaaa").unwrap().unwrap();
        assert_eq!(loaded.ref_code.as_deref(), Some("AB12CD"));
        assert_eq!(db.owner_of(&code("AB12CD")).unwrap().as_deref(), Some("0xaaa"));
    }

    #[test]
    fn missing_account_is_none() {
        let (db, _dir) = test_db();
        assert!(db.account("0xnobody").unwrap().is_none());
        assert!(db.owner_of(&code("ZZZZZZ")).unwrap().is_none());
    }

    #[test]
    fn code_owned_by_other_account_is_rejected() {
        let (db, _dir) = test_db();
        db.upsert_ref_code("0xAAA", &code("AB12CD")).unwrap();

        let err = db.upsert_ref_code("0xBBB", &code("AB12CD")).unwrap_err();
        assert!(matches!(err, AccountStoreError::RefCodeTaken { .. }));

        // The failed write left nothing behind.
        assert!(db.account("0xBBB").unwrap().is_none());
        assert_eq!(db.owner_of(&code("AB12CD")).unwrap().as_deref(), Some("0xaaa"));
    }

    #[test]
    fn second_code_replaces_first_and_frees_it() {
        let (db, _dir) = test_db();
        db.upsert_ref_code("0xAAA", &code("AB12CD")).unwrap();
        db.upsert_ref_code("0xAAA", &code("XY98ZW")).unwrap();

        let loaded = db.account("0xAAA").unwrap().unwrap();
        assert_eq!(loaded.ref_code.as_deref(), Some("XY98ZW"));
        assert!(db.owner_of(&code("AB12CD")).unwrap().is_none());

        // The released code can now be claimed by someone else.
        db.upsert_ref_code("0xBBB", &code("AB12CD")).unwrap();
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.redb");
        {
            let db = AccountDatabase::open(&path).unwrap();
            db.upsert_ref_code("0xAAA", &code("AB12CD")).unwrap();
        }
        let db = AccountDatabase::open(&path).unwrap();
        assert_eq!(
            db.account("0xAAA").unwrap().unwrap().ref_code.as_deref(),
            Some("AB12CD")
        );
    }

    #[test]
    fn concurrent_writers_cannot_share_a_code() {
        let (db, _dir) = test_db();
        let db = Arc::new(db);

        let handles: Vec<_> = ["0xAAA", "0xBBB"]
            .into_iter()
            .map(|address| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || db.upsert_ref_code(address, &code("AB12CD")))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);

        let owner = db.owner_of(&code("AB12CD")).unwrap().unwrap();
        let holders = ["0xaaa", "0xbbb"]
            .into_iter()
            .filter(|a| {
                db.account(a)
                    .unwrap()
                    .and_then(|acc| acc.ref_code)
                    .as_deref()
                    == Some("AB12CD")
            })
            .collect::<Vec<_>>();
        assert_eq!(holders, vec![owner.as_str()]);
    }

    #[test]
    fn health_check_passes_on_open_db() {
        let (db, _dir) = test_db();
        db.health_check().unwrap();
    }
}
