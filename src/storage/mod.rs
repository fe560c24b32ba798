// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Storage Module
//!
//! Durable storage for accounts and their referral codes.
//!
//! ## Layout
//!
//! ```text
//! $DATA_DIR/
//!   accounts.redb     # accounts + ref_code_index tables
//! ```
//!
//! ## Uniqueness
//!
//! Every store exposes an atomic "write, fail if another account owns the
//! code" primitive ([`AccountStore::upsert_ref_code`]). Any read-side check
//! done before calling it is only a fast path.

pub mod account_db;
pub mod accounts;
pub mod memory;

pub use account_db::AccountDatabase;
pub use accounts::{
    account_key, AccountStore, AccountStoreError, AccountStoreResult, StoredAccount,
};
pub use memory::InMemoryAccountStore;
