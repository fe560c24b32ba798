// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Module
//!
//! Server-side session lifecycle for wallet-authenticated users.
//!
//! ## Model
//!
//! A session is a [`SessionRecord`] sealed into an encrypted, authenticated
//! cookie. The record carries the identity (wallet address), a cached
//! referral flag and the creation time. Absence of an identity means
//! "logged out" regardless of any other field.
//!
//! ## Expiry
//!
//! Expiry is enforced twice:
//!
//! - **Business rule** (authoritative): `createdAt + TTL`, checked on every
//!   `GET /api/session` and destroying the session when passed.
//! - **Transport**: the seal carries its own expiry and the cookie a
//!   `Max-Age`, so stale cookies stop decrypting on their own.
//!
//! Session creation (wallet signature verification) happens outside this
//! crate; [`SessionRecord::establish`] is the entry point it uses.

pub mod cookie;
pub mod record;
pub mod seal;
pub mod store;

pub use record::{SessionRecord, SiweIdentity};
pub use seal::{SealError, SessionSealer};
pub use store::{Session, SessionStore};
