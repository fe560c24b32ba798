// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encoteki Server - Wallet Session & Referral Service
//!
//! Wallet-authenticated users hold a short-lived sealed-cookie session and may
//! claim one globally unique referral code.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Auth gate and extractors
//! - `session` - Session record, sealing and cookie transport
//! - `referral` - Referral code validation and registry
//! - `storage` - Durable account store (redb)
//! - `guard` - Client-side session guard (expiry / wallet-disconnect logout)

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod referral;
pub mod session;
pub mod state;
pub mod storage;
