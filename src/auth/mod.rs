// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Every privileged operation passes through the auth gate, which reduces the
//! request's session to `{authorized, identity}`.
//!
//! ## Auth Flow
//!
//! 1. An external login flow verifies the wallet signature and establishes a
//!    session (sealed cookie) holding the wallet address.
//! 2. Each request carries the cookie; the server unseals it.
//! 3. The gate grants access iff the record holds an identity. Otherwise the
//!    request fails with a uniform `Unauthorized`.

pub mod error;
pub mod extractor;
pub mod gate;

pub use error::AuthError;
pub use extractor::Auth;
pub use gate::{authorize, AuthenticatedUser, AuthorizeOutcome};
