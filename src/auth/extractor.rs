// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require an authenticated session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.address is the session's wallet address
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{authorize, AuthError, AuthenticatedUser};
use crate::session::Session;
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Reads the session cookie and runs it through [`authorize`]. Rejects with
/// [`AuthError::Unauthorized`] when no identity is present.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await;
        let user = authorize(session.record()).into_result()?;
        Ok(Auth(user))
    }
}
