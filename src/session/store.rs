// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session store and the per-request [`Session`] handle.
//!
//! The store owns the cookie settings and the sealer. A [`Session`] is
//! extracted for every request that needs one; it never rejects (a missing,
//! tampered or expired cookie reads as an empty record) and queues any
//! `save`/`destroy` as a `Set-Cookie` header emitted when the handle is
//! returned as part of the response:
//!
//! ```rust,ignore
//! async fn logout(mut session: Session) -> (Session, Json<DeleteSessionResponse>) {
//!     session.destroy();
//!     (session, Json(DeleteSessionResponse { ok: true }))
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::SET_COOKIE, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use tracing::{debug, warn};

use super::{cookie, SealError, SessionRecord, SessionSealer};
use crate::config::SessionConfig;
use crate::state::AppState;

/// Cookie-backed session store.
pub struct SessionStore {
    config: SessionConfig,
    sealer: SessionSealer,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Result<Self, SealError> {
        let sealer = SessionSealer::new(&config)?;
        Ok(Self { config, sealer })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read the record carried by the request's cookie.
    pub fn load(&self, headers: &HeaderMap, now_millis: i64) -> SessionRecord {
        let Some(sealed) = cookie::find_cookie(headers, &self.config.cookie_name) else {
            return SessionRecord::default();
        };
        if sealed.is_empty() {
            return SessionRecord::default();
        }

        match self.sealer.unseal(&sealed, now_millis) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "Discarding unreadable session cookie");
                SessionRecord::default()
            }
        }
    }

    /// `Set-Cookie` value persisting `record`.
    pub fn save_cookie(&self, record: &SessionRecord, now_millis: i64) -> Result<String, SealError> {
        let sealed = self.sealer.seal(record, now_millis)?;
        Ok(cookie::session_cookie(&self.config, &sealed))
    }

    /// `Set-Cookie` value removing the session.
    pub fn removal_cookie(&self) -> String {
        cookie::removal_cookie(&self.config)
    }
}

enum PendingCookie {
    Save(String),
    Remove,
}

/// Session bound to a single request.
pub struct Session {
    record: SessionRecord,
    store: Arc<SessionStore>,
    pending: Option<PendingCookie>,
}

impl Session {
    pub fn load(store: Arc<SessionStore>, headers: &HeaderMap, now_millis: i64) -> Self {
        let record = store.load(headers, now_millis);
        Self {
            record,
            store,
            pending: None,
        }
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn identity(&self) -> Option<&str> {
        self.record.identity()
    }

    /// Replace the record and queue a fresh cookie.
    pub fn save(&mut self, record: SessionRecord, now_millis: i64) -> Result<(), SealError> {
        let cookie = self.store.save_cookie(&record, now_millis)?;
        self.record = record;
        self.pending = Some(PendingCookie::Save(cookie));
        Ok(())
    }

    /// Clear the record and queue cookie removal. Idempotent.
    pub fn destroy(&mut self) {
        self.record = SessionRecord::default();
        self.pending = Some(PendingCookie::Remove);
    }

    /// The `Set-Cookie` value this handle will emit, if any.
    pub fn set_cookie(&self) -> Option<String> {
        match &self.pending {
            Some(PendingCookie::Save(cookie)) => Some(cookie.clone()),
            Some(PendingCookie::Remove) => Some(self.store.removal_cookie()),
            None => None,
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Session::load(
            Arc::clone(&state.sessions),
            &parts.headers,
            state.clock.now_millis(),
        ))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(cookie) = self.set_cookie() {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    res.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => warn!(error = %e, "Session cookie is not a valid header value"),
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn store() -> Arc<SessionStore> {
        let config = SessionConfig::new("complex_password_at_least_32_characters_long")
            .unwrap()
            .with_cookie_name("sid");
        Arc::new(SessionStore::new(config).unwrap())
    }

    fn headers_with(cookie_header: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        headers
    }

    /// Extract the `name=value` pair from a `Set-Cookie` value.
    fn cookie_pair(set_cookie: &str) -> String {
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[test]
    fn missing_cookie_is_empty_session() {
        let session = Session::load(store(), &HeaderMap::new(), 0);
        assert!(!session.record().is_logged_in());
        assert!(session.set_cookie().is_none());
    }

    #[test]
    fn saved_session_is_readable_on_next_request() {
        let store = store();
        let mut session = Session::load(Arc::clone(&store), &HeaderMap::new(), 0);
        session
            .save(SessionRecord::establish("0xAAA", 100), 100)
            .unwrap();

        let set_cookie = session.set_cookie().unwrap();
        let next = Session::load(store, &headers_with(&cookie_pair(&set_cookie)), 200);
        assert_eq!(next.identity(), Some("0xAAA"));
    }

    #[test]
    fn tampered_cookie_is_empty_session() {
        let session = Session::load(store(), &headers_with("sid=not-a-real-seal"), 0);
        assert!(!session.record().is_logged_in());
    }

    #[test]
    fn destroy_queues_removal_even_without_session() {
        let mut session = Session::load(store(), &HeaderMap::new(), 0);
        session.destroy();
        session.destroy();
        let set_cookie = session.set_cookie().unwrap();
        assert!(set_cookie.starts_with("sid=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
