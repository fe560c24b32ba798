// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session read/delete handlers.
//!
//! `GET /api/session` enforces the business TTL itself: the sealed cookie
//! also expires, but a record is only reported as logged in while
//! `now <= createdAt + TTL`.

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    models::{DeleteSessionResponse, SessionStatus},
    session::Session,
    state::AppState,
};

/// Status of `session` at `now_millis`, destroying it once expired.
pub fn read_session(session: &mut Session, now_millis: i64) -> SessionStatus {
    let record = session.record();
    let Some(address) = record.identity() else {
        return SessionStatus::logged_out();
    };

    let expires_at = record.expires_at(now_millis);
    if record.is_expired(now_millis) {
        info!(address = %address, expires_at, "Session expired, destroying");
        session.destroy();
        return SessionStatus::logged_out();
    }

    SessionStatus::logged_in(address, record.has_referral, expires_at)
}

#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    responses((status = 200, body = SessionStatus))
)]
pub async fn get_session(
    State(state): State<AppState>,
    mut session: Session,
) -> (Session, Json<SessionStatus>) {
    let status = read_session(&mut session, state.now_millis());
    (session, Json(status))
}

#[utoipa::path(
    delete,
    path = "/api/session",
    tag = "Session",
    responses((status = 200, body = DeleteSessionResponse))
)]
pub async fn delete_session(mut session: Session) -> (Session, Json<DeleteSessionResponse>) {
    session.destroy();
    (session, Json(DeleteSessionResponse { ok: true }))
}

/// Establish a session for any address without proof. Development builds only.
#[cfg(feature = "dev")]
pub async fn dev_login(
    State(state): State<AppState>,
    mut session: Session,
    Json(request): Json<crate::models::DevLoginRequest>,
) -> Result<(Session, Json<SessionStatus>), crate::error::ApiError> {
    use crate::session::SessionRecord;

    let now = state.now_millis();
    let record = SessionRecord::establish(request.address.trim(), now);
    session.save(record, now).map_err(|e| {
        tracing::error!(error = %e, "Failed to seal dev session");
        crate::error::ApiError::internal()
    })?;
    tracing::warn!(address = %request.address, "Dev login established a session without proof");

    let status = read_session(&mut session, now);
    Ok((session, Json(status)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;
    use crate::state::test_support::{session_cookie_header, test_state};
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
    use std::sync::Arc;

    const TTL_MILLIS: i64 = 3_600_000;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn no_identity_is_logged_out() {
        let (state, _clock) = test_state(0);
        let mut session = Session::load(Arc::clone(&state.sessions), &HeaderMap::new(), 0);
        assert_eq!(read_session(&mut session, 0), SessionStatus::logged_out());
        assert!(session.set_cookie().is_none());
    }

    #[test]
    fn live_session_reports_identity_and_expiry() {
        let (state, _clock) = test_state(0);
        let mut record = SessionRecord::establish("0xAAA", 1_000);
        record.has_referral = true;
        let cookie = session_cookie_header(&state, &record, 1_000);

        let mut session = Session::load(Arc::clone(&state.sessions), &headers(&cookie), 2_000);
        assert_eq!(
            read_session(&mut session, 2_000),
            SessionStatus::logged_in("0xAAA", true, 1_000 + TTL_MILLIS)
        );
        assert!(session.set_cookie().is_none());
    }

    #[test]
    fn expiry_boundary_is_inclusive_of_expires_at() {
        let (state, _clock) = test_state(0);
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 1_000);

        let mut at_boundary = Session::load(Arc::clone(&state.sessions), &headers(&cookie), TTL_MILLIS);
        assert!(read_session(&mut at_boundary, TTL_MILLIS).is_logged_in);
    }

    #[test]
    fn expired_session_is_destroyed_on_read() {
        let (state, _clock) = test_state(0);
        // Sealed later than created so the cookie itself is still valid and
        // only the business check can reject it.
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 1_000);
        let now = TTL_MILLIS + 1;

        let mut session = Session::load(Arc::clone(&state.sessions), &headers(&cookie), now);
        assert_eq!(session.identity(), Some("0xAAA"));
        assert_eq!(read_session(&mut session, now), SessionStatus::logged_out());

        let set_cookie = session.set_cookie().expect("removal cookie");
        assert!(set_cookie.contains("Max-Age=0"));

        // The browser now holds the removal cookie.
        let removed = set_cookie.split(';').next().unwrap().to_string();
        let mut next = Session::load(Arc::clone(&state.sessions), &headers(&removed), now);
        assert_eq!(read_session(&mut next, now), SessionStatus::logged_out());
    }

    #[test]
    fn missing_created_at_counts_as_now() {
        let (state, _clock) = test_state(0);
        let record = SessionRecord {
            created_at: None,
            ..SessionRecord::establish("0xAAA", 0)
        };
        let cookie = session_cookie_header(&state, &record, 500);

        let mut session = Session::load(Arc::clone(&state.sessions), &headers(&cookie), 900);
        let status = read_session(&mut session, 900);
        assert!(status.is_logged_in);
        assert_eq!(status.expires_at, Some(900 + TTL_MILLIS));
    }

    #[tokio::test]
    async fn delete_is_ok_with_or_without_session() {
        let (state, _clock) = test_state(0);

        let empty = Session::load(Arc::clone(&state.sessions), &HeaderMap::new(), 0);
        let (session, Json(body)) = delete_session(empty).await;
        assert_eq!(body, DeleteSessionResponse { ok: true });
        assert!(session.set_cookie().unwrap().contains("Max-Age=0"));

        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 0);
        let live = Session::load(Arc::clone(&state.sessions), &headers(&cookie), 0);
        let (session, Json(body)) = delete_session(live).await;
        assert!(body.ok);
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn get_session_uses_state_clock() {
        let (state, clock) = test_state(1_000);
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 1_000);

        let session = Session::load(Arc::clone(&state.sessions), &headers(&cookie), 1_000);
        let (_, Json(status)) = get_session(State(state.clone()), session).await;
        assert!(status.is_logged_in);

        clock.set(TTL_MILLIS + 1);
        let session = Session::load(Arc::clone(&state.sessions), &headers(&cookie), TTL_MILLIS + 1);
        let (session, Json(status)) = get_session(State(state), session).await;
        assert!(!status.is_logged_in);
        assert!(session.set_cookie().is_some());
    }
}
