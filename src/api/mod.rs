// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthorizeOutcome,
    models::{
        ClaimReferralRequest, ClaimReferralResponse, DeleteSessionResponse, ErrorResponse,
        ReferralCodeResponse, SessionStatus,
    },
    state::AppState,
};

pub mod health;
pub mod referral;
pub mod session;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/session",
            get(session::get_session).delete(session::delete_session),
        )
        .route(
            "/referral",
            get(referral::get_referral).post(referral::claim_referral),
        );

    #[cfg(feature = "dev")]
    let api_routes = api_routes.route("/session/dev-login", axum::routing::post(session::dev_login));

    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

/// Any panic in a handler surfaces as a structured internal error.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail: &str = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            success: false,
            error: "Internal Server Error".to_string(),
        }),
    )
        .into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        session::get_session,
        session::delete_session,
        referral::get_referral,
        referral::claim_referral,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SessionStatus,
            DeleteSessionResponse,
            ClaimReferralRequest,
            ClaimReferralResponse,
            ReferralCodeResponse,
            ErrorResponse,
            AuthorizeOutcome
        )
    ),
    tags(
        (name = "Session", description = "Session status and logout"),
        (name = "Referral", description = "Referral code claiming"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;
    use crate::state::test_support::{session_cookie_header, test_state};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    const TTL_MILLIS: i64 = 3_600_000;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _clock) = test_state(0);
        let _ = router(state).into_make_service();
    }

    #[tokio::test]
    async fn anonymous_session_read() {
        let (state, _clock) = test_state(0);
        let response = router(state)
            .oneshot(request("GET", "/api/session", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(body_json(response).await, serde_json::json!({"isLoggedIn": false}));
    }

    #[tokio::test]
    async fn expired_session_read_clears_cookie() {
        let (state, clock) = test_state(0);
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 1_000);
        clock.set(TTL_MILLIS + 1);

        let response = router(state)
            .oneshot(request("GET", "/api/session", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("Max-Age=0"));
        assert_eq!(body_json(response).await, serde_json::json!({"isLoggedIn": false}));
    }

    #[tokio::test]
    async fn delete_session_always_ok() {
        let (state, _clock) = test_state(0);
        let response = router(state)
            .oneshot(request("DELETE", "/api/session", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert_eq!(body_json(response).await, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn referral_requires_session() {
        let (state, _clock) = test_state(0);
        let response = router(state)
            .oneshot(request("POST", "/api/referral", None, Some(r#"{"code":"AB12CD"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "Unauthorized", "address": null})
        );
    }

    #[tokio::test]
    async fn claim_and_fetch_over_http() {
        let (state, _clock) = test_state(0);
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 0);
        let app = router(state);

        let response = app
            .clone()
            .oneshot(request("POST", "/api/referral", Some(&cookie), Some(r#"{"code":"AB12CD"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": true, "message": "Successfully claim referral code"})
        );

        let response = app
            .oneshot(request("GET", "/api/referral", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": true, "data": "AB12CD"})
        );
    }

    #[tokio::test]
    async fn invalid_claim_is_structured_422() {
        let (state, _clock) = test_state(0);
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 0);
        let response = router(state)
            .oneshot(request("POST", "/api/referral", Some(&cookie), Some(r#"{"code":"AB!2CD"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "success": false,
                "error": "Invalid code. Must be 6 uppercase alphanumeric characters."
            })
        );
    }

    #[tokio::test]
    async fn unreadable_claim_body_is_structured_422() {
        let (state, _clock) = test_state(0);
        let cookie = session_cookie_header(&state, &SessionRecord::establish("0xAAA", 0), 0);
        let app = router(state);

        for body in ["{}", "not json", r#"{"code":5}"#] {
            let response = app
                .clone()
                .oneshot(request("POST", "/api/referral", Some(&cookie), Some(body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
            assert_eq!(
                body_json(response).await,
                serde_json::json!({
                    "success": false,
                    "error": "Invalid code. Must be 6 uppercase alphanumeric characters."
                }),
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        async fn boom() -> &'static str {
            panic!("boom")
        }

        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));
        let response = app
            .oneshot(request("GET", "/boom", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "Internal Server Error"})
        );
    }

    #[tokio::test]
    async fn health_routes_respond() {
        let (state, _clock) = test_state(0);
        let app = router(state);
        for uri in ["/health", "/health/live", "/health/ready"] {
            let response = app.clone().oneshot(request("GET", uri, None, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
