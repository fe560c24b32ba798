// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie transport: reading `Cookie` and building `Set-Cookie`.

use axum::http::{header::COOKIE, HeaderMap};
use cookie::{time::Duration, Cookie, SameSite};

use crate::config::SessionConfig;

/// Find the value of cookie `name` across all `Cookie` headers.
///
/// Malformed pairs are skipped.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value_trimmed().to_string())
}

/// `Set-Cookie` value carrying a sealed session.
pub fn session_cookie(config: &SessionConfig, sealed: &str) -> String {
    let max_age = i64::try_from(config.ttl.as_secs()).unwrap_or(i64::MAX);
    build(config, sealed.to_string(), max_age)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn removal_cookie(config: &SessionConfig) -> String {
    build(config, String::new(), 0)
}

fn build(config: &SessionConfig, value: String, max_age_secs: i64) -> String {
    Cookie::build((config.cookie_name.clone(), value))
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .build()
        .to_string()
}
