// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the session endpoints.
//!
//! Holds its own cookie jar so the session cookie set by the login flow (and
//! cleared by `DELETE /api/session`) follows every request, the way a browser
//! would.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

use super::GuardError;
use crate::models::{DeleteSessionResponse, SessionStatus};

const SESSION_PATH: &str = "/api/session";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SessionClient {
    base_url: Url,
    jar: Arc<Jar>,
    http: reqwest::Client,
}

impl SessionClient {
    pub fn new(base_url: Url) -> Result<Self, GuardError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url,
            jar,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cookie jar shared with the login flow.
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    fn session_url(&self) -> Result<Url, GuardError> {
        self.base_url
            .join(SESSION_PATH)
            .map_err(|e| GuardError::Http(e.to_string()))
    }

    /// `GET /api/session`.
    pub async fn get_session(&self) -> Result<SessionStatus, GuardError> {
        let response = self.http.get(self.session_url()?).send().await?;
        if !response.status().is_success() {
            return Err(GuardError::Status(response.status().as_u16()));
        }
        Ok(response.json::<SessionStatus>().await?)
    }

    /// `DELETE /api/session`.
    pub async fn delete_session(&self) -> Result<(), GuardError> {
        let response = self.http.delete(self.session_url()?).send().await?;
        if !response.status().is_success() {
            return Err(GuardError::Status(response.status().as_u16()));
        }
        let body = response.json::<DeleteSessionResponse>().await?;
        if !body.ok {
            return Err(GuardError::UnexpectedBody);
        }
        Ok(())
    }
}
