// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Poller
//!
//! Periodically revalidates the session against `GET /api/session`, stores
//! the status in the [`SessionCache`] and feeds it to the [`SessionGuard`].
//! This is what moves the guard when the session changes server-side (a new
//! login, a logout in another tab, a refreshed expiry).
//!
//! A failed poll is logged and retried on the next tick only.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, like every other background
//! loop in this crate.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{GuardPorts, SessionCache, SessionClient, SessionGuard};

/// Default interval between session revalidations.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub struct SessionPoller {
    client: SessionClient,
    cache: SessionCache,
    poll_interval: Duration,
}

impl SessionPoller {
    pub fn new(client: SessionClient, cache: SessionCache) -> Self {
        Self {
            client,
            cache,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the poller loop until the cancellation token is triggered.
    pub async fn run<P: GuardPorts>(&self, guard: &SessionGuard<P>, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Session poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Session poller shutting down");
                return;
            }

            self.poll_step(guard).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session poller shutting down");
                    return;
                }
            }
        }
    }

    /// Fetch the status once and hand it to the guard.
    pub async fn poll_step<P: GuardPorts>(&self, guard: &SessionGuard<P>) {
        match self.client.get_session().await {
            Ok(status) => {
                debug!(logged_in = status.is_logged_in, expires_at = ?status.expires_at, "Session poll");
                self.cache.store(status.clone()).await;
                if let Some(report) = guard.observe(&status).await {
                    debug!(completed = report.completed.len(), "Poll triggered logout");
                }
            }
            Err(e) => warn!(error = %e, "Session poll failed"),
        }
    }
}
