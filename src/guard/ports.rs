// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Side effects the session guard performs during logout.

use std::future::Future;

use super::{SessionCache, SessionClient};

/// Failure of a single logout step.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuardError {
    #[error("session request failed: {0}")]
    Http(String),

    #[error("session endpoint returned status {0}")]
    Status(u16),

    #[error("session endpoint returned an unexpected body")]
    UnexpectedBody,

    #[error("wallet disconnect failed: {0}")]
    Wallet(String),

    #[error("navigation failed: {0}")]
    Navigation(String),
}

impl From<reqwest::Error> for GuardError {
    fn from(err: reqwest::Error) -> Self {
        GuardError::Http(err.to_string())
    }
}

/// The user's wallet connection.
pub trait WalletConnection: Send + Sync + 'static {
    fn is_connected(&self) -> bool;

    fn disconnect(&self) -> impl Future<Output = Result<(), GuardError>> + Send;
}

/// Hard navigation of the client (full page load).
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, destination: &str) -> Result<(), GuardError>;
}

/// Everything the logout sequence touches.
pub trait GuardPorts: Send + Sync + 'static {
    /// Destroy the server-side session.
    fn delete_session(&self) -> impl Future<Output = Result<(), GuardError>> + Send;

    fn wallet_connected(&self) -> bool;

    fn disconnect_wallet(&self) -> impl Future<Output = Result<(), GuardError>> + Send;

    /// Drop cached session data without refetching it.
    fn invalidate_session_cache(&self) -> impl Future<Output = Result<(), GuardError>> + Send;

    fn navigate(&self, destination: &str) -> Result<(), GuardError>;
}

/// Production ports: the HTTP session client and cache plus the host's
/// wallet connection and navigator.
pub struct ClientPorts<W, N> {
    client: SessionClient,
    cache: SessionCache,
    wallet: W,
    navigator: N,
}

impl<W: WalletConnection, N: Navigator> ClientPorts<W, N> {
    pub fn new(client: SessionClient, cache: SessionCache, wallet: W, navigator: N) -> Self {
        Self {
            client,
            cache,
            wallet,
            navigator,
        }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }
}

impl<W: WalletConnection, N: Navigator> GuardPorts for ClientPorts<W, N> {
    async fn delete_session(&self) -> Result<(), GuardError> {
        self.client.delete_session().await
    }

    fn wallet_connected(&self) -> bool {
        self.wallet.is_connected()
    }

    async fn disconnect_wallet(&self) -> Result<(), GuardError> {
        self.wallet.disconnect().await
    }

    async fn invalidate_session_cache(&self) -> Result<(), GuardError> {
        self.cache.invalidate().await;
        Ok(())
    }

    fn navigate(&self, destination: &str) -> Result<(), GuardError> {
        self.navigator.navigate(destination)
    }
}
