// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Guard
//!
//! Client-resident watchdog that logs the user out exactly once when the
//! session expires or the wallet disconnects.
//!
//! ## States
//!
//! ```text
//!            observe(logged in, expiresAt > now)
//!   Idle ───────────────────────────────────────▶ Scheduled
//!    ▲  ◀──────── observe(logged out) ───────────    │
//!    │                                               │ timer fires /
//!    │      expiresAt <= now / wallet disconnect     │ wallet disconnect
//!    │  ─────────────────────────────────────────┐   ▼
//!    └──────────── sequence finished ◀────── LoggingOut
//! ```
//!
//! Every new `(isLoggedIn, expiresAt)` input cancels the armed timer before
//! anything else happens. A logged-in input while the wallet reports itself
//! disconnected is treated as a wallet disconnect. Timer tasks carry the generation they were armed
//! with; a fire whose generation is no longer current is ignored. While
//! `LoggingOut`, further triggers are dropped.
//!
//! ## Logout sequence
//!
//! 1. `DELETE /api/session`
//! 2. disconnect the wallet if it is still connected
//! 3. invalidate the cached session status (no refetch)
//! 4. hard navigation to the login page
//!
//! Each step is attempted even when an earlier one failed. Failures are
//! logged and returned in the [`LogoutReport`]. The state always returns to
//! `Idle` afterwards, including when the sequence is cancelled mid-flight.
//!
//! Dropping the [`SessionGuard`] cancels any armed timer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::models::SessionStatus;

pub mod cache;
pub mod client;
pub mod poller;
pub mod ports;

pub use cache::SessionCache;
pub use client::SessionClient;
pub use poller::SessionPoller;
pub use ports::{ClientPorts, GuardError, GuardPorts, Navigator, WalletConnection};

/// Default destination of the post-logout navigation.
pub const LOGIN_PATH: &str = "/login";

/// What started a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutTrigger {
    Expired,
    WalletDisconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutStep {
    DeleteSession,
    DisconnectWallet,
    InvalidateCache,
    Navigate,
}

/// Outcome of one logout sequence.
#[derive(Debug)]
pub struct LogoutReport {
    pub trigger: LogoutTrigger,
    pub completed: Vec<LogoutStep>,
    pub failed: Vec<(LogoutStep, GuardError)>,
}

impl LogoutReport {
    fn new(trigger: LogoutTrigger) -> Self {
        Self {
            trigger,
            completed: Vec::new(),
            failed: Vec::new(),
        }
    }

    fn record(&mut self, step: LogoutStep, result: Result<(), GuardError>) {
        match result {
            Ok(()) => self.completed.push(step),
            Err(e) => {
                warn!(step = ?step, trigger = ?self.trigger, error = %e, "Logout step failed");
                self.failed.push((step, e));
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Observable phase of the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Idle,
    Scheduled { expires_at: i64 },
    LoggingOut,
}

enum Phase {
    Idle,
    Scheduled {
        expires_at: i64,
        generation: u64,
        cancel: CancellationToken,
    },
    LoggingOut,
}

struct Core {
    phase: Phase,
    generation: u64,
    logged_in: bool,
}

impl Core {
    /// Cancel an armed timer and fall back to `Idle`. No-op otherwise.
    fn disarm(&mut self) {
        if let Phase::Scheduled { cancel, .. } = &self.phase {
            cancel.cancel();
            self.phase = Phase::Idle;
        }
    }
}

enum Next {
    Nothing,
    LogoutNow(LogoutTrigger),
    Arm {
        generation: u64,
        delay: Duration,
        cancel: CancellationToken,
    },
}

struct Inner<P> {
    ports: P,
    clock: Arc<dyn Clock>,
    login_path: String,
    core: Mutex<Core>,
}

impl<P: GuardPorts> Inner<P> {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn on_timer(&self, generation: u64) -> Option<LogoutReport> {
        {
            let mut core = self.lock();
            let current = matches!(
                core.phase,
                Phase::Scheduled { generation: armed, .. } if armed == generation
            );
            if !current {
                debug!(generation, "Ignoring stale expiry timer");
                return None;
            }
            core.phase = Phase::LoggingOut;
        }
        info!("Session expired, logging out");
        Some(self.logout(LogoutTrigger::Expired).await)
    }

    /// Run the logout sequence. The caller must have moved the phase to
    /// `LoggingOut`.
    async fn logout(&self, trigger: LogoutTrigger) -> LogoutReport {
        let _release = ReleaseOnDrop(self);
        let mut report = LogoutReport::new(trigger);

        report.record(LogoutStep::DeleteSession, self.ports.delete_session().await);
        if self.ports.wallet_connected() {
            report.record(LogoutStep::DisconnectWallet, self.ports.disconnect_wallet().await);
        }
        report.record(
            LogoutStep::InvalidateCache,
            self.ports.invalidate_session_cache().await,
        );
        report.record(LogoutStep::Navigate, self.ports.navigate(&self.login_path));

        info!(
            trigger = ?trigger,
            failed_steps = report.failed.len(),
            "Logout sequence finished"
        );
        report
    }
}

/// Returns the guard to `Idle` when the logout sequence ends, however it ends.
struct ReleaseOnDrop<'a, P: GuardPorts>(&'a Inner<P>);

impl<P: GuardPorts> Drop for ReleaseOnDrop<'_, P> {
    fn drop(&mut self) {
        let mut core = self.0.lock();
        if matches!(core.phase, Phase::LoggingOut) {
            core.phase = Phase::Idle;
        }
        core.logged_in = false;
    }
}

/// The session guard. One per active client.
pub struct SessionGuard<P: GuardPorts> {
    inner: Arc<Inner<P>>,
}

impl<P: GuardPorts> SessionGuard<P> {
    pub fn new(ports: P, clock: Arc<dyn Clock>) -> Self {
        Self::with_login_path(ports, clock, LOGIN_PATH)
    }

    pub fn with_login_path(ports: P, clock: Arc<dyn Clock>, login_path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                ports,
                clock,
                login_path: login_path.into(),
                core: Mutex::new(Core {
                    phase: Phase::Idle,
                    generation: 0,
                    logged_in: false,
                }),
            }),
        }
    }

    pub fn ports(&self) -> &P {
        &self.inner.ports
    }

    pub fn phase(&self) -> GuardPhase {
        match self.inner.lock().phase {
            Phase::Idle => GuardPhase::Idle,
            Phase::Scheduled { expires_at, .. } => GuardPhase::Scheduled { expires_at },
            Phase::LoggingOut => GuardPhase::LoggingOut,
        }
    }

    /// Feed the latest session status.
    ///
    /// Arms, re-arms or cancels the expiry timer. A logged-in status is
    /// logged out inline, and the report returned, when it is already
    /// expired or when the wallet is no longer connected. Expiry wins when
    /// both hold.
    pub async fn observe(&self, status: &SessionStatus) -> Option<LogoutReport> {
        let now = self.inner.clock.now_millis();
        let wallet_connected = self.inner.ports.wallet_connected();
        let next = {
            let mut core = self.inner.lock();
            core.logged_in = status.is_logged_in;

            let armed = match core.phase {
                Phase::Scheduled { expires_at, .. } => Some(expires_at),
                _ => None,
            };

            if matches!(core.phase, Phase::LoggingOut) {
                // A running logout owns the state.
                Next::Nothing
            } else {
                match (status.is_logged_in, status.expires_at) {
                    (true, Some(expires_at)) if expires_at <= now => {
                        core.disarm();
                        core.phase = Phase::LoggingOut;
                        Next::LogoutNow(LogoutTrigger::Expired)
                    }
                    (true, _) if !wallet_connected => {
                        core.disarm();
                        core.phase = Phase::LoggingOut;
                        Next::LogoutNow(LogoutTrigger::WalletDisconnected)
                    }
                    (true, Some(expires_at)) if armed == Some(expires_at) => Next::Nothing,
                    (true, Some(expires_at)) => {
                        core.disarm();
                        core.generation += 1;
                        let generation = core.generation;
                        let cancel = CancellationToken::new();
                        core.phase = Phase::Scheduled {
                            expires_at,
                            generation,
                            cancel: cancel.clone(),
                        };
                        Next::Arm {
                            generation,
                            delay: Duration::from_millis((expires_at - now) as u64),
                            cancel,
                        }
                    }
                    _ => {
                        core.disarm();
                        Next::Nothing
                    }
                }
            }
        };

        match next {
            Next::Nothing => None,
            Next::LogoutNow(trigger) => {
                match trigger {
                    LogoutTrigger::Expired => info!("Session already expired, logging out"),
                    LogoutTrigger::WalletDisconnected => {
                        info!("Session active without a connected wallet, logging out")
                    }
                }
                Some(self.inner.logout(trigger).await)
            }
            Next::Arm {
                generation,
                delay,
                cancel,
            } => {
                debug!(delay_ms = delay.as_millis() as u64, generation, "Armed session expiry timer");
                spawn_timer(Arc::downgrade(&self.inner), generation, delay, cancel);
                None
            }
        }
    }

    /// Wallet-disconnect signal from the wallet connection.
    ///
    /// Starts a logout if a session is believed active and no logout is
    /// already running.
    pub async fn wallet_disconnected(&self) -> Option<LogoutReport> {
        {
            let mut core = self.inner.lock();
            if !core.logged_in || matches!(core.phase, Phase::LoggingOut) {
                return None;
            }
            core.disarm();
            core.phase = Phase::LoggingOut;
        }
        info!("Wallet disconnected, logging out");
        Some(self.inner.logout(LogoutTrigger::WalletDisconnected).await)
    }
}

impl<P: GuardPorts> Drop for SessionGuard<P> {
    fn drop(&mut self) {
        self.inner.lock().disarm();
    }
}

fn spawn_timer<P: GuardPorts>(
    inner: Weak<Inner<P>>,
    generation: u64,
    delay: Duration,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                if let Some(inner) = inner.upgrade() {
                    inner.on_timer(generation).await;
                }
            }
        }
    });
}
