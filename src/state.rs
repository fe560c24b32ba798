// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::referral::ReferralRegistry;
use crate::session::SessionStore;
use crate::storage::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub referrals: ReferralRegistry,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(sessions: SessionStore, accounts: Arc<dyn AccountStore>) -> Self {
        Self::with_clock(sessions, accounts, Arc::new(SystemClock))
    }

    pub fn with_clock(
        sessions: SessionStore,
        accounts: Arc<dyn AccountStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            referrals: ReferralRegistry::new(accounts),
            clock,
        }
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}
