// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::SessionStatus;

/// Last known session status, shared between the poller and readers.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    inner: Arc<RwLock<Option<SessionStatus>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<SessionStatus> {
        self.inner.read().await.clone()
    }

    pub async fn store(&self, status: SessionStatus) {
        *self.inner.write().await = Some(status);
    }

    /// Forget the cached status. The next poll repopulates it.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_clears_shared_status() {
        let cache = SessionCache::new();
        let reader = cache.clone();
        cache.store(SessionStatus::logged_in("0xAAA", false, 1)).await;
        assert!(reader.get().await.unwrap().is_logged_in);

        cache.invalidate().await;
        assert!(reader.get().await.is_none());
    }
}
