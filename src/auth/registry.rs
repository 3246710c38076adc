//! Process-wide set of tokens that are currently honoured.
//!
//! A token is usable only while it is both cryptographically valid and
//! present here. The set starts empty, gains an entry on every login, loses
//! it on logout, and expired entries are swept by [`spawn_pruner`]. Nothing
//! is persisted: a restart logs everybody out.
//!
//! Every operation takes the lock synchronously and never awaits while
//! holding it.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use time::OffsetDateTime;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Default)]
pub struct RevocationRegistry {
    live: RwLock<HashMap<String, OffsetDateTime>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, token: &str, expires_at: OffsetDateTime) {
        self.write().insert(token.to_string(), expires_at);
    }

    /// Returns whether the token was live. Revoking twice is harmless.
    pub fn revoke(&self, token: &str) -> bool {
        self.write().remove(token).is_some()
    }

    /// Present and not yet past its expiry. Expired entries wait for the pruner.
    pub fn is_live(&self, token: &str) -> bool {
        self.is_live_at(token, OffsetDateTime::now_utc())
    }

    pub fn is_live_at(&self, token: &str, now: OffsetDateTime) -> bool {
        self.read()
            .get(token)
            .is_some_and(|expires_at| *expires_at > now)
    }

    /// Drops entries whose expiry is at or before `now`.
    pub fn prune_expired(&self, now: OffsetDateTime) -> usize {
        let mut live = self.write();
        let before = live.len();
        live.retain(|_, expires_at| *expires_at > now);
        before - live.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, OffsetDateTime>> {
        self.live.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, OffsetDateTime>> {
        self.live.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn spawn_pruner(registry: Arc<RevocationRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = registry.prune_expired(OffsetDateTime::now_utc());
            if removed > 0 {
                debug!(removed, live = registry.len(), "pruned expired tokens");
            }
        }
    })
}
