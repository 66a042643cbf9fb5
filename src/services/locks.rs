// ABOUTME: Per-resource async locks serializing booking commits that touch the same resource
// ABOUTME: Keys are acquired in canonical order with a timeout so waits never deadlock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// A lockable resource; the derived ordering is the acquisition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKey {
    /// A court
    Court(Uuid),
    /// A coach
    Coach(Uuid),
    /// An equipment item (all its units)
    Equipment(Uuid),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Court(id) => write!(f, "court:{id}"),
            Self::Coach(id) => write!(f, "coach:{id}"),
            Self::Equipment(id) => write!(f, "equipment:{id}"),
        }
    }
}

/// Guards held for the duration of one commit attempt; released on drop
#[must_use]
pub struct LockSet {
    guards: Vec<OwnedMutexGuard<()>>,
}

impl LockSet {
    /// Number of distinct resources held
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Whether nothing is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

/// Registry of one mutex per resource ever locked
#[derive(Default)]
pub struct ResourceLocks {
    locks: DashMap<ResourceKey, Arc<Mutex<()>>>,
}

impl ResourceLocks {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every key (deduplicated, in `ResourceKey` order).
    ///
    /// # Errors
    ///
    /// Returns the key whose lock could not be taken within `timeout`; any
    /// guards already taken are released before returning.
    pub async fn acquire(
        &self,
        keys: impl IntoIterator<Item = ResourceKey>,
        timeout: Duration,
    ) -> Result<LockSet, ResourceKey> {
        let ordered: BTreeSet<ResourceKey> = keys.into_iter().collect();
        let mut guards = Vec::with_capacity(ordered.len());

        for key in ordered {
            // Clone the Arc out so no DashMap shard lock is held across the await
            let mutex = self.locks.entry(key).or_default().value().clone();
            match tokio::time::timeout(timeout, mutex.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => return Err(key),
            }
        }

        Ok(LockSet { guards })
    }
}
