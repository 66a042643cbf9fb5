// ABOUTME: Cache abstraction for catalog reads (courts, coaches, equipment, pricing rules)
// ABOUTME: Pluggable provider trait with an in-memory LRU/TTL implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

/// In-memory cache implementation
pub mod memory;

use crate::constants::cache::{
    DEFAULT_CATALOG_MAX_ENTRIES, DEFAULT_CATALOG_TTL_SECS, DEFAULT_CLEANUP_INTERVAL_SECS,
};
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Cache provider trait for pluggable backend implementations
///
/// # Examples
///
/// ```rust,no_run
/// use courtbook_server::cache::{CacheConfig, CacheKey, CacheProvider};
/// use courtbook_server::cache::memory::InMemoryCache;
/// use std::time::Duration;
/// # async fn example() -> Result<(), courtbook_server::errors::AppError> {
///
/// let config = CacheConfig {
///     enable_background_cleanup: false,
///     ..Default::default()
/// };
/// let cache: InMemoryCache = InMemoryCache::new(config).await?;
///
/// cache.set(&CacheKey::ActiveRules, &vec!["Weekend"], Duration::from_secs(30)).await?;
/// let cached: Option<Vec<String>> = cache.get(&CacheKey::ActiveRules).await?;
/// assert!(cached.is_some());
///
/// cache.invalidate_pattern(CacheKey::RULES_PATTERN).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone {
    /// Create new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store value in cache with TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Retrieve value from cache, `None` when missing or expired
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    async fn get<T: for<'de> Deserialize<'de>>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Remove all cache entries matching a glob pattern (e.g. `catalog:court*`)
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid
    async fn invalidate_pattern(&self, pattern: &str) -> AppResult<u64>;

    /// Clear all cache entries
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// TTL applied to catalog entries
    pub ttl: Duration,
    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
    /// Enable background cleanup task (tests usually disable it)
    pub enable_background_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CATALOG_MAX_ENTRIES,
            ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
        }
    }
}

/// Catalog cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Single court by id (active or not)
    Court(Uuid),
    /// Single coach by id
    Coach(Uuid),
    /// Single equipment item by id
    Equipment(Uuid),
    /// Active courts listing
    ActiveCourts,
    /// Active coaches listing
    ActiveCoaches,
    /// Active equipment listing
    ActiveEquipment,
    /// Active pricing rules snapshot
    ActiveRules,
}

impl CacheKey {
    /// Every court entry, single or listing
    pub const COURTS_PATTERN: &'static str = "catalog:court*";
    /// Every coach entry
    pub const COACHES_PATTERN: &'static str = "catalog:coach*";
    /// Every equipment entry
    pub const EQUIPMENT_PATTERN: &'static str = "catalog:equipment*";
    /// Every pricing rule entry
    pub const RULES_PATTERN: &'static str = "catalog:rules*";
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Court(id) => write!(f, "catalog:court:{id}"),
            Self::Coach(id) => write!(f, "catalog:coach:{id}"),
            Self::Equipment(id) => write!(f, "catalog:equipment:{id}"),
            Self::ActiveCourts => f.write_str("catalog:courts:active"),
            Self::ActiveCoaches => f.write_str("catalog:coaches:active"),
            Self::ActiveEquipment => f.write_str("catalog:equipment:active"),
            Self::ActiveRules => f.write_str("catalog:rules:active"),
        }
    }
}
