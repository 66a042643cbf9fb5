// ABOUTME: Shared server resources handed to every route handler
// ABOUTME: Builds the catalog cache and wires the availability, pricing and booking services once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use crate::cache::memory::InMemoryCache;
use crate::cache::CacheProvider;
use crate::clock::Clock;
use crate::config::ServerConfig;
use crate::database::{BookingsManager, Database};
use crate::errors::AppResult;
use crate::services::{AvailabilityService, BookingService, CatalogService, PricingService};
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Wall clock shared by every service
    pub clock: Arc<dyn Clock>,
    /// Catalog reads and admin writes
    pub catalog: Arc<CatalogService>,
    /// Free slot lookup
    pub availability: AvailabilityService,
    /// Price preview
    pub pricing: PricingService,
    /// Booking commit path
    pub bookings: BookingService,
}

impl ServerResources {
    /// Wire every service over one database, one cache and one clock
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cache cannot be created
    pub async fn new(
        database: Database,
        config: Arc<ServerConfig>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let cache = InMemoryCache::new(config.cache.clone()).await?;
        let catalog = Arc::new(CatalogService::new(&database, cache, config.cache.ttl));
        let scheduling = Arc::new(config.scheduling.clone());
        let pool = database.pool().clone();

        let availability = AvailabilityService::new(
            catalog.clone(),
            BookingsManager::new(pool.clone()),
            scheduling.clone(),
            clock.clone(),
        );
        let pricing = PricingService::new(catalog.clone(), pool.clone(), scheduling.clone());
        let bookings = BookingService::new(
            pool,
            catalog.clone(),
            scheduling,
            config.booking.clone(),
            clock.clone(),
        );

        Ok(Self {
            database: Arc::new(database),
            config,
            clock,
            catalog,
            availability,
            pricing,
            bookings,
        })
    }
}
