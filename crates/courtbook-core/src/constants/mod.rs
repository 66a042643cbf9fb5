// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Default operating hours, cache TTLs, booking retry bounds, and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single flat list.

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
}

/// Network defaults
pub mod network {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
    /// Default bind host
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Default per-request timeout in seconds
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Maximum accepted request body size in bytes
    pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
}

/// Service names for structured logging
pub mod service_names {
    /// Main server service name
    pub const COURTBOOK_SERVER: &str = "courtbook-server";
}

/// Scheduling defaults
pub mod scheduling {
    /// First bookable hour of the day (local operating time)
    pub const DEFAULT_OPEN_HOUR: u32 = 6;
    /// Closing hour; the last slot starts one hour before
    pub const DEFAULT_CLOSE_HOUR: u32 = 22;
    /// Length of a bookable slot in minutes
    pub const SLOT_MINUTES: i64 = 60;
}

/// Catalog cache defaults
pub mod cache {
    /// Default TTL for cached catalog records
    pub const DEFAULT_CATALOG_TTL_SECS: u64 = 30;
    /// Default maximum number of cached catalog entries
    pub const DEFAULT_CATALOG_MAX_ENTRIES: usize = 1_000;
    /// Default interval of the background expiry sweep
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
}

/// Booking commit-path defaults
pub mod booking {
    /// How long a commit waits for one resource lock
    pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;
    /// Maximum commit attempts before surfacing a conflict
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Base delay between attempts (doubled each retry, plus jitter)
    pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 25;
}

/// Money handling
pub mod money {
    /// Decimal places of the currency minor unit
    pub const MINOR_UNIT_SCALE: u32 = 2;
    /// Largest price, rate or surcharge (in major units) the admin API accepts
    pub const MAX_AMOUNT: u32 = 1_000_000;
    /// Largest multiplier a single pricing rule may carry
    pub const MAX_MULTIPLIER: u32 = 100;
}

/// Database defaults
pub mod database {
    /// Default database URL
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/courtbook.db";
    /// Default maximum pooled connections for file-backed databases
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
}
