// ABOUTME: Domain service layer between the HTTP routes and the pure engine
// ABOUTME: Catalog, availability, price preview and the booking transactor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! Domain service layer
//!
//! Services own the I/O around the pure [`crate::engine`] functions: they load
//! catalog records (through the cache), read reservations, consult the clock
//! and hand plain values to the engine. Route handlers only translate wire
//! DTOs to service calls.

/// Free slot lookup per court and date
pub mod availability;

/// Booking commit path with per-resource locking and bounded retry
pub mod booking;

/// Cache-backed catalog reads and admin writes
pub mod catalog;

/// Keyed async locks used by the booking commit path
pub mod locks;

/// Lock-free price preview
pub mod pricing;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use catalog::CatalogService;
pub use locks::{LockSet, ResourceKey, ResourceLocks};
pub use pricing::PricingService;
