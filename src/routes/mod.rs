// ABOUTME: Route module organization for the Courtbook HTTP API
// ABOUTME: Catalog, booking and health routes, each a struct exposing routes(resources)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! Route module for the Courtbook server
//!
//! Handlers are thin: they decode the frontend's JSON, call one service and
//! encode the result. Every business rule lives in `services` and `engine`.

/// Availability, price preview and booking lifecycle routes
pub mod bookings;
/// Courts, coaches, equipment and pricing rule routes
pub mod catalog;
/// Health check routes
pub mod health;
/// Shared JSON conventions
pub mod wire;

/// Booking route handlers
pub use bookings::BookingRoutes;
/// Catalog route handlers
pub use catalog::CatalogRoutes;
/// Health route handlers
pub use health::HealthRoutes;
