// ABOUTME: Main library entry point for the Courtbook reservation and pricing engine
// ABOUTME: Exposes availability, pricing and booking services plus the REST API surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

#![deny(unsafe_code)]

//! # Courtbook Server
//!
//! Backend for a sports-facility booking frontend. It answers three questions
//! truthfully under concurrent load:
//!
//! - which hours of a court are still free on a given date,
//! - what a prospective booking costs once every active pricing rule is applied,
//! - whether a booking can be committed without double-booking a court, a coach
//!   or limited equipment stock.
//!
//! ## Architecture
//!
//! - **engine**: pure slot, pricing and capacity computations (no I/O, no clock)
//! - **services**: catalog, availability, price preview and the booking transactor
//! - **database**: `SQLite` persistence with one manager per table
//! - **routes**: axum handlers mounted under `/api`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use courtbook_server::config::environment::ServerConfig;
//! use courtbook_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Courtbook configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Catalog cache with LRU eviction and TTL expiry
pub mod cache;

/// Injectable wall clock
pub mod clock;

/// Environment-driven configuration
pub mod config;

/// Application constants (re-exported from `courtbook-core`)
pub mod constants;

/// `SQLite` persistence layer
pub mod database;

/// Pure availability, pricing and capacity computations
pub mod engine;

/// Unified error handling (re-exported from `courtbook-core`)
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Domain models (re-exported from `courtbook-core`)
pub mod models;

/// Shared server state
pub mod resources;

/// REST route handlers
pub mod routes;

/// Router assembly and HTTP serving
pub mod server;

/// Business services
pub mod services;
