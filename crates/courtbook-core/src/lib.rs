// ABOUTME: Core types and constants for the Courtbook court reservation platform
// ABOUTME: Foundation crate with error handling, catalog and booking models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

#![deny(unsafe_code)]

//! # Courtbook Core
//!
//! Foundation crate providing shared types and constants for the Courtbook
//! reservation engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and stable `ErrorCode` kinds
//! - **models**: Catalog records, pricing rules, bookings and price breakdowns
//! - **constants**: Application-wide defaults organized by domain

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Catalog, pricing-rule and booking models
pub mod models;

/// Application constants organized by domain
pub mod constants;
