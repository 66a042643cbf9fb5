// ABOUTME: Configuration management module
// ABOUTME: Environment-only configuration split into typed sub-configs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

/// Database connection settings
pub mod database;
/// Top-level server configuration loaded from the environment
pub mod environment;
/// Operating hours, timezone offset and holiday calendar
pub mod scheduling;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use environment::{BookingConfig, Environment, HttpConfig, ServerConfig};
pub use scheduling::SchedulingConfig;
