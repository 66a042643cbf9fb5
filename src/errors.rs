// ABOUTME: Re-export of the unified error types from courtbook-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable across the server crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

pub use courtbook_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
