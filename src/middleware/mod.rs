// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Provides request ID generation, span creation and per-request logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

/// Cross-origin configuration
pub mod cors;
/// Request correlation and logging
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{log_requests, trace_layer, MakeRequestUuid, RequestSpan, REQUEST_ID_HEADER};
