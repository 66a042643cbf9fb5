// ABOUTME: Shared test helpers for HTTP-level integration tests
// ABOUTME: Exports the axum oneshot request builder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
