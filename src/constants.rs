// ABOUTME: Re-export of application constants from courtbook-core
// ABOUTME: Domain-grouped defaults for networking, scheduling, caching and booking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

pub use courtbook_core::constants::*;
