// ABOUTME: Re-export of domain models from courtbook-core
// ABOUTME: Catalog records, pricing rules, bookings and price breakdowns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

pub use courtbook_core::models::*;
