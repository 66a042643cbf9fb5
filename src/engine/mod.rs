// ABOUTME: Pure computation core: slot grids, rule-based pricing and stock capacity
// ABOUTME: No I/O and no clock access; callers pass every input explicitly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

/// Hourly slot enumeration and overlap filtering
pub mod availability;
/// Equipment unit counting and capacity checks
pub mod capacity;
/// Ordered pricing-rule fold producing a price breakdown
pub mod pricing;

pub use availability::{
    available_slots, overlaps, slot_grid, validate_slot, SlotViolation, TimeWindow,
};
pub use capacity::{count_units, find_shortfall, Shortfall};
pub use pricing::{
    compute_breakdown, order_rules, round_money, rule_matches, PricingInput, RuleContext,
};
