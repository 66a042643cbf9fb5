// ABOUTME: Domain models for the reservation engine
// ABOUTME: Re-exports catalog, pricing and booking types under one path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

/// Courts, coaches and equipment
pub mod catalog;
/// Pricing rules and price breakdowns
pub mod pricing;
/// Bookings and booking requests
pub mod booking;

pub use booking::{Booking, BookingStatus, CreateBookingRequest, PriceQuoteRequest};
pub use catalog::{
    Coach, Court, CourtType, CreateCoachRequest, CreateCourtRequest, CreateEquipmentRequest,
    Equipment, EquipmentType,
};
pub use pricing::{
    CourtTypeCondition, CreatePricingRuleRequest, DayOfWeekCondition, HolidayCondition,
    PriceBreakdown, PricingRule, RuleCondition, RuleKind, TimeRangeCondition,
};
