// ABOUTME: Pricing rule records and the itemized price breakdown snapshot
// ABOUTME: Rule conditions are a closed tagged variant keyed by the rule `type`
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::catalog::CourtType;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminant of a pricing rule, stored in the `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Clock-time window (peak hours)
    TimeRange,
    /// Weekday / weekend
    DayOfWeek,
    /// Indoor / outdoor premium
    CourtType,
    /// Holiday calendar
    Holiday,
}

impl RuleKind {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TimeRange => "timeRange",
            Self::DayOfWeek => "dayOfWeek",
            Self::CourtType => "courtType",
            Self::Holiday => "holiday",
        }
    }
}

/// `timeRange` predicate parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeCondition {
    /// Inclusive window start (local clock time)
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    /// Exclusive window end; earlier than `start_time` means the window wraps midnight
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
}

/// `dayOfWeek` predicate parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayOfWeekCondition {
    /// Match Saturday and Sunday
    #[serde(default)]
    pub weekend: bool,
    /// Explicit weekdays to match
    #[serde(default)]
    pub days: Vec<Weekday>,
}

/// `courtType` predicate parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtTypeCondition {
    /// Court type that triggers the rule
    pub court_type: CourtType,
}

/// `holiday` predicate parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HolidayCondition {
    /// Extra holiday dates on top of the configured calendar
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
}

/// Typed rule predicate.
///
/// Serialized adjacently tagged so that the wire form is
/// `{"type": "dayOfWeek", "conditions": {"weekend": true}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "conditions", rename_all = "camelCase")]
pub enum RuleCondition {
    /// Peak-hour style window
    TimeRange(TimeRangeCondition),
    /// Weekday / weekend
    DayOfWeek(DayOfWeekCondition),
    /// Court type premium
    CourtType(CourtTypeCondition),
    /// Holiday calendar
    Holiday(HolidayCondition),
}

impl RuleCondition {
    /// Discriminant of this condition
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::TimeRange(_) => RuleKind::TimeRange,
            Self::DayOfWeek(_) => RuleKind::DayOfWeek,
            Self::CourtType(_) => RuleKind::CourtType,
            Self::Holiday(_) => RuleKind::Holiday,
        }
    }
}

/// An independent pricing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Unique identifier, also the ordering tie-breaker
    pub id: Uuid,
    /// Name reported in `applied_rules`
    pub name: String,
    /// Optional admin note
    pub description: Option<String>,
    /// Typed predicate
    pub condition: RuleCondition,
    /// Flat amount added when the rule matches
    pub surcharge: Decimal,
    /// Factor multiplied into the total when the rule matches
    pub multiplier: Decimal,
    /// Higher priority rules are applied first
    pub priority: i64,
    /// Inactive rules are ignored by the engine
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to create a pricing rule
#[derive(Debug, Clone)]
pub struct CreatePricingRuleRequest {
    /// Rule name
    pub name: String,
    /// Optional admin note
    pub description: Option<String>,
    /// Typed predicate
    pub condition: RuleCondition,
    /// Flat addend
    pub surcharge: Decimal,
    /// Multiplicative factor (defaults to 1)
    pub multiplier: Decimal,
    /// Application priority
    pub priority: i64,
}

/// Itemized, auditable price of a prospective or committed booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PriceBreakdown {
    /// Court base price x duration
    pub base_price: Decimal,
    /// Surcharges of matched `courtType` rules
    pub court_type_premium: Decimal,
    /// Surcharges of matched `timeRange` rules
    pub peak_hour_fee: Decimal,
    /// Surcharges of matched `dayOfWeek` rules
    pub weekend_fee: Decimal,
    /// Surcharges of matched `holiday` rules
    pub holiday_fee: Decimal,
    /// Sum of rental prices
    pub equipment_fee: Decimal,
    /// Coach hourly rate x duration
    pub coach_fee: Decimal,
    /// Sum of all matched rule surcharges
    pub rule_surcharges: Decimal,
    /// Product of all matched rule multipliers
    pub multiplier: Decimal,
    /// Amount before the multiplier is applied
    pub subtotal: Decimal,
    /// Names of matched rules in application order
    pub applied_rules: Vec<String>,
    /// Final amount, rounded half-up to the currency minor unit
    pub total: Decimal,
}

/// Serde adapter for `HH:MM` clock times (also accepts `HH:MM:SS`)
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize as `HH:MM`
    ///
    /// # Errors
    ///
    /// Propagates serializer errors
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    /// Deserialize from `HH:MM` or `HH:MM:SS`
    ///
    /// # Errors
    ///
    /// Returns an error when the string is not a valid clock time
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|e| de::Error::custom(format!("invalid clock time '{raw}': {e}")))
    }
}
