// ABOUTME: Deterministic price computation by folding ordered pricing rules
// ABOUTME: Rules apply by priority desc then id asc; surcharges add, multipliers compound
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! # Pricing fold
//!
//! ```text
//! subtotal = base + equipment + coach + sum(matched surcharges)
//! total    = round_half_up(subtotal * product(matched multipliers), 2)
//! ```
//!
//! Every component of the breakdown is rounded to the currency minor unit
//! before it is summed, so a receipt always adds up to its `total`.

use super::availability::TimeWindow;
use crate::config::SchedulingConfig;
use crate::constants::money::MINOR_UNIT_SCALE;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Coach, Court, CourtType, Equipment, PriceBreakdown, PricingRule, RuleCondition, RuleKind,
};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Reverse;

/// Everything the fold reads; nothing else influences the result
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    /// Court being priced
    pub court: &'a Court,
    /// Booking window
    pub window: TimeWindow,
    /// Rented units, one entry per unit
    pub equipment: &'a [Equipment],
    /// Optional coach
    pub coach: Option<&'a Coach>,
    /// Rule snapshot (inactive rules are skipped)
    pub rules: &'a [PricingRule],
    /// Operating offset and holiday calendar
    pub scheduling: &'a SchedulingConfig,
}

/// Local facts a rule predicate is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Booking start clock time at the operating offset
    pub local_time: NaiveTime,
    /// Booking start weekday at the operating offset
    pub weekday: Weekday,
    /// Booking start calendar date at the operating offset
    pub local_date: NaiveDate,
    /// Type of the booked court
    pub court_type: CourtType,
    /// Operating calendar
    pub scheduling: &'a SchedulingConfig,
}

impl<'a> RuleContext<'a> {
    /// Derive the context for a booking window on a court
    #[must_use]
    pub fn new(
        court_type: CourtType,
        window: TimeWindow,
        scheduling: &'a SchedulingConfig,
    ) -> Self {
        let local = window.start.with_timezone(&scheduling.utc_offset);
        Self {
            local_time: local.time(),
            weekday: local.weekday(),
            local_date: local.date_naive(),
            court_type,
            scheduling,
        }
    }
}

/// Round half-up (away from zero) to the currency minor unit
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Active rules in application order: priority descending, then id ascending
#[must_use]
pub fn order_rules(rules: &[PricingRule]) -> Vec<&PricingRule> {
    let mut active: Vec<&PricingRule> = rules.iter().filter(|rule| rule.is_active).collect();
    active.sort_by_key(|rule| (Reverse(rule.priority), rule.id));
    active
}

/// Evaluate a rule predicate
#[must_use]
pub fn rule_matches(condition: &RuleCondition, ctx: &RuleContext<'_>) -> bool {
    match condition {
        RuleCondition::TimeRange(range) => {
            let t = ctx.local_time;
            if range.start_time <= range.end_time {
                range.start_time <= t && t < range.end_time
            } else {
                // Wraps past midnight, e.g. 22:00-02:00
                t >= range.start_time || t < range.end_time
            }
        }
        RuleCondition::DayOfWeek(days) => {
            let is_weekend = matches!(ctx.weekday, Weekday::Sat | Weekday::Sun);
            (days.weekend && is_weekend) || days.days.contains(&ctx.weekday)
        }
        RuleCondition::CourtType(court) => court.court_type == ctx.court_type,
        RuleCondition::Holiday(holiday) => {
            holiday.dates.contains(&ctx.local_date) || ctx.scheduling.is_holiday(ctx.local_date)
        }
    }
}

/// Compute the itemized breakdown for a prospective booking
///
/// # Errors
///
/// Returns `INVALID_INPUT` when an intermediate amount leaves the range a
/// [`Decimal`] can represent, e.g. several large multipliers compounding
pub fn compute_breakdown(input: &PricingInput<'_>) -> AppResult<PriceBreakdown> {
    let minutes = (input.window.end - input.window.start).num_minutes();
    let hours = Decimal::from(minutes) / Decimal::from(60);

    let equipment_fee = input
        .equipment
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.rental_price));
    let coach_fee = match input.coach {
        Some(coach) => coach.hourly_rate.checked_mul(hours),
        None => Some(Decimal::ZERO),
    };

    let mut breakdown = PriceBreakdown {
        base_price: round_money(in_range(input.court.base_price.checked_mul(hours))?),
        equipment_fee: round_money(in_range(equipment_fee)?),
        coach_fee: round_money(in_range(coach_fee)?),
        multiplier: Decimal::ONE,
        ..PriceBreakdown::default()
    };

    let ctx = RuleContext::new(input.court.court_type, input.window, input.scheduling);
    for rule in order_rules(input.rules) {
        if !rule_matches(&rule.condition, &ctx) {
            continue;
        }
        let surcharge = round_money(rule.surcharge);
        let category_fee = match rule.condition.kind() {
            RuleKind::CourtType => &mut breakdown.court_type_premium,
            RuleKind::TimeRange => &mut breakdown.peak_hour_fee,
            RuleKind::DayOfWeek => &mut breakdown.weekend_fee,
            RuleKind::Holiday => &mut breakdown.holiday_fee,
        };
        *category_fee = in_range(category_fee.checked_add(surcharge))?;
        breakdown.rule_surcharges = in_range(breakdown.rule_surcharges.checked_add(surcharge))?;
        breakdown.multiplier = in_range(breakdown.multiplier.checked_mul(rule.multiplier))?;
        breakdown.applied_rules.push(rule.name.clone());
    }

    breakdown.subtotal = in_range(
        breakdown
            .base_price
            .checked_add(breakdown.equipment_fee)
            .and_then(|sum| sum.checked_add(breakdown.coach_fee))
            .and_then(|sum| sum.checked_add(breakdown.rule_surcharges)),
    )?;
    let total = breakdown.subtotal.checked_mul(breakdown.multiplier);
    breakdown.total = round_money(in_range(total)?);
    Ok(breakdown)
}

fn in_range(amount: Option<Decimal>) -> AppResult<Decimal> {
    amount.ok_or_else(|| AppError::invalid_input("Price for this booking is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CourtTypeCondition, DayOfWeekCondition, EquipmentType, HolidayCondition,
        TimeRangeCondition,
    };
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn court(base: Decimal, court_type: CourtType) -> Court {
        Court {
            id: Uuid::new_v4(),
            name: "Court A".into(),
            court_type,
            base_price: base,
            is_active: true,
            created_at: at("2025-01-01T00:00:00Z"),
        }
    }

    fn rule(
        name: &str,
        priority: i64,
        condition: RuleCondition,
        surcharge: Decimal,
    ) -> PricingRule {
        PricingRule {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            condition,
            surcharge,
            multiplier: Decimal::ONE,
            priority,
            is_active: true,
            created_at: at("2025-01-01T00:00:00Z"),
        }
    }

    fn weekend() -> RuleCondition {
        RuleCondition::DayOfWeek(DayOfWeekCondition {
            weekend: true,
            days: vec![],
        })
    }

    fn peak(start: &str, end: &str) -> RuleCondition {
        RuleCondition::TimeRange(TimeRangeCondition {
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
        })
    }

    #[test]
    fn test_weekend_surcharge_scenario() {
        let scheduling = SchedulingConfig::default();
        let court = court(dec("20"), CourtType::Indoor);
        let rules = vec![rule("Weekend", 5, weekend(), dec("10"))];
        // 2025-06-07 is a Saturday
        let breakdown = compute_breakdown(&PricingInput {
            court: &court,
            window: TimeWindow::slot(at("2025-06-07T10:00:00Z")),
            equipment: &[],
            coach: None,
            rules: &rules,
            scheduling: &scheduling,
        })
        .unwrap();

        assert_eq!(breakdown.base_price, dec("20"));
        assert_eq!(breakdown.weekend_fee, dec("10"));
        assert_eq!(breakdown.total, dec("30"));
        assert_eq!(breakdown.applied_rules, vec!["Weekend".to_owned()]);
    }

    #[test]
    fn test_order_is_priority_desc_then_id() {
        let mut low = rule("low", 1, weekend(), dec("1"));
        let mut high = rule("high", 9, weekend(), dec("1"));
        let mut tie_a = rule("tie-a", 5, weekend(), dec("1"));
        let mut tie_b = rule("tie-b", 5, weekend(), dec("1"));
        low.id = Uuid::from_u128(4);
        high.id = Uuid::from_u128(3);
        tie_a.id = Uuid::from_u128(1);
        tie_b.id = Uuid::from_u128(2);
        let rules = vec![low, tie_b, high, tie_a];

        let names: Vec<&str> = order_rules(&rules)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let mut inactive = rule("off", 1, weekend(), dec("1"));
        inactive.is_active = false;
        assert!(order_rules(&[inactive]).is_empty());
    }

    #[test]
    fn test_multipliers_compound_after_surcharges() {
        let scheduling = SchedulingConfig::default();
        let court = court(dec("40"), CourtType::Indoor);
        let mut premium = rule(
            "Indoor",
            1,
            RuleCondition::CourtType(CourtTypeCondition {
                court_type: CourtType::Indoor,
            }),
            dec("5"),
        );
        premium.multiplier = dec("1.5");
        let mut evening = rule("Evening", 2, peak("18:00", "21:00"), dec("0"));
        evening.multiplier = dec("1.1");

        let rules = vec![premium, evening];
        let breakdown = compute_breakdown(&PricingInput {
            court: &court,
            window: TimeWindow::slot(at("2025-06-04T19:00:00Z")),
            equipment: &[],
            coach: None,
            rules: &rules,
            scheduling: &scheduling,
        })
        .unwrap();

        assert_eq!(breakdown.court_type_premium, dec("5"));
        assert_eq!(breakdown.subtotal, dec("45"));
        assert_eq!(breakdown.multiplier, dec("1.65"));
        // 45 * 1.65 = 74.25
        assert_eq!(breakdown.total, dec("74.25"));
        assert_eq!(breakdown.applied_rules, vec!["Evening", "Indoor"]);
    }

    #[test]
    fn test_equipment_and_coach_fees() {
        let scheduling = SchedulingConfig::default();
        let court = court(dec("20"), CourtType::Outdoor);
        let racket = Equipment {
            id: Uuid::new_v4(),
            name: "Racket".into(),
            equipment_type: EquipmentType::Racket,
            total_stock: 4,
            rental_price: dec("2.5"),
            is_active: true,
            created_at: at("2025-01-01T00:00:00Z"),
        };
        let coach = Coach {
            id: Uuid::new_v4(),
            name: "Sam".into(),
            specialization: "badminton".into(),
            hourly_rate: dec("30"),
            is_active: true,
            created_at: at("2025-01-01T00:00:00Z"),
        };
        let equipment = vec![racket.clone(), racket];

        let breakdown = compute_breakdown(&PricingInput {
            court: &court,
            window: TimeWindow::slot(at("2025-06-04T09:00:00Z")),
            equipment: &equipment,
            coach: Some(&coach),
            rules: &[],
            scheduling: &scheduling,
        })
        .unwrap();
        assert_eq!(breakdown.equipment_fee, dec("5"));
        assert_eq!(breakdown.coach_fee, dec("30"));
        assert_eq!(breakdown.total, dec("55"));
        assert!(breakdown.applied_rules.is_empty());
    }

    #[test]
    fn test_half_up_rounding() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
    }

    #[test]
    fn test_time_range_wraps_midnight() {
        let scheduling = SchedulingConfig::default();
        let late = peak("22:00", "02:00");
        let ctx = |s: &str| {
            RuleContext::new(CourtType::Indoor, TimeWindow::slot(at(s)), &scheduling)
        };
        assert!(rule_matches(&late, &ctx("2025-06-04T23:00:00Z")));
        assert!(rule_matches(&late, &ctx("2025-06-05T01:00:00Z")));
        assert!(!rule_matches(&late, &ctx("2025-06-05T02:00:00Z")));
        assert!(!rule_matches(&late, &ctx("2025-06-04T21:00:00Z")));
    }

    #[test]
    fn test_time_range_end_is_exclusive() {
        let scheduling = SchedulingConfig::default();
        let evening = peak("18:00", "21:00");
        let ctx = |s: &str| {
            RuleContext::new(CourtType::Indoor, TimeWindow::slot(at(s)), &scheduling)
        };
        assert!(rule_matches(&evening, &ctx("2025-06-04T18:00:00Z")));
        assert!(!rule_matches(&evening, &ctx("2025-06-04T21:00:00Z")));
    }

    #[test]
    fn test_holiday_matches_calendar_and_inline_dates() {
        let christmas = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let boxing_day = NaiveDate::from_ymd_opt(2025, 12, 26).unwrap();
        let scheduling = SchedulingConfig::default().with_holidays([christmas]);
        let condition = RuleCondition::Holiday(HolidayCondition {
            dates: vec![boxing_day],
        });
        let ctx = |s: &str| {
            RuleContext::new(CourtType::Outdoor, TimeWindow::slot(at(s)), &scheduling)
        };
        assert!(rule_matches(&condition, &ctx("2025-12-25T10:00:00Z")));
        assert!(rule_matches(&condition, &ctx("2025-12-26T10:00:00Z")));
        assert!(!rule_matches(&condition, &ctx("2025-12-27T10:00:00Z")));
    }

    #[test]
    fn test_weekday_uses_operating_offset() {
        // Friday 23:30 UTC is already Saturday at UTC+2
        let scheduling = SchedulingConfig::new(0, 24, 120).unwrap();
        let ctx = RuleContext::new(
            CourtType::Indoor,
            TimeWindow::slot(at("2025-06-06T23:00:00Z")),
            &scheduling,
        );
        assert!(rule_matches(&weekend(), &ctx));
    }
    #[test]
    fn test_compounding_multipliers_out_of_range_is_an_error() {
        let scheduling = SchedulingConfig::default();
        let court = court(dec("20"), CourtType::Indoor);
        let rules: Vec<PricingRule> = (0..2)
            .map(|i| {
                let mut huge = rule(&format!("huge-{i}"), i, weekend(), dec("0"));
                huge.multiplier = dec("1000000000000000");
                huge
            })
            .collect();

        let err = compute_breakdown(&PricingInput {
            court: &court,
            window: TimeWindow::slot(at("2025-06-07T10:00:00Z")),
            equipment: &[],
            coach: None,
            rules: &rules,
            scheduling: &scheduling,
        })
        .unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::InvalidInput);
    }

    #[test]
    fn test_swapping_priorities_reorders_without_changing_matches() {
        let scheduling = SchedulingConfig::default();
        let court = court(dec("20"), CourtType::Indoor);
        let evening = rule("Evening", 10, peak("18:00", "21:00"), dec("5"));
        let weekend_rule = rule("Weekend", 5, weekend(), dec("10"));
        let offpeak = rule("Morning", 50, peak("06:00", "09:00"), dec("1"));
        let price = |rules: &[PricingRule]| {
            compute_breakdown(&PricingInput {
                court: &court,
                window: TimeWindow::slot(at("2025-06-07T19:00:00Z")),
                equipment: &[],
                coach: None,
                rules,
                scheduling: &scheduling,
            })
            .unwrap()
        };

        let before = price(&[evening.clone(), weekend_rule.clone(), offpeak.clone()]);
        assert_eq!(before.applied_rules, vec!["Evening", "Weekend"]);

        let mut evening_low = evening;
        let mut weekend_high = weekend_rule;
        evening_low.priority = 5;
        weekend_high.priority = 10;
        let after = price(&[evening_low, weekend_high, offpeak]);
        assert_eq!(after.applied_rules, vec!["Weekend", "Evening"]);
        assert_eq!(after.total, before.total);
    }
}
