// ABOUTME: Integration tests for price previews over the live catalog and rule set
// ABOUTME: Covers the weekend scenario, rule ordering, multipliers, add-ons and frozen receipts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use common::{
    at, booking_request, create_coach, create_court, create_equipment, create_rule,
    create_test_resources, create_weekend_rule, dec, monday, saturday,
};
use courtbook_server::errors::ErrorCode;
use courtbook_server::models::{
    CourtType, CourtTypeCondition, DayOfWeekCondition, PriceQuoteRequest, RuleCondition,
    TimeRangeCondition,
};
use uuid::Uuid;

fn quote(court_id: Uuid, start: DateTime<Utc>) -> PriceQuoteRequest {
    PriceQuoteRequest {
        court_id,
        start_time: start,
        end_time: start + Duration::hours(1),
        equipment_ids: Vec::new(),
        coach_id: None,
    }
}

fn weekend() -> RuleCondition {
    RuleCondition::DayOfWeek(DayOfWeekCondition {
        weekend: true,
        days: Vec::new(),
    })
}

fn evening_peak() -> RuleCondition {
    RuleCondition::TimeRange(TimeRangeCondition {
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
    })
}

#[tokio::test]
async fn test_saturday_weekend_surcharge_scenario() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    create_weekend_rule(&resources).await?;

    let breakdown = resources
        .pricing
        .preview(&quote(court.id, at(saturday(), 10)))
        .await?;

    assert_eq!(breakdown.base_price, dec("20"));
    assert_eq!(breakdown.weekend_fee, dec("10"));
    assert_eq!(breakdown.total, dec("30"));
    assert_eq!(breakdown.applied_rules, vec!["Weekend".to_owned()]);

    let weekday = resources
        .pricing
        .preview(&quote(court.id, at(monday(), 10)))
        .await?;
    assert_eq!(weekday.total, dec("20"));
    assert!(weekday.applied_rules.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rules_apply_in_priority_order_with_multipliers() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    create_weekend_rule(&resources).await?;
    create_rule(&resources, "Evening peak", evening_peak(), "5", "1.5", 10).await?;
    create_rule(
        &resources,
        "Indoor premium",
        RuleCondition::CourtType(CourtTypeCondition {
            court_type: CourtType::Outdoor,
        }),
        "3",
        "1",
        20,
    )
    .await?;

    let breakdown = resources
        .pricing
        .preview(&quote(court.id, at(saturday(), 19)))
        .await?;

    // Outdoor-only rule does not match an indoor court
    assert_eq!(
        breakdown.applied_rules,
        vec!["Evening peak".to_owned(), "Weekend".to_owned()]
    );
    assert_eq!(breakdown.peak_hour_fee, dec("5"));
    assert_eq!(breakdown.weekend_fee, dec("10"));
    assert_eq!(breakdown.court_type_premium, dec("0"));
    assert_eq!(breakdown.subtotal, dec("35"));
    assert_eq!(breakdown.multiplier, dec("1.5"));
    assert_eq!(breakdown.total, dec("52.50"));

    // 21:00 is outside the half-open peak window
    let late = resources
        .pricing
        .preview(&quote(court.id, at(saturday(), 21)))
        .await?;
    assert_eq!(late.applied_rules, vec!["Weekend".to_owned()]);
    assert_eq!(late.total, dec("30"));
    Ok(())
}

#[tokio::test]
async fn test_preview_is_deterministic() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    create_weekend_rule(&resources).await?;
    create_rule(&resources, "Evening peak", evening_peak(), "5", "1.1", 1).await?;

    let request = quote(court.id, at(saturday(), 18));
    let first = resources.pricing.preview(&request).await?;
    let second = resources.pricing.preview(&request).await?;
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_inactive_rules_are_ignored() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let rule = create_weekend_rule(&resources).await?;

    let toggled = resources.catalog.toggle_rule(rule.id).await?;
    assert!(!toggled.is_active);

    let breakdown = resources
        .pricing
        .preview(&quote(court.id, at(saturday(), 10)))
        .await?;
    assert_eq!(breakdown.total, dec("20"));
    assert!(breakdown.applied_rules.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_equipment_and_coach_fees() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let racket = create_equipment(&resources, "Racket", 4, "5").await?;
    let coach = create_coach(&resources, "Maya", "30").await?;

    let mut request = quote(court.id, at(monday(), 10));
    request.equipment_ids = vec![racket.id, racket.id];
    request.coach_id = Some(coach.id);

    let breakdown = resources.pricing.preview(&request).await?;
    assert_eq!(breakdown.equipment_fee, dec("10"));
    assert_eq!(breakdown.coach_fee, dec("30"));
    assert_eq!(breakdown.total, dec("60"));
    Ok(())
}

#[tokio::test]
async fn test_preview_reports_unavailable_add_ons() -> Result<()> {
    let resources = create_test_resources().await?;
    let court_a = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let court_b = create_court(&resources, "Court B", CourtType::Indoor, "20").await?;
    let racket = create_equipment(&resources, "Racket", 1, "5").await?;
    let coach = create_coach(&resources, "Maya", "30").await?;

    let mut over_stock = quote(court_a.id, at(monday(), 10));
    over_stock.equipment_ids = vec![racket.id, racket.id];
    let err = resources.pricing.preview(&over_stock).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::EquipmentUnavailable);

    let mut coached = booking_request(court_a.id, at(monday(), 10), "u1");
    coached.coach_id = Some(coach.id);
    resources.bookings.create_booking(coached).await?;

    let mut busy_coach = quote(court_b.id, at(monday(), 10));
    busy_coach.coach_id = Some(coach.id);
    let err = resources.pricing.preview(&busy_coach).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CoachUnavailable);

    let mut unknown_item = quote(court_b.id, at(monday(), 10));
    unknown_item.equipment_ids = vec![Uuid::new_v4()];
    let err = resources.pricing.preview(&unknown_item).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_reversed_window_is_invalid() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;

    let mut request = quote(court.id, at(monday(), 10));
    request.end_time = request.start_time;
    let err = resources.pricing.preview(&request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    Ok(())
}

#[tokio::test]
async fn test_committed_breakdown_survives_rule_changes() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let rule = create_weekend_rule(&resources).await?;

    let start = at(saturday(), 10);
    let preview = resources.pricing.preview(&quote(court.id, start)).await?;
    let booking = resources
        .bookings
        .create_booking(booking_request(court.id, start, "u1"))
        .await?;
    assert_eq!(booking.price_breakdown, preview);

    resources.catalog.delete_rule(rule.id).await?;

    let stored = resources.bookings.get_booking(booking.id).await?;
    assert_eq!(stored.price_breakdown.total, dec("30"));
    assert_eq!(stored.price_breakdown.applied_rules, vec!["Weekend".to_owned()]);

    let repriced = resources
        .pricing
        .preview(&quote(court.id, at(saturday(), 11)))
        .await?;
    assert_eq!(repriced.total, dec("20"));
    Ok(())
}

#[tokio::test]
async fn test_admin_rejects_out_of_range_amounts() -> Result<()> {
    let resources = create_test_resources().await?;

    let err = create_rule(&resources, "Huge", weekend(), "0", "1000000000000000", 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("multiplier"));

    let err = create_court(&resources, "Gold", CourtType::Indoor, "1000000.01")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("basePrice"));

    let err = create_coach(&resources, "Pricey", "99999999999").await.unwrap_err();
    assert!(err.to_string().contains("hourlyRate"));
    Ok(())
}

#[tokio::test]
async fn test_compounding_multipliers_fail_cleanly() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    for priority in 0..16 {
        create_rule(&resources, &format!("x100-{priority}"), weekend(), "0", "100", priority)
            .await?;
    }

    let start = at(saturday(), 10);
    let err = resources
        .pricing
        .preview(&quote(court.id, start))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = resources
        .bookings
        .create_booking(booking_request(court.id, start, "u1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(resources.bookings.list_user_bookings("u1").await?.is_empty());

    let weekday = resources
        .pricing
        .preview(&quote(court.id, at(monday(), 10)))
        .await?;
    assert_eq!(weekday.total, dec("20"));
    Ok(())
}
