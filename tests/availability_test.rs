// ABOUTME: Integration tests for free-slot lookup against confirmed bookings and the clock
// ABOUTME: Covers the hourly grid, booked and cancelled slots, past dates and inactive courts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use common::{at, booking_request, create_court, create_test_resources, monday, test_now};
use courtbook_server::errors::ErrorCode;
use courtbook_server::models::CourtType;
use uuid::Uuid;

#[tokio::test]
async fn test_future_day_offers_the_full_grid() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;

    let slots = resources
        .availability
        .available_slots(court.id, monday())
        .await?;

    assert_eq!(slots.len(), 16);
    assert_eq!(slots.first(), Some(&at(monday(), 6)));
    assert_eq!(slots.last(), Some(&at(monday(), 21)));
    assert!(slots.windows(2).all(|pair| pair[0] < pair[1]));
    Ok(())
}

#[tokio::test]
async fn test_booked_slot_is_excluded_until_cancelled() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;

    let booking = resources
        .bookings
        .create_booking(booking_request(court.id, at(monday(), 10), "u1"))
        .await?;

    let slots = resources
        .availability
        .available_slots(court.id, monday())
        .await?;
    assert_eq!(slots.len(), 15);
    assert!(!slots.contains(&at(monday(), 10)));
    assert!(slots.contains(&at(monday(), 9)));
    assert!(slots.contains(&at(monday(), 11)));

    resources.bookings.cancel_booking(booking.id).await?;
    let slots = resources
        .availability
        .available_slots(court.id, monday())
        .await?;
    assert_eq!(slots.len(), 16);
    Ok(())
}

#[tokio::test]
async fn test_bookings_on_other_courts_do_not_hide_slots() -> Result<()> {
    let resources = create_test_resources().await?;
    let court_a = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let court_b = create_court(&resources, "Court B", CourtType::Outdoor, "15").await?;

    resources
        .bookings
        .create_booking(booking_request(court_a.id, at(monday(), 18), "u1"))
        .await?;

    let slots = resources
        .availability
        .available_slots(court_b.id, monday())
        .await?;
    assert!(slots.contains(&at(monday(), 18)));
    Ok(())
}

#[tokio::test]
async fn test_today_hides_slots_that_already_started() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let today = test_now().date_naive();

    let slots = resources
        .availability
        .available_slots(court.id, today)
        .await?;

    // Clock is frozen at 08:00; the 08:00 slot has not started yet
    assert_eq!(slots.first(), Some(&at(today, 8)));
    assert_eq!(slots.len(), 14);
    Ok(())
}

#[tokio::test]
async fn test_past_date_is_rejected() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let yesterday = test_now().date_naive().pred_opt().unwrap();

    let err = resources
        .availability
        .available_slots(court.id, yesterday)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidDate);
    Ok(())
}

#[tokio::test]
async fn test_unknown_and_inactive_courts_are_not_found() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    resources.catalog.deactivate_court(court.id).await?;

    for court_id in [court.id, Uuid::new_v4()] {
        let err = resources
            .availability
            .available_slots(court_id, monday())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }
    Ok(())
}
