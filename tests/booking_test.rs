// ABOUTME: Integration tests for the booking transactor and the booking lifecycle
// ABOUTME: Covers validation gates, conflicts, concurrent commits, stock limits and cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use chrono::Duration;
use common::{
    at, booking_request, create_coach, create_court, create_equipment, create_test_resources,
    monday, test_now,
};
use courtbook_server::errors::ErrorCode;
use courtbook_server::models::{BookingStatus, CourtType};
use futures_util::future::join_all;
use uuid::Uuid;

#[tokio::test]
async fn test_commit_stores_a_confirmed_booking() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;

    let mut request = booking_request(court.id, at(monday(), 10), "u1");
    request.date = Some(monday());
    request.user_name = "  Ana  ".to_owned();
    let booking = resources.bookings.create_booking(request).await?;

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.user_name, "Ana");
    assert_eq!(booking.created_at, test_now());
    assert!(booking.cancelled_at.is_none());

    let stored = resources.bookings.get_booking(booking.id).await?;
    assert_eq!(stored, booking);
    Ok(())
}

#[tokio::test]
async fn test_validation_gates() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let start = at(monday(), 10);

    let mut cases = Vec::new();

    let mut no_name = booking_request(court.id, start, "u1");
    no_name.user_name = " ".to_owned();
    cases.push((no_name, ErrorCode::InvalidInput));

    let mut bad_email = booking_request(court.id, start, "u1");
    bad_email.user_email = "not-an-email".to_owned();
    cases.push((bad_email, ErrorCode::InvalidInput));

    let mut two_hours = booking_request(court.id, start, "u1");
    two_hours.end_time = start + Duration::hours(2);
    cases.push((two_hours, ErrorCode::InvalidInput));

    let misaligned = booking_request(court.id, start + Duration::minutes(30), "u1");
    cases.push((misaligned, ErrorCode::InvalidInput));

    let after_close = booking_request(court.id, at(monday(), 22), "u1");
    cases.push((after_close, ErrorCode::InvalidInput));

    let mut wrong_date = booking_request(court.id, start, "u1");
    wrong_date.date = monday().succ_opt();
    cases.push((wrong_date, ErrorCode::InvalidInput));

    let in_the_past = booking_request(court.id, at(test_now().date_naive(), 7), "u1");
    cases.push((in_the_past, ErrorCode::InvalidDate));

    let unknown_court = booking_request(Uuid::new_v4(), start, "u1");
    cases.push((unknown_court, ErrorCode::ResourceNotFound));

    for (request, expected) in cases {
        let err = resources
            .bookings
            .create_booking(request)
            .await
            .unwrap_err();
        assert_eq!(err.code, expected, "{}", err.message);
    }

    assert!(resources.bookings.list_user_bookings("u1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_taken_slot_is_a_conflict() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let start = at(monday(), 10);

    resources
        .bookings
        .create_booking(booking_request(court.id, start, "u1"))
        .await?;
    let err = resources
        .bookings
        .create_booking(booking_request(court.id, start, "u2"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::SlotConflict);
    assert!(resources.bookings.list_user_bookings("u2").await?.is_empty());
    let slots = resources
        .availability
        .available_slots(court.id, monday())
        .await?;
    assert!(!slots.contains(&start));
    Ok(())
}

#[tokio::test]
async fn test_coach_cannot_be_double_booked() -> Result<()> {
    let resources = create_test_resources().await?;
    let court_a = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let court_b = create_court(&resources, "Court B", CourtType::Outdoor, "15").await?;
    let coach = create_coach(&resources, "Maya", "30").await?;
    let start = at(monday(), 10);

    let mut first = booking_request(court_a.id, start, "u1");
    first.coach_id = Some(coach.id);
    resources.bookings.create_booking(first).await?;

    let mut second = booking_request(court_b.id, start, "u2");
    second.coach_id = Some(coach.id);
    let err = resources
        .bookings
        .create_booking(second)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CoachConflict);

    let mut next_hour = booking_request(court_b.id, start + Duration::hours(1), "u2");
    next_hour.coach_id = Some(coach.id);
    resources.bookings.create_booking(next_hour).await?;
    Ok(())
}

#[tokio::test]
async fn test_inactive_references_are_not_found() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let coach = create_coach(&resources, "Maya", "30").await?;
    let racket = create_equipment(&resources, "Racket", 4, "5").await?;
    resources.catalog.deactivate_coach(coach.id).await?;
    resources.catalog.deactivate_equipment(racket.id).await?;

    let mut with_coach = booking_request(court.id, at(monday(), 10), "u1");
    with_coach.coach_id = Some(coach.id);
    let err = resources
        .bookings
        .create_booking(with_coach)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let mut with_racket = booking_request(court.id, at(monday(), 11), "u1");
    with_racket.equipment_ids = vec![racket.id];
    let err = resources
        .bookings
        .create_booking(with_racket)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_bookings_for_one_slot_commit_exactly_once() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let start = at(monday(), 18);

    let attempts = (0..8).map(|n| {
        let resources = resources.clone();
        let request = booking_request(court.id, start, &format!("u{n}"));
        tokio::spawn(async move { resources.bookings.create_booking(request).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(result.code, ErrorCode::SlotConflict);
    }
    Ok(())
}

#[tokio::test]
async fn test_concurrent_rentals_never_exceed_stock() -> Result<()> {
    let resources = create_test_resources().await?;
    let racket = create_equipment(&resources, "Racket", 4, "5").await?;
    let start = at(monday(), 9);

    let mut courts = Vec::new();
    for n in 0..5 {
        let name = format!("Court {n}");
        courts.push(create_court(&resources, &name, CourtType::Indoor, "20").await?);
    }

    let attempts = courts.iter().enumerate().map(|(n, court)| {
        let resources = resources.clone();
        let mut request = booking_request(court.id, start, &format!("u{n}"));
        request.equipment_ids = vec![racket.id];
        tokio::spawn(async move { resources.bookings.create_booking(request).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure.code, ErrorCode::EquipmentExhausted);

    // A later hour has the full stock again
    let mut later = booking_request(courts[0].id, start + Duration::hours(1), "u9");
    later.equipment_ids = vec![racket.id; 4];
    resources.bookings.create_booking(later).await?;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_bookings_never_double_book_a_coach() -> Result<()> {
    let resources = create_test_resources().await?;
    let coach = create_coach(&resources, "Maya", "30").await?;
    let start = at(monday(), 15);

    let mut courts = Vec::new();
    for n in 0..6 {
        let name = format!("Court {n}");
        courts.push(create_court(&resources, &name, CourtType::Outdoor, "20").await?);
    }

    let attempts = courts.iter().enumerate().map(|(n, court)| {
        let resources = resources.clone();
        let mut request = booking_request(court.id, start, &format!("u{n}"));
        request.coach_id = Some(coach.id);
        tokio::spawn(async move { resources.bookings.create_booking(request).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(result.code, ErrorCode::CoachConflict);
    }

    // The losing courts are still free without the coach
    let free = courts
        .iter()
        .find(|court| {
            results
                .iter()
                .filter_map(|r| r.as_ref().ok())
                .all(|booking| booking.court_id != court.id)
        })
        .unwrap();
    resources
        .bookings
        .create_booking(booking_request(free.id, start, "u9"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_cancel_releases_resources_and_is_idempotent() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;
    let racket = create_equipment(&resources, "Racket", 1, "5").await?;
    let start = at(monday(), 12);

    let mut request = booking_request(court.id, start, "u1");
    request.equipment_ids = vec![racket.id];
    let booking = resources.bookings.create_booking(request.clone()).await?;

    let cancelled = resources.bookings.cancel_booking(booking.id).await?;
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancelled_at, Some(test_now()));

    let again = resources.bookings.cancel_booking(booking.id).await?;
    assert_eq!(again, cancelled);

    request.user_id = "u2".to_owned();
    let rebooked = resources.bookings.create_booking(request).await?;
    assert_ne!(rebooked.id, booking.id);

    let err = resources
        .bookings
        .cancel_booking(Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_user_bookings_are_listed_latest_first() -> Result<()> {
    let resources = create_test_resources().await?;
    let court = create_court(&resources, "Court A", CourtType::Indoor, "20").await?;

    for hour in [9, 15, 12] {
        resources
            .bookings
            .create_booking(booking_request(court.id, at(monday(), hour), "u1"))
            .await?;
    }
    resources
        .bookings
        .create_booking(booking_request(court.id, at(monday(), 20), "u2"))
        .await?;

    let mine = resources.bookings.list_user_bookings("u1").await?;
    let starts: Vec<_> = mine.iter().map(|b| b.start_time).collect();
    assert_eq!(
        starts,
        vec![at(monday(), 15), at(monday(), 12), at(monday(), 9)]
    );

    let err = resources
        .bookings
        .list_user_bookings("  ")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    Ok(())
}
