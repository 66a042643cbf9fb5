// ABOUTME: Hour-aligned slot grid per operating day and removal of booked windows
// ABOUTME: Intervals are half-open [start, end) and compared as UTC instants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use crate::config::SchedulingConfig;
use crate::constants::scheduling::SLOT_MINUTES;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// Half-open time interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// One slot starting at `start`
    #[must_use]
    pub fn slot(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + Duration::minutes(SLOT_MINUTES),
        }
    }
}

/// `[a_start, a_end)` intersects `[b_start, b_end)`
#[must_use]
pub fn overlaps(a: TimeWindow, b: TimeWindow) -> bool {
    a.start < b.end && b.start < a.end
}

/// Every slot start of `date` inside the operating window, in order
#[must_use]
pub fn slot_grid(date: NaiveDate, scheduling: &SchedulingConfig) -> Vec<DateTime<Utc>> {
    let slot_hours = u32::try_from(SLOT_MINUTES / 60).unwrap_or(1);
    let last_start = scheduling.close_hour.saturating_sub(slot_hours);
    if scheduling.close_hour < scheduling.open_hour + slot_hours {
        return Vec::new();
    }

    (scheduling.open_hour..=last_start)
        .step_by(slot_hours as usize)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .filter_map(|time| {
            scheduling
                .utc_offset
                .from_local_datetime(&date.and_time(time))
                .single()
        })
        .map(|local| local.with_timezone(&Utc))
        .collect()
}

/// Slots of `date` that are neither booked nor already started at `now`
#[must_use]
pub fn available_slots(
    date: NaiveDate,
    scheduling: &SchedulingConfig,
    booked: &[TimeWindow],
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    slot_grid(date, scheduling)
        .into_iter()
        .filter(|start| *start >= now)
        .filter(|start| {
            let slot = TimeWindow::slot(*start);
            !booked.iter().any(|taken| overlaps(slot, *taken))
        })
        .collect()
}

/// Why a requested booking window is not a bookable slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotViolation {
    /// End is not exactly one slot after start
    WrongDuration,
    /// Start is not on an hour boundary of the operating offset
    NotAligned,
    /// Start falls outside the operating window
    OutsideOperatingHours,
}

impl SlotViolation {
    /// Human-readable explanation
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::WrongDuration => "Bookings must span exactly one hour",
            Self::NotAligned => "Bookings must start on the hour",
            Self::OutsideOperatingHours => "Requested time is outside operating hours",
        }
    }
}

/// Check that `window` is exactly one grid slot; returns its local calendar date
///
/// # Errors
///
/// Returns the first violated slot rule
pub fn validate_slot(
    window: TimeWindow,
    scheduling: &SchedulingConfig,
) -> Result<NaiveDate, SlotViolation> {
    if window.end - window.start != Duration::minutes(SLOT_MINUTES) {
        return Err(SlotViolation::WrongDuration);
    }

    let local = window.start.with_timezone(&scheduling.utc_offset);
    if local.minute() != 0 || local.second() != 0 || local.nanosecond() != 0 {
        return Err(SlotViolation::NotAligned);
    }

    let date = local.date_naive();
    if !slot_grid(date, scheduling).contains(&window.start) {
        return Err(SlotViolation::OutsideOperatingHours);
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_grid_has_sixteen_slots() {
        let grid = slot_grid(date(2025, 6, 7), &SchedulingConfig::default());
        assert_eq!(grid.len(), 16);
        assert_eq!(grid[0], at("2025-06-07T06:00:00Z"));
        assert_eq!(grid[15], at("2025-06-07T21:00:00Z"));
    }

    #[test]
    fn test_zero_length_window_is_empty() {
        let scheduling = SchedulingConfig::new(9, 9, 0).unwrap();
        assert!(slot_grid(date(2025, 6, 7), &scheduling).is_empty());
    }

    #[test]
    fn test_grid_respects_offset() {
        let scheduling = SchedulingConfig::new(6, 8, -300).unwrap();
        let grid = slot_grid(date(2025, 6, 7), &scheduling);
        assert_eq!(
            grid,
            vec![at("2025-06-07T11:00:00Z"), at("2025-06-07T12:00:00Z")]
        );
    }

    #[test]
    fn test_booked_and_past_slots_are_removed() {
        let scheduling = SchedulingConfig::new(8, 12, 0).unwrap();
        let booked = [TimeWindow::slot(at("2025-06-07T10:00:00Z"))];
        let slots = available_slots(
            date(2025, 6, 7),
            &scheduling,
            &booked,
            at("2025-06-07T08:30:00Z"),
        );
        assert_eq!(
            slots,
            vec![at("2025-06-07T09:00:00Z"), at("2025-06-07T11:00:00Z")]
        );
    }

    #[test]
    fn test_partial_overlap_removes_both_slots() {
        let scheduling = SchedulingConfig::new(8, 12, 0).unwrap();
        let booked = [TimeWindow::new(
            at("2025-06-07T09:30:00Z"),
            at("2025-06-07T10:30:00Z"),
        )];
        let slots = available_slots(
            date(2025, 6, 7),
            &scheduling,
            &booked,
            at("2025-06-01T00:00:00Z"),
        );
        assert_eq!(
            slots,
            vec![at("2025-06-07T08:00:00Z"), at("2025-06-07T11:00:00Z")]
        );
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        let first = TimeWindow::slot(at("2025-06-07T09:00:00Z"));
        let second = TimeWindow::slot(at("2025-06-07T10:00:00Z"));
        assert!(!overlaps(first, second));
        assert!(overlaps(first, first));
    }

    #[test]
    fn test_validate_slot_rules() {
        let scheduling = SchedulingConfig::default();
        let ok = TimeWindow::slot(at("2025-06-07T10:00:00Z"));
        assert_eq!(validate_slot(ok, &scheduling), Ok(date(2025, 6, 7)));

        let long = TimeWindow::new(at("2025-06-07T10:00:00Z"), at("2025-06-07T12:00:00Z"));
        assert_eq!(
            validate_slot(long, &scheduling),
            Err(SlotViolation::WrongDuration)
        );

        let skewed = TimeWindow::slot(at("2025-06-07T10:15:00Z"));
        assert_eq!(
            validate_slot(skewed, &scheduling),
            Err(SlotViolation::NotAligned)
        );

        let late = TimeWindow::slot(at("2025-06-07T22:00:00Z"));
        assert_eq!(
            validate_slot(late, &scheduling),
            Err(SlotViolation::OutsideOperatingHours)
        );
    }
}
