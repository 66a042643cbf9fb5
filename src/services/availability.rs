// ABOUTME: Free hourly slots of one court on one operating date
// ABOUTME: Combines the slot grid with confirmed bookings and the injected clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::catalog::CatalogService;
use crate::clock::Clock;
use crate::config::SchedulingConfig;
use crate::database::BookingsManager;
use crate::engine::{available_slots, slot_grid, TimeWindow};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Answers "which hours of this court are still free on this date"
#[derive(Clone)]
pub struct AvailabilityService {
    catalog: Arc<CatalogService>,
    bookings: BookingsManager,
    scheduling: Arc<SchedulingConfig>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    /// Create the service
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>,
        bookings: BookingsManager,
        scheduling: Arc<SchedulingConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            scheduling,
            clock,
        }
    }

    /// Chronological slot starts of `date` that are free and not yet begun
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown or inactive court and
    /// `INVALID_DATE` for a date before today at the operating offset
    pub async fn available_slots(
        &self,
        court_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<DateTime<Utc>>> {
        self.catalog.active_court(court_id).await?;

        let now = self.clock.now();
        let today = self.scheduling.local_date(now);
        if date < today {
            return Err(AppError::invalid_date(format!(
                "{date} is in the past (today is {today})"
            )));
        }

        let grid = slot_grid(date, &self.scheduling);
        let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
            return Ok(Vec::new());
        };
        let day = TimeWindow::new(*first, TimeWindow::slot(*last).end);

        let booked = self.bookings.confirmed_court_windows(court_id, &day).await?;
        Ok(available_slots(date, &self.scheduling, &booked, now))
    }

    /// Operating configuration used for slot arithmetic
    #[must_use]
    pub fn scheduling(&self) -> &SchedulingConfig {
        &self.scheduling
    }
}
