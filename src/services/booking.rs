// ABOUTME: Booking transactor: validates, serializes per resource, re-checks and commits atomically
// ABOUTME: Contended attempts are retried with jittered backoff, then reported as a conflict
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! # Booking commit path
//!
//! One attempt runs through three states:
//!
//! 1. **Validated**: contact fields, slot grid, not in the past, court active.
//! 2. **Reserved**: async locks on the court, the coach and every equipment
//!    item are taken in canonical order, then a single database transaction
//!    re-reads the court, coach and equipment and re-checks every overlap.
//! 3. **Committed**: the breakdown is computed by the pricing fold from the
//!    re-read records and stored with the booking as a frozen snapshot.
//!
//! A failed gate rolls the transaction back, so nothing is ever half written.

use super::catalog::CatalogService;
use super::locks::{ResourceKey, ResourceLocks};
use crate::clock::Clock;
use crate::config::{BookingConfig, SchedulingConfig};
use crate::database::{BookingsManager, CoachesManager, CourtsManager, EquipmentManager};
use crate::engine::{
    compute_breakdown, count_units, find_shortfall, validate_slot, PricingInput, TimeWindow,
};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::models::{Booking, BookingStatus, CreateBookingRequest};
use rand::Rng;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// SQLite result codes that mean "someone else holds the write lock, try again"
const TRANSIENT_SQLITE_CODES: &[&str] = &["5", "6", "261", "262", "517"];

/// Outcome of one commit attempt that did not succeed
#[derive(Debug, Error)]
enum AttemptError {
    /// A gate failed; retrying cannot help
    #[error(transparent)]
    Rejected(AppError),
    /// Lock wait or store contention on `resource`; worth another attempt
    #[error("{resource} is contended: {reason}")]
    Contended {
        resource: ResourceKey,
        reason: String,
    },
}

impl AttemptError {
    fn from_store(error: AppError, resource: ResourceKey) -> Self {
        if is_transient(&error) {
            Self::Contended {
                resource,
                reason: error.message,
            }
        } else {
            Self::Rejected(error)
        }
    }
}

/// Commits bookings without ever double-booking a court, a coach or equipment stock
#[derive(Clone)]
pub struct BookingService {
    pool: SqlitePool,
    bookings: BookingsManager,
    catalog: Arc<CatalogService>,
    locks: Arc<ResourceLocks>,
    scheduling: Arc<SchedulingConfig>,
    config: BookingConfig,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Create the transactor
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<CatalogService>,
        scheduling: Arc<SchedulingConfig>,
        config: BookingConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings: BookingsManager::new(pool.clone()),
            pool,
            catalog,
            locks: Arc::new(ResourceLocks::new()),
            scheduling,
            config,
            clock,
        }
    }

    /// Validate and atomically commit a booking
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` / `INVALID_DATE` when the request fails validation
    /// - `RESOURCE_NOT_FOUND` for an unknown or inactive court, coach or item
    /// - `SLOT_CONFLICT`, `COACH_CONFLICT`, `EQUIPMENT_EXHAUSTED` when a
    ///   resource is taken, or stays contended after every retry
    pub async fn create_booking(&self, request: CreateBookingRequest) -> AppResult<Booking> {
        let window = match self.validate(&request).await {
            Ok(window) => window,
            Err(e) => {
                AppLogger::log_booking_rejected(
                    request.court_id,
                    &request.user_id,
                    e.code.as_str(),
                    &e.message,
                );
                return Err(e);
            }
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.try_commit(&request, window).await {
                Ok(booking) => {
                    AppLogger::log_booking_committed(
                        booking.id,
                        booking.court_id,
                        &booking.user_id,
                        &booking.price_breakdown.total.to_string(),
                        attempt,
                    );
                    return Ok(booking);
                }
                Err(AttemptError::Rejected(e)) => {
                    AppLogger::log_booking_rejected(
                        request.court_id,
                        &request.user_id,
                        e.code.as_str(),
                        &e.message,
                    );
                    return Err(e);
                }
                Err(AttemptError::Contended { resource, reason }) => {
                    if attempt >= max_attempts {
                        let error = contention_error(resource);
                        AppLogger::log_booking_rejected(
                            request.court_id,
                            &request.user_id,
                            error.code.as_str(),
                            &reason,
                        );
                        return Err(error);
                    }
                    AppLogger::log_booking_retry(request.court_id, attempt, &reason);
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Booking by id
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when no such booking exists
    pub async fn get_booking(&self, id: Uuid) -> AppResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id}")))
    }

    /// Every booking of a user, latest slot first
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank user id, or a database error
    pub async fn list_user_bookings(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        if user_id.trim().is_empty() {
            return Err(AppError::invalid_input("userId is required"));
        }
        self.bookings.list_by_user(user_id).await
    }

    /// Cancel a booking, releasing its court, coach and equipment
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when no such booking exists
    pub async fn cancel_booking(&self, id: Uuid) -> AppResult<Booking> {
        let booking = self
            .bookings
            .cancel(id, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id}")))?;
        AppLogger::log_booking_cancelled(booking.id);
        Ok(booking)
    }

    async fn validate(&self, request: &CreateBookingRequest) -> AppResult<TimeWindow> {
        if request.user_id.trim().is_empty() {
            return Err(AppError::invalid_input("userId is required"));
        }
        if request.user_name.trim().is_empty() {
            return Err(AppError::invalid_input("userName is required"));
        }
        let email = request.user_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_input("userEmail must be a valid email address"));
        }

        let window = TimeWindow::new(request.start_time, request.end_time);
        let slot_date = validate_slot(window, &self.scheduling)
            .map_err(|violation| AppError::invalid_input(violation.message()))?;
        if let Some(date) = request.date {
            if date != slot_date {
                return Err(AppError::invalid_input(format!(
                    "date {date} does not match the slot date {slot_date}"
                )));
            }
        }
        if window.start < self.clock.now() {
            return Err(AppError::invalid_date("Cannot book a slot in the past"));
        }

        self.catalog.active_court(request.court_id).await?;
        Ok(window)
    }

    async fn try_commit(
        &self,
        request: &CreateBookingRequest,
        window: TimeWindow,
    ) -> Result<Booking, AttemptError> {
        let court_key = ResourceKey::Court(request.court_id);
        let units = count_units(&request.equipment_ids);

        let keys = std::iter::once(court_key)
            .chain(request.coach_id.map(ResourceKey::Coach))
            .chain(units.keys().copied().map(ResourceKey::Equipment));
        let _held = self
            .locks
            .acquire(keys, self.config.lock_timeout)
            .await
            .map_err(|resource| AttemptError::Contended {
                resource,
                reason: format!("Timed out waiting for {resource}"),
            })?;

        // Loaded before the transaction so a cache miss never waits on the held connection
        let rules = self
            .catalog
            .active_rules()
            .await
            .map_err(AttemptError::Rejected)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to begin transaction: {e}")).with_source(e)
            })
            .map_err(|e| AttemptError::from_store(e, court_key))?;

        // Court
        let court = CourtsManager::fetch(&mut *tx, request.court_id)
            .await
            .map_err(|e| AttemptError::from_store(e, court_key))?
            .filter(|court| court.is_active)
            .ok_or_else(|| {
                AttemptError::Rejected(AppError::not_found(format!("Court {}", request.court_id)))
            })?;
        if BookingsManager::court_overlap(&mut *tx, court.id, &window)
            .await
            .map_err(|e| AttemptError::from_store(e, court_key))?
            .is_some()
        {
            return Err(AttemptError::Rejected(AppError::slot_conflict(format!(
                "{} is already booked at {}",
                court.name,
                window.start.to_rfc3339()
            ))));
        }

        // Coach
        let coach = match request.coach_id {
            Some(coach_id) => {
                let coach_key = ResourceKey::Coach(coach_id);
                let coach = CoachesManager::fetch(&mut *tx, coach_id)
                    .await
                    .map_err(|e| AttemptError::from_store(e, coach_key))?
                    .filter(|coach| coach.is_active)
                    .ok_or_else(|| {
                        AttemptError::Rejected(AppError::not_found(format!("Coach {coach_id}")))
                    })?;
                if BookingsManager::coach_overlap(&mut *tx, coach_id, &window)
                    .await
                    .map_err(|e| AttemptError::from_store(e, coach_key))?
                    .is_some()
                {
                    return Err(AttemptError::Rejected(AppError::coach_conflict(format!(
                        "{} is already booked for this time",
                        coach.name
                    ))));
                }
                Some(coach)
            }
            None => None,
        };

        // Equipment
        let mut equipment = Vec::with_capacity(request.equipment_ids.len());
        if !units.is_empty() {
            let ids: Vec<Uuid> = units.keys().copied().collect();
            let items: HashMap<Uuid, _> = EquipmentManager::fetch_many(&mut tx, &ids)
                .await
                .map_err(|e| AttemptError::from_store(e, court_key))?
                .into_iter()
                .map(|item| (item.id, item))
                .collect();

            for id in &ids {
                if !items.get(id).is_some_and(|item| item.is_active) {
                    return Err(AttemptError::Rejected(AppError::not_found(format!(
                        "Equipment {id}"
                    ))));
                }
            }

            let stock: HashMap<Uuid, u32> = items
                .values()
                .map(|item| (item.id, item.total_stock))
                .collect();
            let reserved = BookingsManager::reserved_units(&mut *tx, &window)
                .await
                .map_err(|e| AttemptError::from_store(e, court_key))?;
            if let Some(shortfall) = find_shortfall(&units, &stock, &reserved) {
                let name = items
                    .get(&shortfall.equipment_id)
                    .map_or("Equipment", |item| item.name.as_str());
                return Err(AttemptError::Rejected(AppError::equipment_exhausted(format!(
                    "{name}: {} requested, {} available",
                    shortfall.requested,
                    shortfall.remaining()
                ))));
            }

            equipment.extend(
                request
                    .equipment_ids
                    .iter()
                    .filter_map(|id| items.get(id).cloned()),
            );
        }

        let price_breakdown = compute_breakdown(&PricingInput {
            court: &court,
            window,
            equipment: &equipment,
            coach: coach.as_ref(),
            rules: &rules,
            scheduling: &self.scheduling,
        })
        .map_err(AttemptError::Rejected)?;

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: request.user_id.trim().to_owned(),
            user_name: request.user_name.trim().to_owned(),
            user_email: request.user_email.trim().to_owned(),
            court_id: court.id,
            start_time: window.start,
            end_time: window.end,
            equipment_ids: request.equipment_ids.clone(),
            coach_id: request.coach_id,
            price_breakdown,
            status: BookingStatus::Confirmed,
            created_at: self.clock.now(),
            cancelled_at: None,
        };

        BookingsManager::insert(&mut tx, &booking)
            .await
            .map_err(|e| AttemptError::from_store(e, court_key))?;
        tx.commit()
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to commit booking: {e}")).with_source(e)
            })
            .map_err(|e| AttemptError::from_store(e, court_key))?;

        Ok(booking)
    }

    /// Exponential backoff with up to one base delay of jitter
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.retry_base_delay;
        let exponential = base.saturating_mul(1 << attempt.saturating_sub(1).min(6));
        let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis().max(1));
        exponential + Duration::from_millis(u64::try_from(jitter_ms).unwrap_or(0))
    }
}

/// Conflict reported for a resource that stayed contended on every attempt
fn contention_error(resource: ResourceKey) -> AppError {
    match resource {
        ResourceKey::Court(_) => {
            AppError::slot_conflict("The slot is being booked by someone else")
        }
        ResourceKey::Coach(_) => {
            AppError::coach_conflict("The coach is being booked by someone else")
        }
        ResourceKey::Equipment(_) => {
            AppError::equipment_exhausted("Equipment is being booked by someone else")
        }
    }
}

/// Whether a store error is write contention that a later attempt may not hit
fn is_transient(error: &AppError) -> bool {
    if error.code != ErrorCode::DatabaseError {
        return false;
    }
    let Some(source) = error
        .source
        .as_ref()
        .and_then(|source| source.downcast_ref::<sqlx::Error>())
    else {
        return false;
    };
    match source {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| TRANSIENT_SQLITE_CODES.iter().any(|c| code == *c)),
        _ => false,
    }
}
