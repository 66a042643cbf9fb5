// ABOUTME: Database operations for bookings and their equipment reservations
// ABOUTME: Overlap and reserved-unit queries run against the pool or inside a commit transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::{decode_timestamp, decode_uuid, encode_timestamp};
use crate::engine::{count_units, TimeWindow};
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, user_id, user_name, user_email, court_id, coach_id, start_time, end_time, equipment_ids, price_breakdown, status, created_at, cancelled_at";

/// Booking database operations manager
#[derive(Clone)]
pub struct BookingsManager {
    pool: SqlitePool,
}

impl BookingsManager {
    /// Create a new bookings manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a booking and one `booking_equipment` row per distinct item.
    ///
    /// Runs on the caller's connection so it joins the commit transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or any insert fails. A violation of the
    /// confirmed-slot unique index surfaces as `SLOT_CONFLICT`.
    pub async fn insert(conn: &mut SqliteConnection, booking: &Booking) -> AppResult<()> {
        let equipment_ids = serde_json::to_string(&booking.equipment_ids)?;
        let breakdown = serde_json::to_string(&booking.price_breakdown)?;

        sqlx::query(
            r"
            INSERT INTO bookings (
                id, user_id, user_name, user_email, court_id, coach_id, start_time, end_time,
                equipment_ids, price_breakdown, total_price, status, created_at, cancelled_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NULL)
            ",
        )
        .bind(booking.id.to_string())
        .bind(&booking.user_id)
        .bind(&booking.user_name)
        .bind(&booking.user_email)
        .bind(booking.court_id.to_string())
        .bind(booking.coach_id.map(|id| id.to_string()))
        .bind(encode_timestamp(&booking.start_time))
        .bind(encode_timestamp(&booking.end_time))
        .bind(equipment_ids)
        .bind(breakdown)
        .bind(booking.price_breakdown.total.to_string())
        .bind(booking.status.as_str())
        .bind(encode_timestamp(&booking.created_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::slot_conflict("Court is already booked for this slot")
            } else {
                AppError::database(format!("Failed to create booking: {e}")).with_source(e)
            }
        })?;

        for (equipment_id, quantity) in count_units(&booking.equipment_ids) {
            sqlx::query(
                r"
                INSERT INTO booking_equipment (booking_id, equipment_id, quantity)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(booking.id.to_string())
            .bind(equipment_id.to_string())
            .bind(i64::from(quantity))
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to reserve equipment: {e}")).with_source(e)
            })?;
        }

        Ok(())
    }

    /// Get a booking by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get booking: {e}")).with_source(e))?;

        row.map(|r| row_to_booking(&r)).transpose()
    }

    /// Bookings of one user, most recent slot first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY start_time DESC, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list bookings: {e}")).with_source(e))?;

        rows.iter().map(row_to_booking).collect()
    }

    /// Windows of confirmed bookings on a court that intersect `range`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn confirmed_court_windows(
        &self,
        court_id: Uuid,
        range: &TimeWindow,
    ) -> AppResult<Vec<TimeWindow>> {
        let rows = sqlx::query(
            r"
            SELECT start_time, end_time FROM bookings
            WHERE court_id = $1 AND status = 'confirmed' AND start_time < $3 AND end_time > $2
            ORDER BY start_time
            ",
        )
        .bind(court_id.to_string())
        .bind(encode_timestamp(&range.start))
        .bind(encode_timestamp(&range.end))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to load court bookings: {e}")).with_source(e)
        })?;

        rows.iter()
            .map(|row| {
                let start: String = row.get("start_time");
                let end: String = row.get("end_time");
                Ok(TimeWindow::new(decode_timestamp(&start)?, decode_timestamp(&end)?))
            })
            .collect()
    }

    /// Id of a confirmed booking holding the court during `window`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn court_overlap<'e, E>(
        executor: E,
        court_id: Uuid,
        window: &TimeWindow,
    ) -> AppResult<Option<Uuid>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        overlapping_booking(executor, "court_id", court_id, window).await
    }

    /// Id of a confirmed booking holding the coach during `window`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn coach_overlap<'e, E>(
        executor: E,
        coach_id: Uuid,
        window: &TimeWindow,
    ) -> AppResult<Option<Uuid>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        overlapping_booking(executor, "coach_id", coach_id, window).await
    }

    /// Units of every equipment item held by confirmed bookings overlapping `window`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn reserved_units<'e, E>(
        executor: E,
        window: &TimeWindow,
    ) -> AppResult<HashMap<Uuid, u32>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query(
            r"
            SELECT be.equipment_id AS equipment_id, SUM(be.quantity) AS reserved
            FROM booking_equipment be
            JOIN bookings b ON b.id = be.booking_id
            WHERE b.status = 'confirmed' AND b.start_time < $2 AND b.end_time > $1
            GROUP BY be.equipment_id
            ",
        )
        .bind(encode_timestamp(&window.start))
        .bind(encode_timestamp(&window.end))
        .fetch_all(executor)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to load equipment reservations: {e}")).with_source(e)
        })?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("equipment_id");
                let reserved: i64 = row.get("reserved");
                let reserved = u32::try_from(reserved).map_err(|_| {
                    AppError::internal(format!("Invalid reserved unit count {reserved}"))
                })?;
                Ok((decode_uuid(&id)?, reserved))
            })
            .collect()
    }

    /// Mark a confirmed booking cancelled.
    ///
    /// Returns `None` when the booking does not exist; cancelling an already
    /// cancelled booking returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn cancel(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Booking>> {
        sqlx::query(
            r"
            UPDATE bookings SET status = 'cancelled', cancelled_at = $2
            WHERE id = $1 AND status = 'confirmed'
            ",
        )
        .bind(id.to_string())
        .bind(encode_timestamp(&at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to cancel booking: {e}")).with_source(e))?;

        self.get(id).await
    }
}

async fn overlapping_booking<'e, E>(
    executor: E,
    column: &str,
    resource_id: Uuid,
    window: &TimeWindow,
) -> AppResult<Option<Uuid>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        r"
        SELECT id FROM bookings
        WHERE {column} = $1 AND status = 'confirmed' AND start_time < $3 AND end_time > $2
        ORDER BY start_time
        LIMIT 1
        "
    ))
    .bind(resource_id.to_string())
    .bind(encode_timestamp(&window.start))
    .bind(encode_timestamp(&window.end))
    .fetch_optional(executor)
    .await
    .map_err(|e| {
        AppError::database(format!("Failed to check {column} overlap: {e}")).with_source(e)
    })?;

    row.map(|r| {
        let id: String = r.get("id");
        decode_uuid(&id)
    })
    .transpose()
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn row_to_booking(row: &SqliteRow) -> AppResult<Booking> {
    let id: String = row.get("id");
    let court_id: String = row.get("court_id");
    let coach_id: Option<String> = row.get("coach_id");
    let start_time: String = row.get("start_time");
    let end_time: String = row.get("end_time");
    let equipment_ids: String = row.get("equipment_ids");
    let price_breakdown: String = row.get("price_breakdown");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let cancelled_at: Option<String> = row.get("cancelled_at");

    Ok(Booking {
        id: decode_uuid(&id)?,
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        user_email: row.get("user_email"),
        court_id: decode_uuid(&court_id)?,
        start_time: decode_timestamp(&start_time)?,
        end_time: decode_timestamp(&end_time)?,
        equipment_ids: serde_json::from_str(&equipment_ids)?,
        coach_id: coach_id.as_deref().map(decode_uuid).transpose()?,
        price_breakdown: serde_json::from_str(&price_breakdown)?,
        status: BookingStatus::parse(&status),
        created_at: decode_timestamp(&created_at)?,
        cancelled_at: cancelled_at.as_deref().map(decode_timestamp).transpose()?,
    })
}
