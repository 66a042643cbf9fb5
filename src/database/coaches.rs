// ABOUTME: Database operations for bookable coaches
// ABOUTME: Coaches are optional add-ons to a court booking and are never hard deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::{decode_decimal, decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{Coach, CreateCoachRequest};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

const COACH_COLUMNS: &str = "id, name, specialization, hourly_rate, is_active, created_at";

/// Coach database operations manager
#[derive(Clone)]
pub struct CoachesManager {
    pool: SqlitePool,
}

impl CoachesManager {
    /// Create a new coaches manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new active coach
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, request: &CreateCoachRequest) -> AppResult<Coach> {
        let coach = Coach {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            specialization: request.specialization.clone(),
            hourly_rate: request.hourly_rate,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO coaches (id, name, specialization, hourly_rate, is_active, created_at)
            VALUES ($1, $2, $3, $4, 1, $5)
            ",
        )
        .bind(coach.id.to_string())
        .bind(&coach.name)
        .bind(&coach.specialization)
        .bind(coach.hourly_rate.to_string())
        .bind(encode_timestamp(&coach.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create coach: {e}")).with_source(e))?;

        Ok(coach)
    }

    /// Fetch a coach (active or not) through any executor, including an open transaction
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn fetch<'e, E>(executor: E, id: Uuid) -> AppResult<Option<Coach>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query(&format!("SELECT {COACH_COLUMNS} FROM coaches WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .map_err(|e| AppError::database(format!("Failed to get coach: {e}")).with_source(e))?;

        row.map(|r| row_to_coach(&r)).transpose()
    }

    /// Get a coach by id (active or not)
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Coach>> {
        Self::fetch(&self.pool, id).await
    }

    /// List active coaches ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_active(&self) -> AppResult<Vec<Coach>> {
        let rows = sqlx::query(&format!(
            "SELECT {COACH_COLUMNS} FROM coaches WHERE is_active = 1 ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list coaches: {e}")).with_source(e))?;

        rows.iter().map(row_to_coach).collect()
    }

    /// Soft delete; returns false when the coach does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE coaches SET is_active = 0 WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to deactivate coach: {e}")).with_source(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the active flag and return the updated coach
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Coach>> {
        let result = sqlx::query("UPDATE coaches SET is_active = 1 - is_active WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to toggle coach: {e}")).with_source(e)
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

fn row_to_coach(row: &SqliteRow) -> AppResult<Coach> {
    let id: String = row.get("id");
    let hourly_rate: String = row.get("hourly_rate");
    let is_active: i64 = row.get("is_active");
    let created_at: String = row.get("created_at");

    Ok(Coach {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        specialization: row.get("specialization"),
        hourly_rate: decode_decimal(&hourly_rate)?,
        is_active: is_active == 1,
        created_at: decode_timestamp(&created_at)?,
    })
}
