// ABOUTME: Database operations for bookable courts
// ABOUTME: Create, lookup, active listing, soft delete and active-flag toggling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::{decode_decimal, decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{Court, CourtType, CreateCourtRequest};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

const COURT_COLUMNS: &str = "id, name, court_type, base_price, is_active, created_at";

/// Court database operations manager
#[derive(Clone)]
pub struct CourtsManager {
    pool: SqlitePool,
}

impl CourtsManager {
    /// Create a new courts manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new active court
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, request: &CreateCourtRequest) -> AppResult<Court> {
        let court = Court {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            court_type: request.court_type,
            base_price: request.base_price,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO courts (id, name, court_type, base_price, is_active, created_at)
            VALUES ($1, $2, $3, $4, 1, $5)
            ",
        )
        .bind(court.id.to_string())
        .bind(&court.name)
        .bind(court.court_type.as_str())
        .bind(court.base_price.to_string())
        .bind(encode_timestamp(&court.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create court: {e}")).with_source(e))?;

        Ok(court)
    }

    /// Fetch a court (active or not) through any executor, including an open transaction
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn fetch<'e, E>(executor: E, id: Uuid) -> AppResult<Option<Court>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query(&format!("SELECT {COURT_COLUMNS} FROM courts WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .map_err(|e| AppError::database(format!("Failed to get court: {e}")).with_source(e))?;

        row.map(|r| row_to_court(&r)).transpose()
    }

    /// Get a court by id (active or not)
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Court>> {
        Self::fetch(&self.pool, id).await
    }

    /// List active courts ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_active(&self) -> AppResult<Vec<Court>> {
        let rows = sqlx::query(&format!(
            "SELECT {COURT_COLUMNS} FROM courts WHERE is_active = 1 ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list courts: {e}")).with_source(e))?;

        rows.iter().map(row_to_court).collect()
    }

    /// Soft delete; returns false when the court does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE courts SET is_active = 0 WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to deactivate court: {e}")).with_source(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the active flag and return the updated court
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Court>> {
        let result = sqlx::query("UPDATE courts SET is_active = 1 - is_active WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to toggle court: {e}")).with_source(e)
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

fn row_to_court(row: &SqliteRow) -> AppResult<Court> {
    let id: String = row.get("id");
    let court_type: String = row.get("court_type");
    let base_price: String = row.get("base_price");
    let is_active: i64 = row.get("is_active");
    let created_at: String = row.get("created_at");

    Ok(Court {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        court_type: CourtType::parse(&court_type)
            .ok_or_else(|| AppError::internal(format!("Unknown court type '{court_type}'")))?,
        base_price: decode_decimal(&base_price)?,
        is_active: is_active == 1,
        created_at: decode_timestamp(&created_at)?,
    })
}
