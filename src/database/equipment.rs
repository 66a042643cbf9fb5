// ABOUTME: Database operations for rentable equipment items
// ABOUTME: Stock is a capacity ceiling; units in use are derived from overlapping bookings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::{decode_decimal, decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{CreateEquipmentRequest, Equipment, EquipmentType};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

const EQUIPMENT_COLUMNS: &str =
    "id, name, equipment_type, total_stock, rental_price, is_active, created_at";

/// Equipment database operations manager
#[derive(Clone)]
pub struct EquipmentManager {
    pool: SqlitePool,
}

impl EquipmentManager {
    /// Create a new equipment manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new active equipment item
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, request: &CreateEquipmentRequest) -> AppResult<Equipment> {
        let item = Equipment {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            equipment_type: request.equipment_type,
            total_stock: request.total_stock,
            rental_price: request.rental_price,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO equipment (id, name, equipment_type, total_stock, rental_price, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6)
            ",
        )
        .bind(item.id.to_string())
        .bind(&item.name)
        .bind(item.equipment_type.as_str())
        .bind(i64::from(item.total_stock))
        .bind(item.rental_price.to_string())
        .bind(encode_timestamp(&item.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create equipment: {e}")).with_source(e)
        })?;

        Ok(item)
    }

    /// Get an equipment item by id (active or not)
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let row = sqlx::query(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get equipment: {e}")).with_source(e))?;

        row.map(|r| row_to_equipment(&r)).transpose()
    }

    /// Load several items inside an open transaction; missing ids are simply absent
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn fetch_many(
        conn: &mut SqliteConnection,
        ids: &[Uuid],
    ) -> AppResult<Vec<Equipment>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let row = sqlx::query(&format!(
                "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = $1"
            ))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to get equipment: {e}")).with_source(e)
            })?;

            if let Some(row) = row {
                items.push(row_to_equipment(&row)?);
            }
        }
        Ok(items)
    }

    /// List active equipment ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_active(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE is_active = 1 ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list equipment: {e}")).with_source(e))?;

        rows.iter().map(row_to_equipment).collect()
    }

    /// Soft delete; returns false when the item does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn deactivate(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE equipment SET is_active = 0 WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to deactivate equipment: {e}")).with_source(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the active flag and return the updated item
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let result = sqlx::query("UPDATE equipment SET is_active = 1 - is_active WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to toggle equipment: {e}")).with_source(e)
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

fn row_to_equipment(row: &SqliteRow) -> AppResult<Equipment> {
    let id: String = row.get("id");
    let equipment_type: String = row.get("equipment_type");
    let total_stock: i64 = row.get("total_stock");
    let rental_price: String = row.get("rental_price");
    let is_active: i64 = row.get("is_active");
    let created_at: String = row.get("created_at");

    Ok(Equipment {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        equipment_type: EquipmentType::parse(&equipment_type),
        total_stock: u32::try_from(total_stock)
            .map_err(|_| AppError::internal(format!("Invalid stock value {total_stock}")))?,
        rental_price: decode_decimal(&rental_price)?,
        is_active: is_active == 1,
        created_at: decode_timestamp(&created_at)?,
    })
}
