// ABOUTME: SQLite persistence for the catalog, pricing rules and bookings
// ABOUTME: Owns the connection pool, idempotent schema migration and column codecs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! # Database Management
//!
//! One manager struct per table, each a thin wrapper over a cloned
//! `SqlitePool`. Timestamps are stored as fixed-width UTC RFC 3339 text so
//! that lexical comparison in SQL equals temporal comparison, and money is
//! stored as decimal text so no binary floating point touches an amount.

/// Booking persistence and overlap queries
pub mod bookings;
/// Coach catalog persistence
pub mod coaches;
/// Court catalog persistence
pub mod courts;
/// Equipment catalog persistence
pub mod equipment;
/// Pricing rule persistence
pub mod pricing_rules;

pub use bookings::BookingsManager;
pub use coaches::CoachesManager;
pub use courts::CourtsManager;
pub use equipment::EquipmentManager;
pub use pricing_rules::PricingRulesManager;

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// How long a connection waits on a locked database file before `SQLITE_BUSY`
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle shared by all managers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config`, migrating when requested
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the migration fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool_options = match &config.url {
            // Every in-memory connection is its own database; keep exactly one alive
            DatabaseUrl::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>),
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::config(format!(
                            "Cannot create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                SqlitePoolOptions::new().max_connections(config.max_connections)
            }
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {}: {e}", config.url)))?;

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Wrap an existing pool (schema is not touched)
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap liveness probe
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Create every table and index if missing
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        info!("Database schema is up to date");
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS courts (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        court_type TEXT NOT NULL CHECK (court_type IN ('indoor', 'outdoor')),
        base_price TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS coaches (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        specialization TEXT NOT NULL DEFAULT '',
        hourly_rate TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS equipment (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        equipment_type TEXT NOT NULL DEFAULT 'other',
        total_stock INTEGER NOT NULL CHECK (total_stock >= 0),
        rental_price TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS pricing_rules (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        rule_type TEXT NOT NULL,
        conditions TEXT NOT NULL,
        surcharge TEXT NOT NULL,
        multiplier TEXT NOT NULL,
        priority INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        user_name TEXT NOT NULL,
        user_email TEXT NOT NULL,
        court_id TEXT NOT NULL REFERENCES courts(id),
        coach_id TEXT REFERENCES coaches(id),
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        equipment_ids TEXT NOT NULL DEFAULT '[]',
        price_breakdown TEXT NOT NULL,
        total_price TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'confirmed' CHECK (status IN ('confirmed', 'cancelled')),
        created_at TEXT NOT NULL,
        cancelled_at TEXT,
        CHECK (start_time < end_time)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS booking_equipment (
        booking_id TEXT NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
        equipment_id TEXT NOT NULL REFERENCES equipment(id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        PRIMARY KEY (booking_id, equipment_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_bookings_court_time ON bookings(court_id, start_time, end_time)",
    "CREATE INDEX IF NOT EXISTS idx_bookings_coach_time ON bookings(coach_id, start_time, end_time)",
    "CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings(user_id, start_time)",
    "CREATE INDEX IF NOT EXISTS idx_booking_equipment_item ON booking_equipment(equipment_id)",
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_confirmed_court_slot
        ON bookings(court_id, start_time) WHERE status = 'confirmed'
    ",
];

/// Fixed-width UTC text form used for every stored timestamp
#[must_use]
pub fn encode_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime '{raw}': {e}")))
}

pub(crate) fn decode_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::internal(format!("Invalid UUID '{raw}': {e}")))
}

pub(crate) fn decode_decimal(raw: &str) -> AppResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| AppError::internal(format!("Invalid decimal '{raw}': {e}")))
}
