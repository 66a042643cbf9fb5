// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, a frozen clock and catalog fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `courtbook_server`

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use courtbook_server::{
    cache::CacheConfig,
    clock::FixedClock,
    config::{BookingConfig, DatabaseConfig, ServerConfig},
    database::Database,
    models::{
        Coach, Court, CourtType, CreateBookingRequest, CreateCoachRequest, CreateCourtRequest,
        CreateEquipmentRequest, CreatePricingRuleRequest, DayOfWeekCondition, Equipment,
        EquipmentType, PricingRule, RuleCondition,
    },
    resources::ServerResources,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Once};
use std::time::Duration;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// "Now" for every test: Sunday 2025-06-01 08:00 UTC
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

/// Saturday after [`test_now`]
pub fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
}

/// Monday after [`test_now`]
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

/// UTC instant at `hour:00` on `date` (tests run with a zero operating offset)
pub fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    date.and_hms_opt(hour, 0, 0).unwrap().and_utc()
}

/// Parse a decimal amount
pub fn dec(amount: &str) -> Decimal {
    Decimal::from_str(amount).unwrap()
}

/// Server configuration for tests: in-memory database, fast retries, no cache sweeper
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database: DatabaseConfig::in_memory(),
        cache: CacheConfig {
            enable_background_cleanup: false,
            ..CacheConfig::default()
        },
        booking: BookingConfig {
            lock_timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(5),
        },
        ..ServerConfig::default()
    }
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new(&DatabaseConfig::in_memory()).await?)
}

/// Fully wired resources over a fresh in-memory database and the frozen clock
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    create_test_resources_with(test_config()).await
}

/// Same as [`create_test_resources`] with a custom configuration
pub async fn create_test_resources_with(config: ServerConfig) -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new(&config.database).await?;
    let resources = ServerResources::new(
        database,
        Arc::new(config),
        Arc::new(FixedClock::new(test_now())),
    )
    .await?;
    Ok(Arc::new(resources))
}

/// Create an active court
pub async fn create_court(
    resources: &ServerResources,
    name: &str,
    court_type: CourtType,
    base_price: &str,
) -> Result<Court> {
    Ok(resources
        .catalog
        .create_court(&CreateCourtRequest {
            name: name.to_owned(),
            court_type,
            base_price: dec(base_price),
        })
        .await?)
}

/// Create an active coach
pub async fn create_coach(resources: &ServerResources, name: &str, rate: &str) -> Result<Coach> {
    Ok(resources
        .catalog
        .create_coach(&CreateCoachRequest {
            name: name.to_owned(),
            specialization: "Doubles".to_owned(),
            hourly_rate: dec(rate),
        })
        .await?)
}

/// Create an active equipment item
pub async fn create_equipment(
    resources: &ServerResources,
    name: &str,
    total_stock: u32,
    rental_price: &str,
) -> Result<Equipment> {
    Ok(resources
        .catalog
        .create_equipment(&CreateEquipmentRequest {
            name: name.to_owned(),
            equipment_type: EquipmentType::Racket,
            total_stock,
            rental_price: dec(rental_price),
        })
        .await?)
}

/// Create an active rule
pub async fn create_rule(
    resources: &ServerResources,
    name: &str,
    condition: RuleCondition,
    surcharge: &str,
    multiplier: &str,
    priority: i64,
) -> Result<PricingRule> {
    Ok(resources
        .catalog
        .create_rule(&CreatePricingRuleRequest {
            name: name.to_owned(),
            description: None,
            condition,
            surcharge: dec(surcharge),
            multiplier: dec(multiplier),
            priority,
        })
        .await?)
}

/// The weekend rule used across scenarios: +10 on Saturday and Sunday
pub async fn create_weekend_rule(resources: &ServerResources) -> Result<PricingRule> {
    create_rule(
        resources,
        "Weekend",
        RuleCondition::DayOfWeek(DayOfWeekCondition {
            weekend: true,
            days: Vec::new(),
        }),
        "10",
        "1",
        5,
    )
    .await
}

/// One-hour booking request starting at `start`
pub fn booking_request(court_id: Uuid, start: DateTime<Utc>, user: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        user_id: user.to_owned(),
        user_name: format!("Player {user}"),
        user_email: format!("{user}@example.com"),
        court_id,
        date: None,
        start_time: start,
        end_time: start + chrono::Duration::hours(1),
        equipment_ids: Vec::new(),
        coach_id: None,
    }
}
