// ABOUTME: Demo catalog seeder for the Courtbook booking screens
// ABOUTME: Inserts courts, coaches, rental equipment and a typical set of pricing rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! Demo data seeder for Courtbook.
//!
//! Usage:
//! ```bash
//! # Seed the database named by DATABASE_URL
//! cargo run --bin seed-demo-data
//!
//! # Seed a specific file, even if it already has courts
//! cargo run --bin seed-demo-data -- --database-url sqlite:./data/demo.db --force
//! ```

use anyhow::Result;
use chrono::{NaiveTime, Weekday};
use clap::Parser;
use courtbook_server::{
    cache::{memory::InMemoryCache, CacheProvider},
    config::{environment::ServerConfig, DatabaseUrl},
    database::Database,
    logging,
    models::{
        CourtType, CourtTypeCondition, CreateCoachRequest, CreateCourtRequest,
        CreateEquipmentRequest, CreatePricingRuleRequest, DayOfWeekCondition, EquipmentType,
        HolidayCondition, RuleCondition, TimeRangeCondition,
    },
    services::CatalogService,
};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "Courtbook Demo Data Seeder",
    long_about = "Populate the catalog with demo courts, coaches, equipment and pricing rules"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Seed even when the catalog already has courts
    #[arg(long)]
    force: bool,
}

fn money(units: i64, cents: u32) -> Decimal {
    Decimal::new(units * 100 + i64::from(cents), 2)
}

fn clock(hour: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, 0, 0).ok_or_else(|| anyhow::anyhow!("invalid hour {hour}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&database_url)?;
    }
    config.database.auto_migrate = true;

    let database = Database::new(&config.database).await?;
    let cache = InMemoryCache::new(config.cache.clone()).await?;
    let catalog = CatalogService::new(&database, cache, config.cache.ttl);

    if !args.force && !catalog.list_courts().await?.is_empty() {
        info!("Catalog already seeded; pass --force to add the demo set again");
        return Ok(());
    }

    seed_courts(&catalog).await?;
    seed_coaches(&catalog).await?;
    seed_equipment(&catalog).await?;
    seed_rules(&catalog).await?;

    info!("Demo catalog written to {}", config.database.url);
    Ok(())
}

async fn seed_courts(catalog: &CatalogService) -> Result<()> {
    let courts = [
        ("Court A", CourtType::Indoor, money(20, 0)),
        ("Court B", CourtType::Indoor, money(20, 0)),
        ("Court C", CourtType::Outdoor, money(15, 0)),
        ("Court D", CourtType::Outdoor, money(12, 50)),
    ];
    for (name, court_type, base_price) in courts {
        let court = catalog
            .create_court(&CreateCourtRequest {
                name: name.to_owned(),
                court_type,
                base_price,
            })
            .await?;
        info!("Court {} ({})", court.name, court.id);
    }
    Ok(())
}

async fn seed_coaches(catalog: &CatalogService) -> Result<()> {
    let coaches = [
        ("Maya Torres", "Beginner fundamentals", money(25, 0)),
        ("Jon Okafor", "Competitive doubles", money(40, 0)),
        ("Lena Weiss", "Junior programs", money(30, 0)),
    ];
    for (name, specialization, hourly_rate) in coaches {
        let coach = catalog
            .create_coach(&CreateCoachRequest {
                name: name.to_owned(),
                specialization: specialization.to_owned(),
                hourly_rate,
            })
            .await?;
        info!("Coach {} ({})", coach.name, coach.id);
    }
    Ok(())
}

async fn seed_equipment(catalog: &CatalogService) -> Result<()> {
    let items = [
        ("Pro racket", EquipmentType::Racket, 10, money(5, 0)),
        ("Court shoes", EquipmentType::Shoes, 8, money(3, 0)),
        ("Ball tube", EquipmentType::Other, 20, money(2, 50)),
    ];
    for (name, equipment_type, total_stock, rental_price) in items {
        let item = catalog
            .create_equipment(&CreateEquipmentRequest {
                name: name.to_owned(),
                equipment_type,
                total_stock,
                rental_price,
            })
            .await?;
        info!("Equipment {} x{} ({})", item.name, item.total_stock, item.id);
    }
    Ok(())
}

async fn seed_rules(catalog: &CatalogService) -> Result<()> {
    let rules = [
        CreatePricingRuleRequest {
            name: "Evening peak".to_owned(),
            description: Some("18:00-21:00 is the busiest window".to_owned()),
            condition: RuleCondition::TimeRange(TimeRangeCondition {
                start_time: clock(18)?,
                end_time: clock(21)?,
            }),
            surcharge: money(5, 0),
            multiplier: Decimal::ONE,
            priority: 10,
        },
        CreatePricingRuleRequest {
            name: "Weekend".to_owned(),
            description: None,
            condition: RuleCondition::DayOfWeek(DayOfWeekCondition {
                weekend: true,
                days: Vec::new(),
            }),
            surcharge: money(10, 0),
            multiplier: Decimal::ONE,
            priority: 5,
        },
        CreatePricingRuleRequest {
            name: "Friday evening league".to_owned(),
            description: Some("League nights fill the indoor courts".to_owned()),
            condition: RuleCondition::DayOfWeek(DayOfWeekCondition {
                weekend: false,
                days: vec![Weekday::Fri],
            }),
            surcharge: money(2, 0),
            multiplier: Decimal::ONE,
            priority: 4,
        },
        CreatePricingRuleRequest {
            name: "Indoor premium".to_owned(),
            description: None,
            condition: RuleCondition::CourtType(CourtTypeCondition {
                court_type: CourtType::Indoor,
            }),
            surcharge: money(3, 0),
            multiplier: Decimal::ONE,
            priority: 3,
        },
        CreatePricingRuleRequest {
            name: "Holiday rate".to_owned(),
            description: Some("Configured holidays plus listed dates".to_owned()),
            condition: RuleCondition::Holiday(HolidayCondition::default()),
            surcharge: Decimal::ZERO,
            multiplier: Decimal::new(15, 1),
            priority: 1,
        },
    ];
    for request in &rules {
        let rule = catalog.create_rule(request).await?;
        info!("Pricing rule {} ({})", rule.name, rule.id);
    }
    Ok(())
}
