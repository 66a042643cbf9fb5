// ABOUTME: Cache-backed catalog of courts, coaches, equipment and pricing rules
// ABOUTME: Reads go through a short-TTL cache; every admin write invalidates the affected keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use crate::cache::memory::InMemoryCache;
use crate::cache::{CacheKey, CacheProvider};
use crate::constants::money::{MAX_AMOUNT, MAX_MULTIPLIER};
use crate::database::{
    CoachesManager, CourtsManager, Database, EquipmentManager, PricingRulesManager,
};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{
    Coach, Court, CreateCoachRequest, CreateCourtRequest, CreateEquipmentRequest,
    CreatePricingRuleRequest, Equipment, PricingRule, RuleCondition,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Catalog reads and admin writes
#[derive(Clone)]
pub struct CatalogService {
    courts: CourtsManager,
    coaches: CoachesManager,
    equipment: EquipmentManager,
    rules: PricingRulesManager,
    cache: InMemoryCache,
    ttl: Duration,
}

impl CatalogService {
    /// Build the catalog over `database` with `cache` holding entries for `ttl`
    #[must_use]
    pub fn new(database: &Database, cache: InMemoryCache, ttl: Duration) -> Self {
        let pool = database.pool().clone();
        Self {
            courts: CourtsManager::new(pool.clone()),
            coaches: CoachesManager::new(pool.clone()),
            equipment: EquipmentManager::new(pool.clone()),
            rules: PricingRulesManager::new(pool),
            cache,
            ttl,
        }
    }

    /// Serve `key` from cache, loading and storing it on a miss.
    ///
    /// A failing cache never fails the read; the loader result is used as is.
    async fn cached<T, F, Fut>(&self, key: CacheKey, load: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        match self.cache.get::<T>(&key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Catalog cache read failed"),
        }

        let value = load().await?;
        if let Err(e) = self.cache.set(&key, &value, self.ttl).await {
            warn!(key = %key, error = %e, "Catalog cache write failed");
        }
        Ok(value)
    }

    async fn invalidate(&self, pattern: &str) {
        if let Err(e) = self.cache.invalidate_pattern(pattern).await {
            warn!(pattern, error = %e, "Catalog cache invalidation failed");
        }
    }

    // ========================================================================
    // Courts
    // ========================================================================

    /// Create a court
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name or a price outside `[0, 1_000_000]`,
    /// or a database error
    pub async fn create_court(&self, request: &CreateCourtRequest) -> AppResult<Court> {
        require_name(&request.name, "Court")?;
        require_amount(request.base_price, "basePrice")?;

        let court = self.courts.create(request).await?;
        self.invalidate(CacheKey::COURTS_PATTERN).await;
        AppLogger::log_catalog_write("court", "create", court.id);
        Ok(court)
    }

    /// Court by id, active or not
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn court(&self, id: Uuid) -> AppResult<Option<Court>> {
        self.cached(CacheKey::Court(id), || self.courts.get(id)).await
    }

    /// Court by id that must be bookable
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for unknown or deactivated courts
    pub async fn active_court(&self, id: Uuid) -> AppResult<Court> {
        self.court(id)
            .await?
            .filter(|court| court.is_active)
            .ok_or_else(|| AppError::not_found(format!("Court {id}")))
    }

    /// Active courts ordered by name
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn list_courts(&self) -> AppResult<Vec<Court>> {
        self.cached(CacheKey::ActiveCourts, || self.courts.list_active()).await
    }

    /// Soft delete a court
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the court does not exist
    pub async fn deactivate_court(&self, id: Uuid) -> AppResult<()> {
        if !self.courts.deactivate(id).await? {
            return Err(AppError::not_found(format!("Court {id}")));
        }
        self.invalidate(CacheKey::COURTS_PATTERN).await;
        AppLogger::log_catalog_write("court", "deactivate", id);
        Ok(())
    }

    /// Flip a court's active flag
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the court does not exist
    pub async fn toggle_court(&self, id: Uuid) -> AppResult<Court> {
        let court = self
            .courts
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Court {id}")))?;
        self.invalidate(CacheKey::COURTS_PATTERN).await;
        AppLogger::log_catalog_write("court", "toggle", id);
        Ok(court)
    }

    // ========================================================================
    // Coaches
    // ========================================================================

    /// Create a coach
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name or negative rate, or a database error
    pub async fn create_coach(&self, request: &CreateCoachRequest) -> AppResult<Coach> {
        require_name(&request.name, "Coach")?;
        require_amount(request.hourly_rate, "hourlyRate")?;

        let coach = self.coaches.create(request).await?;
        self.invalidate(CacheKey::COACHES_PATTERN).await;
        AppLogger::log_catalog_write("coach", "create", coach.id);
        Ok(coach)
    }

    /// Coach by id, active or not
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn coach(&self, id: Uuid) -> AppResult<Option<Coach>> {
        self.cached(CacheKey::Coach(id), || self.coaches.get(id)).await
    }

    /// Coach by id that must be bookable
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for unknown or deactivated coaches
    pub async fn active_coach(&self, id: Uuid) -> AppResult<Coach> {
        self.coach(id)
            .await?
            .filter(|coach| coach.is_active)
            .ok_or_else(|| AppError::not_found(format!("Coach {id}")))
    }

    /// Active coaches ordered by name
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn list_coaches(&self) -> AppResult<Vec<Coach>> {
        self.cached(CacheKey::ActiveCoaches, || self.coaches.list_active()).await
    }

    /// Soft delete a coach
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the coach does not exist
    pub async fn deactivate_coach(&self, id: Uuid) -> AppResult<()> {
        if !self.coaches.deactivate(id).await? {
            return Err(AppError::not_found(format!("Coach {id}")));
        }
        self.invalidate(CacheKey::COACHES_PATTERN).await;
        AppLogger::log_catalog_write("coach", "deactivate", id);
        Ok(())
    }

    /// Flip a coach's active flag
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the coach does not exist
    pub async fn toggle_coach(&self, id: Uuid) -> AppResult<Coach> {
        let coach = self
            .coaches
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Coach {id}")))?;
        self.invalidate(CacheKey::COACHES_PATTERN).await;
        AppLogger::log_catalog_write("coach", "toggle", id);
        Ok(coach)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Create an equipment item
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name or a price outside `[0, 1_000_000]`,
    /// or a database error
    pub async fn create_equipment(&self, request: &CreateEquipmentRequest) -> AppResult<Equipment> {
        require_name(&request.name, "Equipment")?;
        require_amount(request.rental_price, "rentalPrice")?;

        let item = self.equipment.create(request).await?;
        self.invalidate(CacheKey::EQUIPMENT_PATTERN).await;
        AppLogger::log_catalog_write("equipment", "create", item.id);
        Ok(item)
    }

    /// Equipment item by id, active or not
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn equipment(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        self.cached(CacheKey::Equipment(id), || self.equipment.get(id)).await
    }

    /// Active equipment ordered by name
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.cached(CacheKey::ActiveEquipment, || self.equipment.list_active()).await
    }

    /// Soft delete an equipment item
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the item does not exist
    pub async fn deactivate_equipment(&self, id: Uuid) -> AppResult<()> {
        if !self.equipment.deactivate(id).await? {
            return Err(AppError::not_found(format!("Equipment {id}")));
        }
        self.invalidate(CacheKey::EQUIPMENT_PATTERN).await;
        AppLogger::log_catalog_write("equipment", "deactivate", id);
        Ok(())
    }

    /// Flip an equipment item's active flag
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the item does not exist
    pub async fn toggle_equipment(&self, id: Uuid) -> AppResult<Equipment> {
        let item = self
            .equipment
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Equipment {id}")))?;
        self.invalidate(CacheKey::EQUIPMENT_PATTERN).await;
        AppLogger::log_catalog_write("equipment", "toggle", id);
        Ok(item)
    }

    // ========================================================================
    // Pricing rules
    // ========================================================================

    /// Create a pricing rule
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a blank name, a multiplier outside `(0, 100]`,
    /// an out-of-range surcharge or a time range whose start equals its end
    pub async fn create_rule(&self, request: &CreatePricingRuleRequest) -> AppResult<PricingRule> {
        require_name(&request.name, "Pricing rule")?;
        if request.multiplier <= Decimal::ZERO
            || request.multiplier > Decimal::from(MAX_MULTIPLIER)
        {
            return Err(AppError::invalid_input(format!(
                "multiplier must be greater than 0 and at most {MAX_MULTIPLIER}"
            )));
        }
        if request.surcharge.abs() > Decimal::from(MAX_AMOUNT) {
            return Err(AppError::invalid_input(format!(
                "surcharge must be within +/-{MAX_AMOUNT}"
            )));
        }
        if let RuleCondition::TimeRange(range) = &request.condition {
            if range.start_time == range.end_time {
                return Err(AppError::invalid_input(
                    "timeRange startTime and endTime must differ",
                ));
            }
        }

        let rule = self.rules.create(request).await?;
        self.invalidate(CacheKey::RULES_PATTERN).await;
        AppLogger::log_catalog_write("pricing_rule", "create", rule.id);
        Ok(rule)
    }

    /// Every rule, active and inactive (admin listing; never cached)
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn list_rules(&self) -> AppResult<Vec<PricingRule>> {
        self.rules.list_all().await
    }

    /// Active rule snapshot used by the pricing fold
    ///
    /// # Errors
    ///
    /// Returns a database error
    pub async fn active_rules(&self) -> AppResult<Vec<PricingRule>> {
        self.cached(CacheKey::ActiveRules, || self.rules.list_active()).await
    }

    /// Flip a rule's active flag
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the rule does not exist
    pub async fn toggle_rule(&self, id: Uuid) -> AppResult<PricingRule> {
        let rule = self
            .rules
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Pricing rule {id}")))?;
        self.invalidate(CacheKey::RULES_PATTERN).await;
        AppLogger::log_catalog_write("pricing_rule", "toggle", id);
        Ok(rule)
    }

    /// Hard delete a rule
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the rule does not exist
    pub async fn delete_rule(&self, id: Uuid) -> AppResult<()> {
        if !self.rules.delete(id).await? {
            return Err(AppError::not_found(format!("Pricing rule {id}")));
        }
        self.invalidate(CacheKey::RULES_PATTERN).await;
        AppLogger::log_catalog_write("pricing_rule", "delete", id);
        Ok(())
    }
}

fn require_name(name: &str, resource: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid_input(format!("{resource} name is required")));
    }
    Ok(())
}

fn require_amount(amount: Decimal, field: &str) -> AppResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::invalid_input(format!("{field} cannot be negative")));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::invalid_input(format!("{field} cannot exceed {MAX_AMOUNT}")));
    }
    Ok(())
}
