// ABOUTME: Database operations for pricing rules
// ABOUTME: Conditions are stored as a rule_type column plus a JSON conditions document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::{decode_decimal, decode_timestamp, decode_uuid, encode_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{CreatePricingRuleRequest, PricingRule, RuleCondition};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

const RULE_COLUMNS: &str = "id, name, description, rule_type, conditions, surcharge, multiplier, priority, is_active, created_at";

/// Pricing rule database operations manager
#[derive(Clone)]
pub struct PricingRulesManager {
    pool: SqlitePool,
}

impl PricingRulesManager {
    /// Create a new pricing rules manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new active rule
    ///
    /// # Errors
    ///
    /// Returns an error if the condition cannot be encoded or the insert fails
    pub async fn create(&self, request: &CreatePricingRuleRequest) -> AppResult<PricingRule> {
        let rule = PricingRule {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            description: request.description.clone(),
            condition: request.condition.clone(),
            surcharge: request.surcharge,
            multiplier: request.multiplier,
            priority: request.priority,
            is_active: true,
            created_at: Utc::now(),
        };

        let (rule_type, conditions) = encode_condition(&rule.condition)?;

        sqlx::query(
            r"
            INSERT INTO pricing_rules (
                id, name, description, rule_type, conditions, surcharge, multiplier,
                priority, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, $9)
            ",
        )
        .bind(rule.id.to_string())
        .bind(&rule.name)
        .bind(rule.description.as_deref())
        .bind(rule_type)
        .bind(conditions)
        .bind(rule.surcharge.to_string())
        .bind(rule.multiplier.to_string())
        .bind(rule.priority)
        .bind(encode_timestamp(&rule.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create pricing rule: {e}")).with_source(e)
        })?;

        Ok(rule)
    }

    /// Get a rule by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<PricingRule>> {
        let row = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM pricing_rules WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to get pricing rule: {e}")).with_source(e)
        })?;

        row.map(|r| row_to_rule(&r)).transpose()
    }

    /// Every rule, active and inactive, highest priority first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_all(&self) -> AppResult<Vec<PricingRule>> {
        let rows = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM pricing_rules ORDER BY priority DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to list pricing rules: {e}")).with_source(e)
        })?;

        rows.iter().map(row_to_rule).collect()
    }

    /// Active rules only, highest priority first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_active(&self) -> AppResult<Vec<PricingRule>> {
        let rows = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM pricing_rules WHERE is_active = 1 ORDER BY priority DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to list pricing rules: {e}")).with_source(e)
        })?;

        rows.iter().map(row_to_rule).collect()
    }

    /// Flip the active flag and return the updated rule
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Option<PricingRule>> {
        let result =
            sqlx::query("UPDATE pricing_rules SET is_active = 1 - is_active WHERE id = $1")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to toggle pricing rule: {e}")).with_source(e)
                })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Hard delete; bookings keep their frozen price snapshots
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM pricing_rules WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to delete pricing rule: {e}")).with_source(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Split a condition into its `rule_type` column and `conditions` JSON text
fn encode_condition(condition: &RuleCondition) -> AppResult<(&'static str, String)> {
    let mut tagged = serde_json::to_value(condition)?;
    let conditions = tagged
        .get_mut("conditions")
        .map(Value::take)
        .unwrap_or_else(|| json!({}));
    Ok((condition.kind().as_str(), conditions.to_string()))
}

fn decode_condition(rule_type: &str, conditions: &str) -> AppResult<RuleCondition> {
    let conditions: Value = serde_json::from_str(conditions)?;
    serde_json::from_value(json!({ "type": rule_type, "conditions": conditions })).map_err(|e| {
        AppError::internal(format!("Stored {rule_type} rule has invalid conditions: {e}"))
    })
}

fn row_to_rule(row: &SqliteRow) -> AppResult<PricingRule> {
    let id: String = row.get("id");
    let rule_type: String = row.get("rule_type");
    let conditions: String = row.get("conditions");
    let surcharge: String = row.get("surcharge");
    let multiplier: String = row.get("multiplier");
    let is_active: i64 = row.get("is_active");
    let created_at: String = row.get("created_at");

    Ok(PricingRule {
        id: decode_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        condition: decode_condition(&rule_type, &conditions)?,
        surcharge: decode_decimal(&surcharge)?,
        multiplier: decode_decimal(&multiplier)?,
        priority: row.get("priority"),
        is_active: is_active == 1,
        created_at: decode_timestamp(&created_at)?,
    })
}
