// ABOUTME: Route handlers for the resource catalog: courts, coaches, equipment and pricing rules
// ABOUTME: Public listings plus admin create, soft delete, toggle and rule deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! Catalog routes
//!
//! Listings return active records only (pricing rules return every rule so
//! the admin screen can toggle them back on). Ids are serialized as `_id`.

use super::wire::{format_instant, json_body, money, parse_id};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Coach, Court, CourtType, CreateCoachRequest, CreateCourtRequest, CreateEquipmentRequest,
    CreatePricingRuleRequest, Equipment, EquipmentType, PricingRule, RuleCondition, RuleKind,
};
use crate::resources::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

// ================================================================================================
// Wire types
// ================================================================================================

/// Court as seen by the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtResponse {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// `indoor` or `outdoor`
    #[serde(rename = "type")]
    pub court_type: CourtType,
    /// Hourly base price
    #[serde(with = "money")]
    pub base_price: Decimal,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<Court> for CourtResponse {
    fn from(court: Court) -> Self {
        Self {
            id: court.id.to_string(),
            name: court.name,
            court_type: court.court_type,
            base_price: court.base_price,
            is_active: court.is_active,
            created_at: format_instant(&court.created_at),
        }
    }
}

/// Body of `POST /api/courts`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourtBody {
    /// Display name
    pub name: String,
    /// `indoor` or `outdoor`
    #[serde(rename = "type", alias = "courtType")]
    pub court_type: CourtType,
    /// Hourly base price
    #[serde(with = "money")]
    pub base_price: Decimal,
}

impl From<CreateCourtBody> for CreateCourtRequest {
    fn from(body: CreateCourtBody) -> Self {
        Self {
            name: body.name.trim().to_owned(),
            court_type: body.court_type,
            base_price: body.base_price,
        }
    }
}

/// Coach as seen by the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachResponse {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form specialization
    pub specialization: String,
    /// Fee per hour
    #[serde(with = "money")]
    pub hourly_rate: Decimal,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<Coach> for CoachResponse {
    fn from(coach: Coach) -> Self {
        Self {
            id: coach.id.to_string(),
            name: coach.name,
            specialization: coach.specialization,
            hourly_rate: coach.hourly_rate,
            is_active: coach.is_active,
            created_at: format_instant(&coach.created_at),
        }
    }
}

/// Body of `POST /api/coaches`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoachBody {
    /// Display name
    pub name: String,
    /// Free-form specialization
    #[serde(default)]
    pub specialization: String,
    /// Fee per hour
    #[serde(with = "money")]
    pub hourly_rate: Decimal,
}

impl From<CreateCoachBody> for CreateCoachRequest {
    fn from(body: CreateCoachBody) -> Self {
        Self {
            name: body.name.trim().to_owned(),
            specialization: body.specialization.trim().to_owned(),
            hourly_rate: body.hourly_rate,
        }
    }
}

/// Equipment item as seen by the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentResponse {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// `racket`, `shoes` or `other`
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    /// Units owned
    pub total_stock: u32,
    /// Rental fee per unit
    #[serde(with = "money")]
    pub rental_price: Decimal,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<Equipment> for EquipmentResponse {
    fn from(item: Equipment) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            equipment_type: item.equipment_type,
            total_stock: item.total_stock,
            rental_price: item.rental_price,
            is_active: item.is_active,
            created_at: format_instant(&item.created_at),
        }
    }
}

/// Body of `POST /api/equipment`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentBody {
    /// Display name
    pub name: String,
    /// Category (defaults to `other`)
    #[serde(rename = "type", alias = "equipmentType", default)]
    pub equipment_type: EquipmentType,
    /// Units owned; negative values are rejected by deserialization
    pub total_stock: u32,
    /// Rental fee per unit
    #[serde(with = "money")]
    pub rental_price: Decimal,
}

impl From<CreateEquipmentBody> for CreateEquipmentRequest {
    fn from(body: CreateEquipmentBody) -> Self {
        Self {
            name: body.name.trim().to_owned(),
            equipment_type: body.equipment_type,
            total_stock: body.total_stock,
            rental_price: body.rental_price,
        }
    }
}

/// Pricing rule as seen by the admin screen
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRuleResponse {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Rule name
    pub name: String,
    /// Optional admin note
    pub description: Option<String>,
    /// Condition kind
    #[serde(rename = "type")]
    pub rule_type: RuleKind,
    /// Kind-specific condition fields
    pub conditions: Value,
    /// Flat addend
    #[serde(with = "money")]
    pub surcharge: Decimal,
    /// Multiplicative factor
    #[serde(with = "money")]
    pub multiplier: Decimal,
    /// Application priority
    pub priority: i64,
    /// Whether the engine applies it
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl From<PricingRule> for PricingRuleResponse {
    fn from(rule: PricingRule) -> Self {
        let conditions = serde_json::to_value(&rule.condition)
            .ok()
            .and_then(|mut tagged| tagged.get_mut("conditions").map(Value::take))
            .unwrap_or_else(|| json!({}));
        Self {
            id: rule.id.to_string(),
            name: rule.name,
            description: rule.description,
            rule_type: rule.condition.kind(),
            conditions,
            surcharge: rule.surcharge,
            multiplier: rule.multiplier,
            priority: rule.priority,
            is_active: rule.is_active,
            created_at: format_instant(&rule.created_at),
        }
    }
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

/// Body of `POST /api/pricing-rules`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePricingRuleBody {
    /// Rule name
    pub name: String,
    /// Optional admin note
    #[serde(default)]
    pub description: Option<String>,
    /// Condition kind
    #[serde(rename = "type")]
    pub rule_type: RuleKind,
    /// Kind-specific condition fields
    #[serde(default)]
    pub conditions: Value,
    /// Flat addend (defaults to 0)
    #[serde(with = "money", default)]
    pub surcharge: Decimal,
    /// Multiplicative factor (defaults to 1)
    #[serde(with = "money", default = "default_multiplier")]
    pub multiplier: Decimal,
    /// Application priority (defaults to 0)
    #[serde(default)]
    pub priority: i64,
}

impl TryFrom<CreatePricingRuleBody> for CreatePricingRuleRequest {
    type Error = AppError;

    fn try_from(body: CreatePricingRuleBody) -> AppResult<Self> {
        let conditions = if body.conditions.is_null() {
            json!({})
        } else {
            body.conditions
        };
        let condition: RuleCondition = serde_json::from_value(json!({
            "type": body.rule_type,
            "conditions": conditions,
        }))
        .map_err(|e| {
            AppError::invalid_input(format!(
                "Invalid conditions for a {} rule: {e}",
                body.rule_type.as_str()
            ))
        })?;

        Ok(Self {
            name: body.name.trim().to_owned(),
            description: body
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            condition,
            surcharge: body.surcharge,
            multiplier: body.multiplier,
            priority: body.priority,
        })
    }
}

// ================================================================================================
// Routes
// ================================================================================================

/// Catalog routes handler
pub struct CatalogRoutes;

impl CatalogRoutes {
    /// Create all catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/courts",
                get(Self::handle_list_courts).post(Self::handle_create_court),
            )
            .route("/api/courts/:id", delete(Self::handle_delete_court))
            .route("/api/courts/:id/toggle", patch(Self::handle_toggle_court))
            .route(
                "/api/coaches",
                get(Self::handle_list_coaches).post(Self::handle_create_coach),
            )
            .route("/api/coaches/:id", delete(Self::handle_delete_coach))
            .route("/api/coaches/:id/toggle", patch(Self::handle_toggle_coach))
            .route(
                "/api/equipment",
                get(Self::handle_list_equipment).post(Self::handle_create_equipment),
            )
            .route("/api/equipment/:id", delete(Self::handle_delete_equipment))
            .route(
                "/api/equipment/:id/toggle",
                patch(Self::handle_toggle_equipment),
            )
            .route(
                "/api/pricing-rules",
                get(Self::handle_list_rules).post(Self::handle_create_rule),
            )
            .route("/api/pricing-rules/:id", delete(Self::handle_delete_rule))
            .route(
                "/api/pricing-rules/:id/toggle",
                patch(Self::handle_toggle_rule),
            )
            .with_state(resources)
    }

    fn deleted(id: &str, message: &str) -> Response {
        (
            StatusCode::OK,
            Json(json!({ "message": message, "_id": id })),
        )
            .into_response()
    }

    // Courts

    /// Handle GET /api/courts
    async fn handle_list_courts(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let courts: Vec<CourtResponse> = resources
            .catalog
            .list_courts()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(json!({ "courts": courts }))).into_response())
    }

    /// Handle POST /api/courts
    async fn handle_create_court(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateCourtBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request: CreateCourtRequest = json_body(payload)?.into();
        let court = CourtResponse::from(resources.catalog.create_court(&request).await?);
        Ok((StatusCode::CREATED, Json(json!({ "court": court }))).into_response())
    }

    /// Handle DELETE /api/courts/:id (soft delete)
    async fn handle_delete_court(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .catalog
            .deactivate_court(parse_id(&id, "courtId")?)
            .await?;
        Ok(Self::deleted(&id, "Court deactivated"))
    }

    /// Handle PATCH /api/courts/:id/toggle
    async fn handle_toggle_court(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let court = resources
            .catalog
            .toggle_court(parse_id(&id, "courtId")?)
            .await?;
        let court = CourtResponse::from(court);
        Ok((StatusCode::OK, Json(json!({ "court": court }))).into_response())
    }

    // Coaches

    /// Handle GET /api/coaches
    async fn handle_list_coaches(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let coaches: Vec<CoachResponse> = resources
            .catalog
            .list_coaches()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(json!({ "coaches": coaches }))).into_response())
    }

    /// Handle POST /api/coaches
    async fn handle_create_coach(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateCoachBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request: CreateCoachRequest = json_body(payload)?.into();
        let coach = CoachResponse::from(resources.catalog.create_coach(&request).await?);
        Ok((StatusCode::CREATED, Json(json!({ "coach": coach }))).into_response())
    }

    /// Handle DELETE /api/coaches/:id (soft delete)
    async fn handle_delete_coach(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .catalog
            .deactivate_coach(parse_id(&id, "coachId")?)
            .await?;
        Ok(Self::deleted(&id, "Coach deactivated"))
    }

    /// Handle PATCH /api/coaches/:id/toggle
    async fn handle_toggle_coach(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let coach = resources
            .catalog
            .toggle_coach(parse_id(&id, "coachId")?)
            .await?;
        let coach = CoachResponse::from(coach);
        Ok((StatusCode::OK, Json(json!({ "coach": coach }))).into_response())
    }

    // Equipment

    /// Handle GET /api/equipment
    async fn handle_list_equipment(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let equipment: Vec<EquipmentResponse> = resources
            .catalog
            .list_equipment()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(json!({ "equipment": equipment }))).into_response())
    }

    /// Handle POST /api/equipment
    async fn handle_create_equipment(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateEquipmentBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request: CreateEquipmentRequest = json_body(payload)?.into();
        let item = EquipmentResponse::from(resources.catalog.create_equipment(&request).await?);
        Ok((StatusCode::CREATED, Json(json!({ "equipment": item }))).into_response())
    }

    /// Handle DELETE /api/equipment/:id (soft delete)
    async fn handle_delete_equipment(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .catalog
            .deactivate_equipment(parse_id(&id, "equipmentId")?)
            .await?;
        Ok(Self::deleted(&id, "Equipment deactivated"))
    }

    /// Handle PATCH /api/equipment/:id/toggle
    async fn handle_toggle_equipment(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let item = resources
            .catalog
            .toggle_equipment(parse_id(&id, "equipmentId")?)
            .await?;
        let item = EquipmentResponse::from(item);
        Ok((StatusCode::OK, Json(json!({ "equipment": item }))).into_response())
    }

    // Pricing rules

    /// Handle GET /api/pricing-rules (active and inactive)
    async fn handle_list_rules(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let rules: Vec<PricingRuleResponse> = resources
            .catalog
            .list_rules()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(json!({ "rules": rules }))).into_response())
    }

    /// Handle POST /api/pricing-rules
    async fn handle_create_rule(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreatePricingRuleBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = CreatePricingRuleRequest::try_from(json_body(payload)?)?;
        let rule = PricingRuleResponse::from(resources.catalog.create_rule(&request).await?);
        Ok((StatusCode::CREATED, Json(json!({ "rule": rule }))).into_response())
    }

    /// Handle DELETE /api/pricing-rules/:id (hard delete)
    async fn handle_delete_rule(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        resources
            .catalog
            .delete_rule(parse_id(&id, "ruleId")?)
            .await?;
        Ok(Self::deleted(&id, "Pricing rule deleted"))
    }

    /// Handle PATCH /api/pricing-rules/:id/toggle
    async fn handle_toggle_rule(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let rule = resources
            .catalog
            .toggle_rule(parse_id(&id, "ruleId")?)
            .await?;
        let rule = PricingRuleResponse::from(rule);
        Ok((StatusCode::OK, Json(json!({ "rule": rule }))).into_response())
    }
}
