// ABOUTME: Route handlers for availability lookup, price preview and the booking lifecycle
// ABOUTME: Translates frontend JSON into typed requests for the availability, pricing and booking services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::wire::{
    format_instant, json_body, money, parse_id, parse_instant, parse_optional_id, query_params,
};
use crate::config::SchedulingConfig;
use crate::engine::TimeWindow;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Booking, BookingStatus, CreateBookingRequest, PriceBreakdown, PriceQuoteRequest,
};
use crate::resources::ServerResources;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

// ================================================================================================
// Wire types
// ================================================================================================

/// Query of `GET /api/bookings/available-slots`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsQuery {
    /// Court to inspect
    pub court_id: Option<String>,
    /// Operating date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// `iso` (default) or `object`
    pub format: Option<String>,
}

/// One free slot in the `format=object` representation
#[derive(Debug, Serialize)]
pub struct SlotObject {
    /// ISO-8601 start instant
    pub start: String,
    /// Local `"HH:MM - HH:MM"` label
    pub hour: String,
}

/// Query of `GET /api/bookings`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookingsQuery {
    /// Owner of the bookings
    pub user_id: Option<String>,
}

/// Body of `POST /api/bookings/price-preview`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePreviewBody {
    /// Court to price
    pub court_id: String,
    /// Window start (ISO-8601)
    pub start_time: String,
    /// Window end (ISO-8601)
    pub end_time: String,
    /// One entry per rented unit
    #[serde(default)]
    pub equipment_ids: Vec<String>,
    /// Optional coach; `""` means none
    #[serde(default)]
    pub coach_id: Option<String>,
}

impl TryFrom<PricePreviewBody> for PriceQuoteRequest {
    type Error = AppError;

    fn try_from(body: PricePreviewBody) -> AppResult<Self> {
        Ok(Self {
            court_id: parse_id(&body.court_id, "courtId")?,
            start_time: parse_instant(&body.start_time, "startTime")?,
            end_time: parse_instant(&body.end_time, "endTime")?,
            equipment_ids: parse_equipment_ids(&body.equipment_ids)?,
            coach_id: parse_optional_id(body.coach_id.as_deref(), "coachId")?,
        })
    }
}

/// Body of `POST /api/bookings`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    /// Caller identity
    #[serde(default)]
    pub user_id: String,
    /// Display name
    #[serde(default)]
    pub user_name: String,
    /// Contact email
    #[serde(default)]
    pub user_email: String,
    /// Court to book
    pub court_id: String,
    /// Optional local date the slot must fall on
    #[serde(default)]
    pub date: Option<String>,
    /// Slot start (ISO-8601)
    pub start_time: String,
    /// Slot end (ISO-8601)
    pub end_time: String,
    /// One entry per rented unit
    #[serde(default)]
    pub equipment_ids: Vec<String>,
    /// Optional coach; `""` means none
    #[serde(default)]
    pub coach_id: Option<String>,
}

impl TryFrom<CreateBookingBody> for CreateBookingRequest {
    type Error = AppError;

    fn try_from(body: CreateBookingBody) -> AppResult<Self> {
        let date = body
            .date
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_date(raw.get(..10).unwrap_or(raw)))
            .transpose()?;

        Ok(Self {
            user_id: body.user_id,
            user_name: body.user_name,
            user_email: body.user_email,
            court_id: parse_id(&body.court_id, "courtId")?,
            date,
            start_time: parse_instant(&body.start_time, "startTime")?,
            end_time: parse_instant(&body.end_time, "endTime")?,
            equipment_ids: parse_equipment_ids(&body.equipment_ids)?,
            coach_id: parse_optional_id(body.coach_id.as_deref(), "coachId")?,
        })
    }
}

/// Itemized price as the frontend renders it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownResponse {
    /// Court base price for the window
    #[serde(with = "money")]
    pub base_price: Decimal,
    /// Surcharges from `courtType` rules
    #[serde(with = "money")]
    pub court_type_premium: Decimal,
    /// Surcharges from `timeRange` rules
    #[serde(with = "money")]
    pub peak_hour_fee: Decimal,
    /// Surcharges from `dayOfWeek` rules
    #[serde(with = "money")]
    pub weekend_fee: Decimal,
    /// Surcharges from `holiday` rules
    #[serde(with = "money")]
    pub holiday_fee: Decimal,
    /// Equipment rental
    #[serde(with = "money")]
    pub equipment_fee: Decimal,
    /// Coach fee
    #[serde(with = "money")]
    pub coach_fee: Decimal,
    /// Sum of matched rule surcharges
    #[serde(with = "money")]
    pub rule_surcharges: Decimal,
    /// Product of matched rule multipliers
    #[serde(with = "money")]
    pub multiplier: Decimal,
    /// Additive sum before the multiplier
    #[serde(with = "money")]
    pub subtotal: Decimal,
    /// Matched rule names in application order
    pub applied_rules: Vec<String>,
    /// Final amount
    #[serde(with = "money")]
    pub total: Decimal,
    /// Alias of `total` read by the booking screens
    #[serde(with = "money")]
    pub total_price: Decimal,
}

impl From<PriceBreakdown> for BreakdownResponse {
    fn from(breakdown: PriceBreakdown) -> Self {
        Self {
            base_price: breakdown.base_price,
            court_type_premium: breakdown.court_type_premium,
            peak_hour_fee: breakdown.peak_hour_fee,
            weekend_fee: breakdown.weekend_fee,
            holiday_fee: breakdown.holiday_fee,
            equipment_fee: breakdown.equipment_fee,
            coach_fee: breakdown.coach_fee,
            rule_surcharges: breakdown.rule_surcharges,
            multiplier: breakdown.multiplier,
            subtotal: breakdown.subtotal,
            applied_rules: breakdown.applied_rules,
            total: breakdown.total,
            total_price: breakdown.total,
        }
    }
}

/// Booking record as returned to the frontend
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Caller identity
    pub user_id: String,
    /// Display name
    pub user_name: String,
    /// Contact email
    pub user_email: String,
    /// Booked court
    pub court_id: String,
    /// Slot start
    pub start_time: String,
    /// Slot end
    pub end_time: String,
    /// Rented units
    pub equipment_ids: Vec<String>,
    /// Booked coach, if any
    pub coach_id: Option<String>,
    /// Breakdown frozen at commit time
    pub price_breakdown: BreakdownResponse,
    /// Frozen total
    #[serde(with = "money")]
    pub total_price: Decimal,
    /// `confirmed` or `cancelled`
    pub status: BookingStatus,
    /// Commit timestamp
    pub created_at: String,
    /// Cancellation timestamp
    pub cancelled_at: Option<String>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            user_id: booking.user_id,
            user_name: booking.user_name,
            user_email: booking.user_email,
            court_id: booking.court_id.to_string(),
            start_time: format_instant(&booking.start_time),
            end_time: format_instant(&booking.end_time),
            equipment_ids: booking
                .equipment_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            coach_id: booking.coach_id.map(|id| id.to_string()),
            total_price: booking.price_breakdown.total,
            price_breakdown: booking.price_breakdown.into(),
            status: booking.status,
            created_at: format_instant(&booking.created_at),
            cancelled_at: booking.cancelled_at.as_ref().map(format_instant),
        }
    }
}

fn parse_equipment_ids(raw: &[String]) -> AppResult<Vec<Uuid>> {
    raw.iter().map(|id| parse_id(id, "equipmentIds")).collect()
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid_date(format!("'{raw}' is not a YYYY-MM-DD date")))
}

/// `"HH:MM - HH:MM"` in the operating timezone
fn hour_label(start: DateTime<Utc>, scheduling: &SchedulingConfig) -> String {
    let window = TimeWindow::slot(start);
    format!(
        "{} - {}",
        window.start.with_timezone(&scheduling.utc_offset).format("%H:%M"),
        window.end.with_timezone(&scheduling.utc_offset).format("%H:%M"),
    )
}

// ================================================================================================
// Routes
// ================================================================================================

/// Booking routes handler
pub struct BookingRoutes;

impl BookingRoutes {
    /// Create all booking routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/bookings/available-slots",
                get(Self::handle_available_slots),
            )
            .route(
                "/api/bookings/price-preview",
                post(Self::handle_price_preview),
            )
            .route(
                "/api/bookings",
                get(Self::handle_list_bookings).post(Self::handle_create_booking),
            )
            .route("/api/bookings/:id", get(Self::handle_get_booking))
            .route("/api/bookings/:id/cancel", patch(Self::handle_cancel_booking))
            .with_state(resources)
    }

    /// Handle GET /api/bookings/available-slots
    async fn handle_available_slots(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<AvailableSlotsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let query = query_params(query)?;
        let court_id = query
            .court_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(|| AppError::invalid_input("courtId is required"))?;
        let court_id = parse_id(court_id, "courtId")?;
        let date = query
            .date
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(|| AppError::invalid_date("date is required"))?;
        let date = parse_date(date)?;

        let as_objects = match query.format.as_deref().map(str::trim) {
            None | Some("" | "iso") => false,
            Some("object") => true,
            Some(other) => {
                return Err(AppError::invalid_input(format!(
                    "Unknown slot format '{other}' (expected iso or object)"
                )))
            }
        };

        let slots = resources
            .availability
            .available_slots(court_id, date)
            .await?;

        let body = if as_objects {
            let scheduling = resources.availability.scheduling();
            let objects: Vec<SlotObject> = slots
                .into_iter()
                .map(|start| SlotObject {
                    start: format_instant(&start),
                    hour: hour_label(start, scheduling),
                })
                .collect();
            json!({ "availableSlots": objects })
        } else {
            let starts: Vec<String> = slots.iter().map(format_instant).collect();
            json!({ "availableSlots": starts })
        };
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle POST /api/bookings/price-preview
    async fn handle_price_preview(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<PricePreviewBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = PriceQuoteRequest::try_from(json_body(payload)?)?;
        let breakdown = resources.pricing.preview(&request).await?;
        Ok((StatusCode::OK, Json(BreakdownResponse::from(breakdown))).into_response())
    }

    /// Handle POST /api/bookings
    async fn handle_create_booking(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<CreateBookingBody>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = CreateBookingRequest::try_from(json_body(payload)?)?;
        let booking = BookingResponse::from(resources.bookings.create_booking(request).await?);
        Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))).into_response())
    }

    /// Handle GET /api/bookings?userId=
    async fn handle_list_bookings(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<UserBookingsQuery>, QueryRejection>,
    ) -> Result<Response, AppError> {
        let query = query_params(query)?;
        let bookings: Vec<BookingResponse> = resources
            .bookings
            .list_user_bookings(query.user_id.as_deref().unwrap_or_default())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok((StatusCode::OK, Json(json!({ "bookings": bookings }))).into_response())
    }

    /// Handle GET /api/bookings/:id
    async fn handle_get_booking(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let booking = resources
            .bookings
            .get_booking(parse_id(&id, "bookingId")?)
            .await?;
        let booking = BookingResponse::from(booking);
        Ok((StatusCode::OK, Json(json!({ "booking": booking }))).into_response())
    }

    /// Handle PATCH /api/bookings/:id/cancel
    async fn handle_cancel_booking(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let booking = resources
            .bookings
            .cancel_booking(parse_id(&id, "bookingId")?)
            .await?;
        let booking = BookingResponse::from(booking);
        Ok((StatusCode::OK, Json(json!({ "booking": booking }))).into_response())
    }
}
