// ABOUTME: Booking records and the inbound booking / price-quote requests
// ABOUTME: A confirmed booking holds its court, coach and equipment for [start_time, end_time)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::pricing::PriceBreakdown;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Holds its resources
    #[default]
    Confirmed,
    /// Released; no longer blocks anything
    Cancelled,
}

impl BookingStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => Self::Cancelled,
            _ => Self::Confirmed,
        }
    }
}

/// A committed reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: Uuid,
    /// Opaque caller-supplied user id
    pub user_id: String,
    /// Contact name
    pub user_name: String,
    /// Contact email
    pub user_email: String,
    /// Reserved court
    pub court_id: Uuid,
    /// Inclusive start instant
    pub start_time: DateTime<Utc>,
    /// Exclusive end instant
    pub end_time: DateTime<Utc>,
    /// Rented equipment; each occurrence is one unit
    pub equipment_ids: Vec<Uuid>,
    /// Optional coach
    pub coach_id: Option<Uuid>,
    /// Price snapshot taken at commit time
    pub price_breakdown: PriceBreakdown,
    /// Lifecycle state
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Set when the booking is cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Validated request to commit a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingRequest {
    /// Opaque user id
    pub user_id: String,
    /// Contact name
    pub user_name: String,
    /// Contact email
    pub user_email: String,
    /// Court to reserve
    pub court_id: Uuid,
    /// Operating-calendar date the slot belongs to, when supplied
    pub date: Option<NaiveDate>,
    /// Inclusive start instant
    pub start_time: DateTime<Utc>,
    /// Exclusive end instant
    pub end_time: DateTime<Utc>,
    /// Equipment units to rent
    pub equipment_ids: Vec<Uuid>,
    /// Optional coach
    pub coach_id: Option<Uuid>,
}

/// Request to price a prospective booking without committing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuoteRequest {
    /// Court to price
    pub court_id: Uuid,
    /// Inclusive start instant
    pub start_time: DateTime<Utc>,
    /// Exclusive end instant
    pub end_time: DateTime<Utc>,
    /// Equipment units to rent
    pub equipment_ids: Vec<Uuid>,
    /// Optional coach
    pub coach_id: Option<Uuid>,
}

impl From<&CreateBookingRequest> for PriceQuoteRequest {
    fn from(request: &CreateBookingRequest) -> Self {
        Self {
            court_id: request.court_id,
            start_time: request.start_time,
            end_time: request.end_time,
            equipment_ids: request.equipment_ids.clone(),
            coach_id: request.coach_id,
        }
    }
}
