// ABOUTME: Resource catalog models: courts, coaches, and rentable equipment
// ABOUTME: Records are soft-deleted via their active flag so historical bookings stay resolvable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Court surface location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtType {
    /// Covered court
    Indoor,
    /// Open-air court
    Outdoor,
}

impl CourtType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Indoor => "indoor",
            Self::Outdoor => "outdoor",
        }
    }

    /// Parse from string representation, `None` for unknown values
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "indoor" => Some(Self::Indoor),
            "outdoor" => Some(Self::Outdoor),
            _ => None,
        }
    }
}

/// A bookable court
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Indoor or outdoor
    pub court_type: CourtType,
    /// Price per hour before rules are applied
    pub base_price: Decimal,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A coach who can be booked alongside a court
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Free-form specialization (e.g. "badminton")
    pub specialization: String,
    /// Fee per hour
    pub hourly_rate: Decimal,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Equipment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    /// Rackets
    Racket,
    /// Court shoes
    Shoes,
    /// Anything else
    #[default]
    Other,
}

impl EquipmentType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Racket => "racket",
            Self::Shoes => "shoes",
            Self::Other => "other",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "racket" => Self::Racket,
            "shoes" => Self::Shoes,
            _ => Self::Other,
        }
    }
}

/// Rentable equipment item.
///
/// `total_stock` is a capacity ceiling, not a live counter: units in use are
/// derived from confirmed bookings overlapping the window being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Category
    pub equipment_type: EquipmentType,
    /// Number of units owned
    pub total_stock: u32,
    /// Rental fee per unit per booking
    pub rental_price: Decimal,
    /// Soft-delete flag
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to create a court
#[derive(Debug, Clone)]
pub struct CreateCourtRequest {
    /// Display name
    pub name: String,
    /// Indoor or outdoor
    pub court_type: CourtType,
    /// Price per hour
    pub base_price: Decimal,
}

/// Request to create a coach
#[derive(Debug, Clone)]
pub struct CreateCoachRequest {
    /// Display name
    pub name: String,
    /// Free-form specialization
    pub specialization: String,
    /// Fee per hour
    pub hourly_rate: Decimal,
}

/// Request to create an equipment item
#[derive(Debug, Clone)]
pub struct CreateEquipmentRequest {
    /// Display name
    pub name: String,
    /// Category
    pub equipment_type: EquipmentType,
    /// Number of units owned
    pub total_stock: u32,
    /// Rental fee per unit
    pub rental_price: Decimal,
}
