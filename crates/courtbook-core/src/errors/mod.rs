// ABOUTME: Unified error type and stable error codes for the reservation engine
// ABOUTME: Maps every failure kind to an HTTP status and a `{error, code}` response body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! # Unified Error Handling System
//!
//! Every failure surfaced by the engine carries a stable [`ErrorCode`] so that
//! clients can tell "someone else took this slot" apart from "bad input" and
//! "out of equipment". Internal failures are logged and returned opaquely.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Malformed or missing input
    InvalidInput = 3000,
    /// A date that is not a valid, non-past calendar date
    InvalidDate = 3001,

    // Resource Management (4000-4999)
    /// Stale, unknown or deactivated reference
    ResourceNotFound = 4000,
    /// Court slot already taken by a confirmed booking
    SlotConflict = 4100,
    /// Coach already booked for an overlapping window
    CoachConflict = 4101,
    /// Equipment stock exhausted for the requested window
    EquipmentExhausted = 4102,
    /// Preview-path: equipment inactive or over capacity
    EquipmentUnavailable = 4103,
    /// Preview-path: coach already booked for the window
    CoachUnavailable = 4104,

    // Configuration (6000-6999)
    /// Invalid or missing configuration
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// Database operation failed
    DatabaseError = 9001,
    /// Data serialization/deserialization failed
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidDate => 400,
            Self::ResourceNotFound => 404,
            Self::SlotConflict
            | Self::CoachConflict
            | Self::EquipmentExhausted
            | Self::EquipmentUnavailable
            | Self::CoachUnavailable => 409,
            Self::ConfigError
            | Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError => 500,
        }
    }

    /// Stable wire name of this code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidDate => "INVALID_DATE",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::SlotConflict => "SLOT_CONFLICT",
            Self::CoachConflict => "COACH_CONFLICT",
            Self::EquipmentExhausted => "EQUIPMENT_EXHAUSTED",
            Self::EquipmentUnavailable => "EQUIPMENT_UNAVAILABLE",
            Self::CoachUnavailable => "COACH_UNAVAILABLE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidDate => "The requested date is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::SlotConflict => "The requested slot is no longer available",
            Self::CoachConflict => "The coach is already booked for this time",
            Self::EquipmentExhausted => "Not enough equipment left for this time",
            Self::EquipmentUnavailable => "Requested equipment is unavailable",
            Self::CoachUnavailable => "Requested coach is unavailable",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the message of this error may be shown to the caller verbatim
    #[must_use]
    pub const fn is_user_facing(self) -> bool {
        self.http_status() < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Invalid or past date
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDate, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Court slot taken
    pub fn slot_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SlotConflict, message)
    }

    /// Coach double-booked at commit time
    pub fn coach_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CoachConflict, message)
    }

    /// Equipment stock exhausted at commit time
    pub fn equipment_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EquipmentExhausted, message)
    }

    /// Equipment unavailable during a preview
    pub fn equipment_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EquipmentUnavailable, message)
    }

    /// Coach unavailable during a preview
    pub fn coach_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CoachUnavailable, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response body: `{"error": "<message>", "code": "<KIND>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable error kind
    pub code: ErrorCode,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let message = if error.code.is_user_facing() {
            error.message.clone()
        } else {
            error.code.description().to_owned()
        };
        Self {
            error: message,
            code: error.code,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::SerializationError,
            format!("JSON processing failed: {error}"),
        )
        .with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::not_found("Record"),
            other => Self::database(format!("Database operation failed: {other}")).with_source(other),
        }
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_user_facing() {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        } else {
            tracing::error!(code = %self.code, error = %self, source = ?self.source, "Internal failure");
        }

        (status, axum::Json(ErrorResponse::from(&self))).into_response()
    }
}
