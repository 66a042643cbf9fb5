// ABOUTME: JSON wire conventions shared by every route: money as numbers, ids, timestamps
// ABOUTME: Extractor rejections are turned into the standard {error, code} body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! Wire helpers
//!
//! Money is a [`Decimal`] everywhere inside the engine. On the wire it is a
//! plain JSON number (the frontend calls `toFixed(2)` on it); on input both
//! numbers and numeric strings are accepted.

use crate::errors::{AppError, AppResult};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Unwrap a JSON body, reporting malformed payloads as `INVALID_INPUT`
///
/// # Errors
///
/// Returns `INVALID_INPUT` carrying the extractor's explanation
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Unwrap a query string, reporting malformed parameters as `INVALID_INPUT`
///
/// # Errors
///
/// Returns `INVALID_INPUT` carrying the extractor's explanation
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::invalid_input(rejection.body_text()))
}

/// Parse a record id taken from the path or a body field
///
/// # Errors
///
/// Returns `INVALID_INPUT` naming `field` when `raw` is not a UUID
pub fn parse_id(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::invalid_input(format!("{field} '{raw}' is not a valid id")))
}

/// Optional id where the frontend sends `""` or `null` for "none"
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a non-empty value that is not a UUID
pub fn parse_optional_id(raw: Option<&str>, field: &str) -> AppResult<Option<Uuid>> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_id(value, field))
        .transpose()
}

/// Parse an RFC 3339 instant (any offset) into UTC
///
/// # Errors
///
/// Returns `INVALID_INPUT` naming `field` for anything else
pub fn parse_instant(raw: &str, field: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| {
            AppError::invalid_input(format!("{field} '{raw}' is not an ISO-8601 timestamp"))
        })
}

/// ISO-8601 with millisecond precision and a `Z` suffix
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter: [`Decimal`] as a JSON number out, number or numeric string in
pub mod money {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    /// Serialize as an `f64` JSON number
    ///
    /// # Errors
    ///
    /// Propagates serializer errors
    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(amount.to_f64().unwrap_or_default())
    }

    /// Deserialize from a JSON number or a numeric string
    ///
    /// # Errors
    ///
    /// Fails for values that are not decimal numbers
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(number) => number.to_string(),
            Raw::Text(text) => text,
        };
        let text = text.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| de::Error::custom(format!("'{text}' is not a valid amount")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Serialize};
    use std::str::FromStr;

    #[derive(Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "money")]
        amount: Decimal,
    }

    #[test]
    fn test_money_accepts_numbers_and_strings() {
        let from_number: Priced = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        let from_text: Priced = serde_json::from_str(r#"{"amount": "12.50"}"#).unwrap();
        assert_eq!(from_number.amount, from_text.amount);

        let tenth: Priced = serde_json::from_str(r#"{"amount": 0.1}"#).unwrap();
        assert_eq!(tenth.amount, Decimal::from_str("0.1").unwrap());

        assert!(serde_json::from_str::<Priced>(r#"{"amount": "ten"}"#).is_err());
    }

    #[test]
    fn test_money_serializes_as_number() {
        let json = serde_json::to_value(Priced {
            amount: Decimal::from_str("30.00").unwrap(),
        })
        .unwrap();
        assert_eq!(json["amount"], serde_json::json!(30.0));
    }

    #[test]
    fn test_blank_optional_id_means_none() {
        assert_eq!(parse_optional_id(Some(""), "coachId").unwrap(), None);
        assert_eq!(parse_optional_id(None, "coachId").unwrap(), None);
        assert!(parse_optional_id(Some("nope"), "coachId").is_err());
    }

    #[test]
    fn test_instants_accept_offsets() {
        let instant = parse_instant("2025-06-07T12:00:00+02:00", "startTime").unwrap();
        assert_eq!(format_instant(&instant), "2025-06-07T10:00:00.000Z");
    }
}
