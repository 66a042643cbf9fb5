// ABOUTME: Court operating window, fixed UTC offset and holiday calendar
// ABOUTME: All slot arithmetic is done against this fixed offset, never a DST-aware zone
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::environment::{env_var_or, parse_env};
use crate::constants::scheduling::{DEFAULT_CLOSE_HOUR, DEFAULT_OPEN_HOUR};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::BTreeSet;

/// Operating calendar of the facility
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingConfig {
    /// First bookable hour (local)
    pub open_hour: u32,
    /// Closing hour (local); the last slot starts one hour earlier
    pub close_hour: u32,
    /// Fixed offset of the operating timezone
    pub utc_offset: FixedOffset,
    /// Dates on which `holiday` pricing rules match
    pub holidays: BTreeSet<NaiveDate>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            open_hour: DEFAULT_OPEN_HOUR,
            close_hour: DEFAULT_CLOSE_HOUR,
            utc_offset: Utc.fix(),
            holidays: BTreeSet::new(),
        }
    }
}

impl SchedulingConfig {
    /// Build a validated calendar
    ///
    /// # Errors
    ///
    /// Returns a configuration error when hours fall outside `0..=24`, the
    /// window is inverted, or the offset is out of range
    pub fn new(open_hour: u32, close_hour: u32, utc_offset_minutes: i32) -> AppResult<Self> {
        if open_hour > 24 || close_hour > 24 {
            return Err(AppError::config(format!(
                "Operating hours must be within 0..=24 (got {open_hour}..{close_hour})"
            )));
        }
        if open_hour > close_hour {
            return Err(AppError::config(format!(
                "COURT_OPEN_HOUR ({open_hour}) must not be after COURT_CLOSE_HOUR ({close_hour})"
            )));
        }
        let utc_offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .ok_or_else(|| {
                AppError::config(format!(
                    "COURT_UTC_OFFSET_MINUTES out of range: {utc_offset_minutes}"
                ))
            })?;

        Ok(Self {
            open_hour,
            close_hour,
            utc_offset,
            holidays: BTreeSet::new(),
        })
    }

    /// Add holiday dates
    #[must_use]
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    /// Load from `COURT_OPEN_HOUR`, `COURT_CLOSE_HOUR`, `COURT_UTC_OFFSET_MINUTES` and `HOLIDAYS`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid hours, offsets or holiday dates
    pub fn from_env() -> AppResult<Self> {
        let config = Self::new(
            parse_env("COURT_OPEN_HOUR", DEFAULT_OPEN_HOUR)?,
            parse_env("COURT_CLOSE_HOUR", DEFAULT_CLOSE_HOUR)?,
            parse_env("COURT_UTC_OFFSET_MINUTES", 0)?,
        )?;
        Ok(config.with_holidays(parse_holidays(&env_var_or("HOLIDAYS", ""))?))
    }

    /// Calendar date of `instant` in the operating timezone
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.utc_offset).date_naive()
    }

    /// Whether `date` is in the configured holiday calendar
    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}

/// Parse a comma-separated list of `YYYY-MM-DD` dates
fn parse_holidays(raw: &str) -> AppResult<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| AppError::config(format!("Invalid HOLIDAYS entry '{s}': {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_window() {
        assert!(SchedulingConfig::new(22, 6, 0).is_err());
        assert!(SchedulingConfig::new(6, 25, 0).is_err());
        assert!(SchedulingConfig::new(8, 8, 0).is_ok());
    }

    #[test]
    fn test_local_date_uses_offset() {
        let config = SchedulingConfig::new(6, 22, 120).unwrap();
        let instant = DateTime::parse_from_rfc3339("2025-03-01T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            config.local_date(instant),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_parse_holidays() {
        let dates = parse_holidays("2025-12-25, 2026-01-01,").unwrap();
        assert_eq!(dates.len(), 2);
        assert!(parse_holidays("christmas").is_err());
    }
}
