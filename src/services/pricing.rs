// ABOUTME: Advisory price preview for a prospective booking
// ABOUTME: Lock-free reads of catalog, reservations and the active rule snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use super::catalog::CatalogService;
use crate::config::SchedulingConfig;
use crate::database::BookingsManager;
use crate::engine::{compute_breakdown, count_units, find_shortfall, PricingInput, TimeWindow};
use crate::errors::{AppError, AppResult};
use crate::models::{Equipment, PriceBreakdown, PriceQuoteRequest};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Prices prospective bookings without reserving anything
#[derive(Clone)]
pub struct PricingService {
    catalog: Arc<CatalogService>,
    pool: SqlitePool,
    scheduling: Arc<SchedulingConfig>,
}

impl PricingService {
    /// Create the service
    #[must_use]
    pub const fn new(
        catalog: Arc<CatalogService>,
        pool: SqlitePool,
        scheduling: Arc<SchedulingConfig>,
    ) -> Self {
        Self {
            catalog,
            pool,
            scheduling,
        }
    }

    /// Itemized price of `request` under the current active rules.
    ///
    /// # Errors
    ///
    /// - `INVALID_INPUT` when the window is empty or reversed
    /// - `RESOURCE_NOT_FOUND` for an unknown/inactive court or coach, or an unknown item
    /// - `EQUIPMENT_UNAVAILABLE` for an inactive item or one without enough free units
    /// - `COACH_UNAVAILABLE` when the coach is booked during the window
    pub async fn preview(&self, request: &PriceQuoteRequest) -> AppResult<PriceBreakdown> {
        if request.end_time <= request.start_time {
            return Err(AppError::invalid_input("endTime must be after startTime"));
        }
        let window = TimeWindow::new(request.start_time, request.end_time);

        let court = self.catalog.active_court(request.court_id).await?;

        let coach = match request.coach_id {
            Some(coach_id) => {
                let coach = self.catalog.active_coach(coach_id).await?;
                if BookingsManager::coach_overlap(&self.pool, coach_id, &window)
                    .await?
                    .is_some()
                {
                    return Err(AppError::coach_unavailable(format!(
                        "{} is already booked for this time",
                        coach.name
                    )));
                }
                Some(coach)
            }
            None => None,
        };

        let equipment = self.rented_units(&request.equipment_ids, &window).await?;
        let rules = self.catalog.active_rules().await?;

        compute_breakdown(&PricingInput {
            court: &court,
            window,
            equipment: &equipment,
            coach: coach.as_ref(),
            rules: &rules,
            scheduling: &self.scheduling,
        })
    }

    /// One catalog record per requested unit, after checking each item can cover its units
    async fn rented_units(
        &self,
        equipment_ids: &[Uuid],
        window: &TimeWindow,
    ) -> AppResult<Vec<Equipment>> {
        if equipment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let requested = count_units(equipment_ids);
        let mut items = HashMap::with_capacity(requested.len());
        for id in requested.keys() {
            let item = self
                .catalog
                .equipment(*id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Equipment {id}")))?;
            if !item.is_active {
                return Err(AppError::equipment_unavailable(format!(
                    "{} is no longer offered",
                    item.name
                )));
            }
            items.insert(*id, item);
        }

        let stock: HashMap<Uuid, u32> = items
            .iter()
            .map(|(id, item)| (*id, item.total_stock))
            .collect();
        let reserved = BookingsManager::reserved_units(&self.pool, window).await?;
        if let Some(shortfall) = find_shortfall(&requested, &stock, &reserved) {
            let name = items
                .get(&shortfall.equipment_id)
                .map_or("Equipment", |item| item.name.as_str());
            return Err(AppError::equipment_unavailable(format!(
                "{name}: {} requested, {} available",
                shortfall.requested,
                shortfall.remaining()
            )));
        }

        Ok(equipment_ids
            .iter()
            .filter_map(|id| items.get(id).cloned())
            .collect())
    }
}
