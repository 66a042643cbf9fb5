// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness plus a database ping so load balancers drop an instance that lost its store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

use crate::constants::endpoints::HEALTH_CHECK;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::warn;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(HEALTH_CHECK, get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health
    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
        let timestamp = resources.clock.now().to_rfc3339();
        match resources.database.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "healthy",
                    "database": "ok",
                    "timestamp": timestamp,
                })),
            )
                .into_response(),
            Err(e) => {
                warn!(error = %e, "Health check failed: database unreachable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(serde_json::json!({
                        "status": "unhealthy",
                        "database": "unreachable",
                        "timestamp": timestamp,
                    })),
                )
                    .into_response()
            }
        }
    }
}
