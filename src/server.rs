// ABOUTME: HTTP server assembly: route merging, the middleware stack and graceful serving
// ABOUTME: Request ids, trace spans, request logging, timeouts, body limits and CORS wrap every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! # Server
//!
//! Middleware order, outermost first:
//!
//! 1. `x-request-id` assignment (kept when the caller supplies one)
//! 2. trace span carrying method, path and request id
//! 3. request id echoed on the response
//! 4. one structured log line per request
//! 5. request body size limit
//! 6. request timeout (408)
//! 7. CORS

use crate::constants::network::MAX_REQUEST_BODY_BYTES;
use crate::errors::{AppError, AppResult};
use crate::middleware::{log_requests, setup_cors, trace_layer, MakeRequestUuid, REQUEST_ID_HEADER};
use crate::resources::ServerResources;
use crate::routes::{BookingRoutes, CatalogRoutes, HealthRoutes};
use axum::http::{StatusCode, Uri};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// The booking API server
pub struct CourtbookServer {
    resources: Arc<ServerResources>,
}

impl CourtbookServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Full application router with every middleware applied
    #[must_use]
    pub fn router(&self) -> Router {
        let config = &self.resources.config;

        Router::new()
            .merge(HealthRoutes::routes(self.resources.clone()))
            .merge(CatalogRoutes::routes(self.resources.clone()))
            .merge(BookingRoutes::routes(self.resources.clone()))
            .fallback(handle_unknown_route)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                    .layer(trace_layer())
                    .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
                    .layer(axum::middleware::from_fn(log_requests))
                    .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        config.http.request_timeout,
                    ))
                    .layer(setup_cors(&config.http)),
            )
    }

    /// Bind and serve until `shutdown` resolves, then drain in-flight requests
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let config = &self.resources.config;
        let address = format!("{}:{}", config.host, config.http_port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {address}: {e}")))?;

        info!("HTTP server listening on http://{address}");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_unknown_route(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {}", uri.path()))
}
