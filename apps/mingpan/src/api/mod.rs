//! # Mingpan HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /rules` - Rule table entry counts
//! - `POST /bazi` - Enhance a raw chart record
//! - `POST /bazi/pillars` - Annotate a typed four-pillar chart
//! - `POST /hour` - Derive an hour pillar
//! - `POST /ziwei` - Zi Wei Dou Shu report for a pre-computed astrolabe
//!
//! ## Security Configuration
//!
//! - `MINGPAN_CORS_ORIGINS` / `[server] cors_origins`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `MINGPAN_RATE_LIMIT` / `[server] rate_limit`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `mingpan::api::*`)
pub use handlers::{
    bazi_handler, bazi_pillars_handler, health_handler, hour_handler, rules_handler,
    ziwei_handler,
};
pub use types::{
    ErrorResponse, HealthResponse, HourRequest, HourResponse, HouseQuery, PillarsRequest,
    RulesResponse, StarQuery, ZiweiRequest, ZiweiResponse,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use mingpan_core::{MingpanError, RuleTables};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (256 KB). Astrolabes are the largest bodies.
const MAX_BODY_BYTES: usize = 256 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the rule tables, loaded once at startup.
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<RuleTables>,
}

impl AppState {
    #[must_use]
    pub fn new(tables: Arc<RuleTables>) -> Self {
        Self { tables }
    }
}

/// Router options that are not part of the shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiOptions {
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    pub cors_origins: Option<String>,
}

impl ApiOptions {
    /// Options from `MINGPAN_RATE_LIMIT` and `MINGPAN_CORS_ORIGINS`.
    pub fn from_env() -> Self {
        Self {
            rate_limit: get_rate_limit_from_env(),
            cors_origins: std::env::var("MINGPAN_CORS_ORIGINS").ok(),
        }
    }
}

impl From<&ServerConfig> for ApiOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            rate_limit: config.rate_limit,
            cors_origins: config.cors_origins.clone(),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer.
///
/// - "*": allows all origins
/// - unset: localhost only
/// - otherwise: the comma-separated list of origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", origin);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router with options taken from the environment.
pub fn create_router(state: AppState) -> Router {
    create_router_with(state, &ApiOptions::from_env())
}

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
pub fn create_router_with(state: AppState, options: &ApiOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/rules", get(handlers::rules_handler))
        .route("/bazi", post(handlers::bazi_handler))
        .route("/bazi/pillars", post(handlers::bazi_pillars_handler))
        .route("/hour", post(handlers::hour_handler))
        .route("/ziwei", post(handlers::ziwei_handler));

    if options.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            options.rate_limit
        );
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(options.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(options.cors_origins.as_deref()))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server; returns after Ctrl+C.
pub async fn run_server(
    addr: &str,
    state: AppState,
    options: &ApiOptions,
) -> Result<(), MingpanError> {
    let router = create_router_with(state, options);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MingpanError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Mingpan HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MingpanError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
