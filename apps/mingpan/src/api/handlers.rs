//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Handlers only read the shared rule tables; none of them mutates state.

use super::{
    AppState,
    types::{
        ErrorResponse, HealthResponse, HourRequest, HouseQuery, PillarsRequest, RulesResponse,
        StarQuery, ZiweiRequest, ZiweiResponse,
    },
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mingpan_core::{ZiweiAnalyzer, analyze, basic_record, enhance, enhance_document};
use serde_json::Value;

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// RULES HANDLER
// =============================================================================

/// Entry counts of the loaded rule table.
pub async fn rules_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = RulesResponse {
        loaded: !state.tables.is_empty(),
        summary: state.tables.summary(),
    };

    (StatusCode::OK, Json(response))
}

// =============================================================================
// BAZI HANDLERS
// =============================================================================

/// Enhance a raw chart record.
///
/// The body is returned as an `{"error": ...}` document with status 422
/// when the record cannot be annotated.
pub async fn bazi_handler(
    State(state): State<AppState>,
    Json(document): Json<Value>,
) -> impl IntoResponse {
    let enhanced = enhance_document(&state.tables, document);
    let status = if enhanced.get("error").is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    (status, Json(enhanced))
}

/// Annotate a typed four-pillar chart, including the element census.
pub async fn bazi_pillars_handler(
    State(state): State<AppState>,
    Json(request): Json<PillarsRequest>,
) -> Response {
    let chart = match request.to_chart() {
        Ok(chart) => chart,
        Err(e) => return bad_request(e.into()),
    };

    match enhance(&state.tables, basic_record(&state.tables, &chart)) {
        Ok(enhanced) => (StatusCode::OK, Json(enhanced)).into_response(),
        Err(e) => {
            tracing::error!("Enhancing a typed chart failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::from(e))).into_response()
        }
    }
}

// =============================================================================
// HOUR HANDLER
// =============================================================================

/// Derive an hour pillar from the Day Master and a clock hour.
pub async fn hour_handler(Json(request): Json<HourRequest>) -> Response {
    match request.resolve() {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => bad_request(e.into()),
    }
}

// =============================================================================
// ZIWEI HANDLER
// =============================================================================

/// Comprehensive Zi Wei report plus optional star and palace queries.
pub async fn ziwei_handler(
    State(state): State<AppState>,
    Json(request): Json<ZiweiRequest>,
) -> impl IntoResponse {
    let analyzer = ZiweiAnalyzer::new(&request.astrolabe);

    let response = ZiweiResponse {
        report: analyzer.comprehensive(request.age, request.target_year),
        bazi: analyzer
            .bazi_chart()
            .map(|chart| analyze(&state.tables, &chart))
            .into(),
        star_query: request
            .star
            .as_deref()
            .map(|star| StarQuery::new(&analyzer, star)),
        house_query: request
            .house
            .as_deref()
            .map(|house| HouseQuery::new(&analyzer, house)),
    };

    (StatusCode::OK, Json(response))
}

fn bad_request(error: ErrorResponse) -> Response {
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}
