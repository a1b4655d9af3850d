use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::distance::GeoPoint;
use crate::core::matcher::MatchQuery;
use crate::models::{HealthResponse, MatchRequest, MatchResponse};
use crate::routes::{bad_request, directory_error_response, match_error_response, AppState};

/// Configure health and stateless matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/match", web::post().to(find_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    match state.directory.counts() {
        Ok(records) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            records,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// Find matches endpoint
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "latitude": 12.9716,
///   "longitude": 77.5946,
///   "radiusKm": 25,
///   "limit": 10,
///   "candidates": [
///     { "id": "string", "location": { "latitude": 0.0, "longitude": 0.0 }, "payload": {} }
///   ]
/// }
/// ```
async fn find_matches(state: web::Data<AppState>, req: web::Json<MatchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let origin = GeoPoint {
        latitude: req.latitude,
        longitude: req.longitude,
    };
    let query = MatchQuery::new(origin, req.radius_km, state.matching.effective_limit(req.limit));
    let total_candidates = req.candidates.len();

    tracing::debug!(
        "Matching {} candidates within {}km of ({}, {})",
        total_candidates,
        query.radius_km,
        origin.latitude,
        origin.longitude
    );

    match state.matcher.find_nearby(&query, req.candidates) {
        Ok(matches) => HttpResponse::Ok().json(MatchResponse {
            matches,
            total_candidates,
        }),
        Err(e) => match_error_response(e),
    }
}
