use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::distance::GeoPoint;
use crate::core::matcher::MatchQuery;
use crate::models::{
    EmergencyRequestBody, EmergencyRequestResponse, NearbyBloodBanksRequest,
    NearbyBloodBanksResponse, NearbyDonorsRequest, NearbyDonorsResponse,
};
use crate::routes::{bad_request, directory_error_response, match_error_response, AppState};
use crate::services::{CandidateSource, NewEmergencyRequest};

/// Configure emergency routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/emergency/nearby-bloodbanks", web::post().to(nearby_blood_banks))
        .route("/emergency/nearby-donors", web::post().to(nearby_donors))
        .route("/emergency/request", web::post().to(create_emergency_request));
}

/// Nearest blood banks to a requester
///
/// POST /api/v1/emergency/nearby-bloodbanks
///
/// Searches within the emergency radius first. If no bank is inside it the
/// nearest banks at any distance are returned with `searchExpanded: true`.
async fn nearby_blood_banks(
    state: web::Data<AppState>,
    req: web::Json<NearbyBloodBanksRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let origin = GeoPoint {
        latitude: req.latitude,
        longitude: req.longitude,
    };
    let radius_km = req.radius_km.unwrap_or(state.matching.emergency_radius_km);
    let query = MatchQuery::new(origin, radius_km, state.matching.effective_limit(req.limit));

    let pool = match state.directory.blood_banks(req.blood_type, req.in_stock_only) {
        Ok(pool) => pool,
        Err(e) => return directory_error_response(e),
    };
    let total_candidates = pool.len();

    let search = match state.matcher.find_nearest_with_fallback(&query, pool) {
        Ok(search) => search,
        Err(e) => return match_error_response(e),
    };

    if search.expanded {
        tracing::warn!(
            "No blood banks within {}km of ({}, {}), returning {} farther options",
            radius_km,
            origin.latitude,
            origin.longitude,
            search.results.len()
        );
    } else {
        tracing::info!(
            "Found {} blood banks within {}km (from {} candidates)",
            search.results.len(),
            radius_km,
            total_candidates
        );
    }

    HttpResponse::Ok().json(NearbyBloodBanksResponse {
        success: true,
        nearest_blood_banks: search.results,
        search_expanded: search.expanded,
        radius_km,
        total_candidates,
    })
}

/// Critical-ready donors of a blood type near a requester
///
/// POST /api/v1/emergency/nearby-donors
async fn nearby_donors(
    state: web::Data<AppState>,
    req: web::Json<NearbyDonorsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let origin = GeoPoint {
        latitude: req.latitude,
        longitude: req.longitude,
    };
    let radius_km = req.radius_km.unwrap_or(state.matching.emergency_radius_km);
    let query = MatchQuery::new(origin, radius_km, state.matching.effective_limit(req.limit));

    let pool = match state.directory.critical_donors(req.blood_type) {
        Ok(pool) => pool,
        Err(e) => return directory_error_response(e),
    };
    let total_candidates = pool.len();

    match state.matcher.find_nearby(&query, pool) {
        Ok(donors) => {
            tracing::info!(
                "Found {} {} donors within {}km (from {} opted in)",
                donors.len(),
                req.blood_type,
                radius_km,
                total_candidates
            );
            HttpResponse::Ok().json(NearbyDonorsResponse {
                donors,
                radius_km,
                total_candidates,
            })
        }
        Err(e) => match_error_response(e),
    }
}

/// Create emergency blood request
///
/// POST /api/v1/emergency/request
async fn create_emergency_request(
    state: web::Data<AppState>,
    req: web::Json<EmergencyRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let location = match (req.latitude, req.longitude) {
        (Some(latitude), Some(longitude)) => match GeoPoint::new(latitude, longitude) {
            Ok(point) => Some(point),
            Err(e) => return bad_request("Invalid location", e.to_string()),
        },
        (None, None) => None,
        _ => {
            return bad_request(
                "Invalid location",
                "latitude and longitude must be provided together",
            )
        }
    };

    let new = NewEmergencyRequest {
        requested_by: req.requested_by,
        bloodbank_id: req.selected_blood_bank_id,
        blood_type: req.blood_type,
        units_required: req.units_required,
        urgency: req.urgency.unwrap_or_default(),
        patient_name: req.patient_name,
        contact_mobile: req.contact_number,
        hospital_location: req.hospital_location,
        location,
        emergency_details: req.emergency_details,
    };

    match state.directory.create_emergency_request(new) {
        Ok(request) => HttpResponse::Ok().json(EmergencyRequestResponse {
            success: true,
            message: "Emergency blood request submitted successfully".to_string(),
            request_id: request.id,
            data: request,
        }),
        Err(e) => directory_error_response(e),
    }
}
