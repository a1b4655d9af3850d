use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::distance::GeoPoint;
use crate::core::filters::service_radius_km;
use crate::core::matcher::MatchQuery;
use crate::models::{
    CriticalStatusRequest, DonorRegistrationResponse, DonorResponse, IncomingRequestsResponse,
    RegisterDonorRequest,
};
use crate::routes::{bad_request, directory_error_response, match_error_response, AppState};
use crate::services::{CandidateSource, CriticalStatusUpdate, LocationUpdate};

/// Configure donor routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/donors", web::post().to(register_donor))
        .route("/donors/{id}/incoming-requests", web::get().to(incoming_requests))
        .route("/donors/{id}/critical-status", web::put().to(update_critical_status));
}

/// Register a donor and its account
///
/// POST /api/v1/donors
async fn register_donor(
    state: web::Data<AppState>,
    req: web::Json<RegisterDonorRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    match state.directory.register_donor(req.into_inner().into()) {
        Ok((account, donor)) => HttpResponse::Created().json(DonorRegistrationResponse {
            message: "Donor registered successfully".to_string(),
            account,
            donor,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// Urgent requests near a donor
///
/// GET /api/v1/donors/{id}/incoming-requests
///
/// Only donors who opted into critical service and have a location see
/// anything. Requests for the donor's blood type within their service radius
/// are returned nearest first; `total` counts every request in range.
async fn incoming_requests(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let donor_id = path.into_inner();

    let donor = match state.directory.donor(donor_id) {
        Ok(donor) => donor,
        Err(e) => return directory_error_response(e),
    };

    if !donor.is_critical_ready {
        return HttpResponse::Ok().json(IncomingRequestsResponse::empty(
            "Critical service is disabled",
        ));
    }

    let Some(location) = donor.location.filter(GeoPoint::is_locatable) else {
        return HttpResponse::Ok().json(IncomingRequestsResponse::empty("Location not set"));
    };

    let radius_km = service_radius_km(&donor, state.matching.default_service_radius_km);

    let pool = match state.directory.urgent_requests(donor.blood_type) {
        Ok(pool) => pool,
        Err(e) => return directory_error_response(e),
    };

    // Rank the whole pool so `total` reflects everything in range
    let query = MatchQuery::new(location, radius_km, pool.len().max(1));
    let mut requests = match state.matcher.find_nearby(&query, pool) {
        Ok(requests) => requests,
        Err(e) => return match_error_response(e),
    };
    let total = requests.len();
    requests.truncate(state.matching.incoming_requests_limit);

    tracing::debug!(
        "Donor {} has {} urgent requests within {}km",
        donor_id,
        total,
        radius_km
    );

    HttpResponse::Ok().json(IncomingRequestsResponse {
        message: None,
        requests,
        total,
        donor_location: Some(location),
        service_radius: Some(radius_km),
    })
}

/// Update a donor's emergency opt-in, radius and location
///
/// PUT /api/v1/donors/{id}/critical-status
async fn update_critical_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CriticalStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let location = if req.clear_location {
        LocationUpdate::Clear
    } else {
        match (req.latitude, req.longitude) {
            (Some(latitude), Some(longitude)) => match GeoPoint::new(latitude, longitude) {
                Ok(point) => LocationUpdate::Set(point),
                Err(e) => return bad_request("Invalid location", e.to_string()),
            },
            (None, None) => LocationUpdate::Keep,
            _ => {
                return bad_request(
                    "Invalid location",
                    "latitude and longitude must be provided together",
                )
            }
        }
    };

    let update = CriticalStatusUpdate {
        is_critical_ready: req.is_critical_ready,
        critical_service_radius_km: req.critical_service_radius_km,
        location,
    };

    match state.directory.update_critical_status(path.into_inner(), update) {
        Ok(donor) => HttpResponse::Ok().json(DonorResponse {
            message: "Critical service settings updated".to_string(),
            donor,
        }),
        Err(e) => directory_error_response(e),
    }
}
