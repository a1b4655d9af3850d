use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::core::distance::GeoPoint;
use crate::models::{
    BloodRequestResponse, HospitalRegistrationResponse, HospitalResponse, HospitalsResponse,
    PatientRequestBody, RegisterHospitalRequest, UpdateHospitalRequest,
};
use crate::routes::{bad_request, directory_error_response, AppState};
use crate::services::{HospitalUpdate, NewHospital, NewPatientRequest};

/// Configure hospital routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/hospitals", web::post().to(register_hospital))
        .route("/hospitals", web::get().to(list_hospitals))
        .route("/hospitals/{id}", web::get().to(get_hospital))
        .route("/hospitals/{id}", web::put().to(update_hospital))
        .route(
            "/hospitals/{id}/patient-requests",
            web::post().to(create_patient_request),
        );
}

/// Register a hospital and its account
///
/// POST /api/v1/hospitals
async fn register_hospital(
    state: web::Data<AppState>,
    req: web::Json<RegisterHospitalRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let result = NewHospital::try_from(req.into_inner())
        .and_then(|new| state.directory.register_hospital(new));

    match result {
        Ok((account, hospital)) => HttpResponse::Created().json(HospitalRegistrationResponse {
            message: "Hospital created successfully".to_string(),
            account,
            hospital,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// GET /api/v1/hospitals
async fn list_hospitals(state: web::Data<AppState>) -> impl Responder {
    match state.directory.hospitals() {
        Ok(hospitals) => HttpResponse::Ok().json(HospitalsResponse { hospitals }),
        Err(e) => directory_error_response(e),
    }
}

/// GET /api/v1/hospitals/{id}
async fn get_hospital(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.directory.hospital(path.into_inner()) {
        Ok(hospital) => HttpResponse::Ok().json(HospitalResponse {
            message: "Hospital found".to_string(),
            hospital,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// Update a hospital profile
///
/// PUT /api/v1/hospitals/{id}
async fn update_hospital(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateHospitalRequest>,
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

    let update = HospitalUpdate {
        name: req.name,
        address: req.address,
        contact_number: req.contact_number,
        location,
    };

    match state.directory.update_hospital(path.into_inner(), update) {
        Ok(hospital) => HttpResponse::Ok().json(HospitalResponse {
            message: "Hospital updated successfully".to_string(),
            hospital,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// Raise a critical request for one of the hospital's patients
///
/// POST /api/v1/hospitals/{id}/patient-requests
///
/// The request is placed at the hospital's location and shows up in the
/// incoming feed of nearby critical-ready donors.
async fn create_patient_request(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<PatientRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let new = NewPatientRequest {
        blood_type: req.blood_type,
        units_required: req.units_required,
        patient_name: req.patient_name,
        patient_condition: req.patient_condition,
    };

    match state.directory.create_patient_request(path.into_inner(), new) {
        Ok(request) => HttpResponse::Created().json(BloodRequestResponse {
            message: "Patient request created successfully".to_string(),
            request,
        }),
        Err(e) => directory_error_response(e),
    }
}
