use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    BloodRequestResponse, CreateBloodRequestBody, RequestStatus, RequestType,
    UpdateRequestStatusBody,
};
use crate::routes::{bad_request, directory_error_response, AppState};
use crate::services::NewBloodRequest;

/// Configure blood request routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/requests", web::post().to(create_blood_request))
        .route("/requests/{id}/status", web::put().to(update_request_status));
}

/// File a request with a blood bank
///
/// POST /api/v1/requests
///
/// Hospitals default to `normal` requests, everyone else to `emergency`.
/// Only hospitals may file `normal` requests.
async fn create_blood_request(
    state: web::Data<AppState>,
    req: web::Json<CreateBloodRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let new = NewBloodRequest {
        requested_by: req.requested_by,
        bloodbank_id: req.bloodbank_id,
        blood_type: req.blood_type,
        units_required: req.units_required,
        request_type: req.request_type,
        patient_name: req.patient_name,
        contact_mobile: req.contact_mobile,
    };

    match state.directory.create_blood_request(new) {
        Ok(request) => {
            let kind = match request.request_type {
                RequestType::Normal => "Normal",
                RequestType::Emergency => "Emergency",
            };
            HttpResponse::Created().json(BloodRequestResponse {
                message: format!("{} request created successfully", kind),
                request,
            })
        }
        Err(e) => directory_error_response(e),
    }
}

/// Accept or reject a pending request
///
/// PUT /api/v1/requests/{id}/status
async fn update_request_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateRequestStatusBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let status: RequestStatus = match req.status.parse() {
        Ok(status) => status,
        Err(e) => return bad_request("Invalid status", format!("{}", e)),
    };

    match state.directory.update_request_status(path.into_inner(), status) {
        Ok(request) => HttpResponse::Ok().json(BloodRequestResponse {
            message: format!("Request {}", request.status),
            request,
        }),
        Err(e) => directory_error_response(e),
    }
}
