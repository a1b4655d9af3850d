use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    BankRequestsQuery, BloodBankRegistrationResponse, BloodBankResponse, BloodRequestsResponse,
    InventoryUpdateRequest, RegisterBloodBankRequest,
};
use crate::routes::{bad_request, directory_error_response, AppState};
use crate::services::NewBloodBank;

/// Configure blood bank routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/bloodbanks", web::post().to(register_blood_bank))
        .route("/bloodbanks/{id}/inventory", web::put().to(update_inventory))
        .route("/bloodbanks/{id}/requests", web::get().to(list_bank_requests));
}

/// Register a blood bank and its admin account
///
/// POST /api/v1/bloodbanks
async fn register_blood_bank(
    state: web::Data<AppState>,
    req: web::Json<RegisterBloodBankRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let result = NewBloodBank::try_from(req.into_inner())
        .and_then(|new| state.directory.register_blood_bank(new));

    match result {
        Ok((account, blood_bank)) => {
            HttpResponse::Created().json(BloodBankRegistrationResponse {
                message: "Blood bank created successfully".to_string(),
                account,
                blood_bank,
            })
        }
        Err(e) => directory_error_response(e),
    }
}

/// Set the stock level for one blood type
///
/// PUT /api/v1/bloodbanks/{id}/inventory
async fn update_inventory(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<InventoryUpdateRequest>,
) -> impl Responder {
    match state
        .directory
        .set_inventory(path.into_inner(), req.blood_type, req.units_available)
    {
        Ok(blood_bank) => HttpResponse::Ok().json(BloodBankResponse {
            message: "Inventory updated".to_string(),
            blood_bank,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// Requests filed with a blood bank, newest first
///
/// GET /api/v1/bloodbanks/{id}/requests?status=pending&requestType=normal
async fn list_bank_requests(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<BankRequestsQuery>,
) -> impl Responder {
    let query = query.into_inner();

    match state
        .directory
        .requests_for_bank(path.into_inner(), query.status, query.request_type)
    {
        Ok(requests) => {
            let total = requests.len();
            HttpResponse::Ok().json(BloodRequestsResponse { requests, total })
        }
        Err(e) => directory_error_response(e),
    }
}
