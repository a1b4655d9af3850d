use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{DonationResponse, DonationsQuery, DonationsResponse, RecordDonationRequest};
use crate::routes::{bad_request, directory_error_response, AppState};
use crate::services::NewDonation;

/// Configure donation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/donations", web::post().to(record_donation))
        .route("/donations", web::get().to(list_donations));
}

/// Record a completed donation at a blood bank
///
/// POST /api/v1/donations
async fn record_donation(
    state: web::Data<AppState>,
    req: web::Json<RecordDonationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let new = NewDonation {
        donor_id: req.donor_id,
        bloodbank_id: req.bloodbank_id,
        blood_type: req.blood_type,
        units_donated: req.units_donated,
    };

    match state.directory.record_donation(new) {
        Ok((donation, total_donations)) => HttpResponse::Created().json(DonationResponse {
            message: "Donation recorded successfully".to_string(),
            donation,
            total_donations,
        }),
        Err(e) => directory_error_response(e),
    }
}

/// Donation history, optionally for one donor or one blood bank
///
/// GET /api/v1/donations?donorId=...&bloodbankId=...
async fn list_donations(
    state: web::Data<AppState>,
    query: web::Query<DonationsQuery>,
) -> impl Responder {
    match state.directory.donations(query.donor_id, query.bloodbank_id) {
        Ok(donations) => {
            let total = donations.len();
            HttpResponse::Ok().json(DonationsResponse { donations, total })
        }
        Err(e) => directory_error_response(e),
    }
}
