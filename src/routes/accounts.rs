use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AccountResponse, Role, RoleSelectionRequest};
use crate::routes::{bad_request, directory_error_response, AppState};

/// Configure account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/accounts/{id}/role", web::put().to(select_role));
}

/// Role selection
///
/// PUT /api/v1/accounts/{id}/role
///
/// Request body:
/// ```json
/// { "role": "user|bloodbank_admin|hospital" }
/// ```
async fn select_role(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<RoleSelectionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let role: Role = match req.role.parse() {
        Ok(role) => role,
        Err(e) => {
            return bad_request(
                "Invalid role",
                format!("{}; role must be one of: user, bloodbank_admin, hospital", e),
            )
        }
    };

    match state.directory.assign_role(path.into_inner(), role) {
        Ok(account) => HttpResponse::Ok().json(AccountResponse {
            message: format!("Role set to {}", account.role),
            account,
        }),
        Err(e) => directory_error_response(e),
    }
}
