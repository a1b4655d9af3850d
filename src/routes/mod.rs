// Route exports
pub mod accounts;
pub mod bloodbanks;
pub mod donations;
pub mod donors;
pub mod emergency;
pub mod hospitals;
pub mod matches;
pub mod requests;

use actix_web::http::StatusCode;
use actix_web::{error, web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::matcher::{MatchError, ProximityMatcher};
use crate::models::{DomainError, ErrorResponse};
use crate::services::{Directory, DirectoryError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub matcher: ProximityMatcher,
    pub matching: MatchingSettings,
}

impl AppState {
    pub fn new(directory: Arc<Directory>, matching: MatchingSettings) -> Self {
        Self {
            directory,
            matcher: ProximityMatcher::new(),
            matching,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(emergency::configure)
            .configure(donors::configure)
            .configure(requests::configure)
            .configure(bloodbanks::configure)
            .configure(hospitals::configure)
            .configure(donations::configure)
            .configure(accounts::configure),
    );
}

/// Extractor configuration so malformed input gets the JSON error envelope
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .app_data(web::PathConfig::default().error_handler(handle_path_error));
}

/// JSON error response for extractor failures
#[derive(Debug)]
pub struct PayloadError(ErrorResponse);

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for PayloadError {}

impl error::ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

fn payload_error(error: &str, message: String) -> actix_web::Error {
    PayloadError(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
    .into()
}

fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    payload_error("invalid_json", format!("Invalid JSON: {}", err))
}

fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    payload_error("invalid_query", format!("Invalid query: {}", err))
}

fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    payload_error("invalid_path", format!("Invalid path: {}", err))
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn bad_request(error: &str, message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, error, message)
}

/// `InvalidQuery` is a caller mistake, never retried
pub(crate) fn match_error_response(err: MatchError) -> HttpResponse {
    tracing::info!("Rejected proximity query: {}", err);
    bad_request("Invalid query", err.to_string())
}

pub(crate) fn directory_error_response(err: DirectoryError) -> HttpResponse {
    let (status, error) = match &err {
        DirectoryError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        DirectoryError::Conflict(_) | DirectoryError::RoleAlreadyAssigned(_) => {
            (StatusCode::CONFLICT, "Conflict")
        }
        DirectoryError::Domain(DomainError::InvalidTransition { .. }) => {
            (StatusCode::CONFLICT, "Invalid status transition")
        }
        DirectoryError::InsufficientStock { .. } => (StatusCode::CONFLICT, "Insufficient stock"),
        DirectoryError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
        DirectoryError::Domain(_) | DirectoryError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "Invalid input")
        }
        DirectoryError::Poisoned | DirectoryError::Io(_) | DirectoryError::Seed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    };

    if status.is_server_error() {
        tracing::error!("Directory failure: {}", err);
    } else {
        tracing::debug!("Directory rejected request: {}", err);
    }

    error_response(status, error, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodType, RequestStatus};

    #[test]
    fn test_directory_error_status_codes() {
        let cases = vec![
            (DirectoryError::NotFound("donor".into()), StatusCode::NOT_FOUND),
            (DirectoryError::Conflict("email".into()), StatusCode::CONFLICT),
            (
                DirectoryError::Domain(DomainError::InvalidTransition {
                    from: RequestStatus::Accepted,
                    to: RequestStatus::Rejected,
                }),
                StatusCode::CONFLICT,
            ),
            (
                DirectoryError::Domain(DomainError::UnknownBloodType("C".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                DirectoryError::InsufficientStock {
                    blood_type: BloodType::ONegative,
                    available: 1,
                    required: 2,
                },
                StatusCode::CONFLICT,
            ),
            (DirectoryError::Forbidden("normal".into()), StatusCode::FORBIDDEN),
            (DirectoryError::Poisoned, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(directory_error_response(err).status(), expected);
        }
    }

    #[test]
    fn test_invalid_query_is_bad_request() {
        let response = match_error_response(MatchError::InvalidQuery("radius".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
