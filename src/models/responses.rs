use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::distance::GeoPoint;
use crate::core::matcher::MatchResult;
use crate::models::domain::{
    Account, BloodBank, BloodBankSummary, BloodRequest, Donation, Donor, DonorSummary, Hospital,
    RequestSummary,
};

/// Response for the stateless match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub matches: Vec<MatchResult<serde_json::Value>>,
    pub total_candidates: usize,
}

/// Response for nearby blood bank search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyBloodBanksResponse {
    pub success: bool,
    pub nearest_blood_banks: Vec<MatchResult<BloodBankSummary>>,
    /// True when nothing was inside the radius and the list ignores it
    pub search_expanded: bool,
    pub radius_km: f64,
    pub total_candidates: usize,
}

/// Response for nearby donor search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDonorsResponse {
    pub donors: Vec<MatchResult<DonorSummary>>,
    pub radius_km: f64,
    pub total_candidates: usize,
}

/// Urgent requests within a donor's service radius
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequestsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub requests: Vec<MatchResult<RequestSummary>>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_radius: Option<f64>,
}

impl IncomingRequestsResponse {
    /// Empty list with an explanation, used when the donor cannot be matched
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            requests: vec![],
            total: 0,
            donor_location: None,
            service_radius: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequestResponse {
    pub success: bool,
    pub message: String,
    pub request_id: Uuid,
    pub data: BloodRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequestResponse {
    pub message: String,
    pub request: BloodRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorRegistrationResponse {
    pub message: String,
    pub account: Account,
    pub donor: Donor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodBankRegistrationResponse {
    pub message: String,
    pub account: Account,
    pub blood_bank: BloodBank,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorResponse {
    pub message: String,
    pub donor: Donor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodBankResponse {
    pub message: String,
    pub blood_bank: BloodBank,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub message: String,
    pub account: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodRequestsResponse {
    pub requests: Vec<BloodRequest>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalRegistrationResponse {
    pub message: String,
    pub account: Account,
    pub hospital: Hospital,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalResponse {
    pub message: String,
    pub hospital: Hospital,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalsResponse {
    pub hospitals: Vec<Hospital>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub message: String,
    pub donation: Donation,
    /// The donor's running count after this donation
    pub total_donations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationsResponse {
    pub donations: Vec<Donation>,
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub records: DirectoryCounts,
}

/// Record counts held by the directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCounts {
    pub accounts: usize,
    pub donors: usize,
    pub blood_banks: usize,
    pub hospitals: usize,
    pub requests: usize,
    pub donations: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
