use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::matcher::Candidate;
use crate::models::domain::{AccountCredential, BloodType, RequestStatus, RequestType, Urgency};

/// Stateless match over a caller-supplied candidate pool
///
/// POST /api/v1/match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub radius_km: f64,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub candidates: Vec<Candidate<serde_json::Value>>,
}

/// Blood banks near a requester
///
/// POST /api/v1/emergency/nearby-bloodbanks
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NearbyBloodBanksRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub in_stock_only: bool,
}

/// Critical-ready donors near a requester
///
/// POST /api/v1/emergency/nearby-donors
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDonorsRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub blood_type: BloodType,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Emergency blood request
///
/// POST /api/v1/emergency/request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequestBody {
    pub requested_by: Uuid,
    #[validate(length(min = 1))]
    pub patient_name: String,
    #[validate(length(min = 1))]
    pub contact_number: String,
    pub blood_type: BloodType,
    #[validate(range(min = 1))]
    pub units_required: u32,
    #[validate(length(min = 1))]
    pub hospital_location: String,
    #[validate(length(min = 1))]
    pub emergency_details: String,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
    pub selected_blood_bank_id: Uuid,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

/// PUT /api/v1/requests/{id}/status
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRequestStatusBody {
    #[validate(length(min = 1))]
    pub status: String,
}

/// Donor registration
///
/// POST /api/v1/donors
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDonorRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub mobile_number: String,
    pub blood_type: BloodType,
    #[validate(length(min = 1))]
    pub emergency_contact_mobile: String,
    #[validate(range(min = 18, max = 65))]
    #[serde(default)]
    pub age: Option<u8>,
    #[validate(range(min = 45.0))]
    #[serde(default)]
    pub weight_kg: Option<f64>,
    pub credential: AccountCredential,
}

/// Blood bank registration
///
/// POST /api/v1/bloodbanks
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBloodBankRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1))]
    pub contact_number: String,
    #[validate(email)]
    pub email: String,
    pub credential: AccountCredential,
}

/// Donor opt-in for emergency matching
///
/// PUT /api/v1/donors/{id}/critical-status
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CriticalStatusRequest {
    pub is_critical_ready: bool,
    #[validate(range(min = 0.1, max = 500.0))]
    #[serde(default)]
    pub critical_service_radius_km: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Forget the stored location
    #[serde(default)]
    pub clear_location: bool,
}

/// PUT /api/v1/bloodbanks/{id}/inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdateRequest {
    pub blood_type: BloodType,
    pub units_available: u32,
}

/// PUT /api/v1/accounts/{id}/role
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoleSelectionRequest {
    #[validate(length(min = 1))]
    pub role: String,
}

/// Hospital registration
///
/// POST /api/v1/hospitals
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterHospitalRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1))]
    pub contact_number: String,
    #[validate(email)]
    pub email: String,
    pub credential: AccountCredential,
}

/// Partial hospital profile update; absent fields are kept
///
/// PUT /api/v1/hospitals/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHospitalRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub address: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub contact_number: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A hospital asking nearby donors for blood for one of its patients
///
/// POST /api/v1/hospitals/{id}/patient-requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequestBody {
    pub blood_type: BloodType,
    #[validate(range(min = 1))]
    pub units_required: u32,
    #[validate(length(min = 1))]
    pub patient_name: String,
    #[serde(default)]
    pub patient_condition: Option<String>,
}

/// Blood request filed with a blood bank
///
/// POST /api/v1/requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequestBody {
    pub requested_by: Uuid,
    pub bloodbank_id: Uuid,
    pub blood_type: BloodType,
    #[validate(range(min = 1))]
    pub units_required: u32,
    /// Defaults to `normal` for hospitals and `emergency` for everyone else
    #[serde(default)]
    pub request_type: Option<RequestType>,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub patient_name: Option<String>,
    #[validate(length(min = 1))]
    #[serde(default)]
    pub contact_mobile: Option<String>,
}

/// GET /api/v1/bloodbanks/{id}/requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankRequestsQuery {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub request_type: Option<RequestType>,
}

/// POST /api/v1/donations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordDonationRequest {
    pub donor_id: Uuid,
    pub bloodbank_id: Uuid,
    pub blood_type: BloodType,
    #[validate(range(min = 1))]
    pub units_donated: u32,
}

/// GET /api/v1/donations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationsQuery {
    #[serde(default)]
    pub donor_id: Option<Uuid>,
    #[serde(default)]
    pub bloodbank_id: Option<Uuid>,
}
