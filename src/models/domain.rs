use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::core::distance::GeoPoint;

/// Errors raised by domain value parsing and state changes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Unknown blood type: {0}")]
    UnknownBloodType(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown request status: {0}")]
    UnknownStatus(String),

    #[error("Cannot move request from {from} to {to}")]
    InvalidTransition { from: RequestStatus, to: RequestStatus },
}

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        BloodType::ALL
            .into_iter()
            .find(|bt| bt.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownBloodType(s.to_string()))
    }
}

/// Account role; every account starts out `Unassigned` until role selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Unassigned,
    #[serde(rename = "user")]
    Donor,
    BloodbankAdmin,
    Hospital,
}

impl Role {
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Role::Unassigned)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Unassigned => "unassigned",
            Role::Donor => "user",
            Role::BloodbankAdmin => "bloodbank_admin",
            Role::Hospital => "hospital",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unassigned" => Ok(Role::Unassigned),
            "user" | "donor" => Ok(Role::Donor),
            "bloodbank_admin" => Ok(Role::BloodbankAdmin),
            "hospital" => Ok(Role::Hospital),
            _ => Err(DomainError::UnknownRole(s.to_string())),
        }
    }
}

/// How an account authenticates
///
/// Hashing happens upstream in the auth layer; only the hash is stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountCredential {
    Password {
        hash: String,
    },
    ExternalIdentity {
        provider: String,
        #[serde(rename = "subjectId")]
        subject_id: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    #[serde(default)]
    pub role: Role,
    pub credential: AccountCredential,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Donor profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub blood_type: BloodType,
    pub mobile_number: String,
    pub emergency_contact_mobile: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub total_donations: u32,
    #[serde(default)]
    pub is_critical_ready: bool,
    #[serde(default)]
    pub critical_service_radius_km: Option<f64>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl Donor {
    pub fn summary(&self) -> DonorSummary {
        DonorSummary {
            donor_id: self.id,
            name: self.name.clone(),
            blood_type: self.blood_type,
            mobile_number: self.mobile_number.clone(),
            total_donations: self.total_donations,
        }
    }
}

/// Blood bank with its stock levels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodBank {
    pub id: Uuid,
    pub admin_account_id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_number: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub inventory: BTreeMap<BloodType, u32>,
}

impl BloodBank {
    pub fn units_of(&self, blood_type: BloodType) -> u32 {
        self.inventory.get(&blood_type).copied().unwrap_or(0)
    }

    pub fn summary(&self, blood_type: Option<BloodType>) -> BloodBankSummary {
        BloodBankSummary {
            bloodbank_id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
            contact_number: self.contact_number.clone(),
            units_available: blood_type.map(|bt| self.units_of(bt)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Normal,
    #[default]
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    #[default]
    Urgent,
    Critical,
}

/// Request lifecycle: pending until a blood bank accepts or rejects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Validate a status change; only pending requests can be decided
    pub fn transition(self, next: RequestStatus) -> Result<RequestStatus, DomainError> {
        match (self, next) {
            (RequestStatus::Pending, RequestStatus::Accepted)
            | (RequestStatus::Pending, RequestStatus::Rejected) => Ok(next),
            (from, to) => Err(DomainError::InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(DomainError::UnknownStatus(s.to_string())),
        }
    }
}

/// A request for blood, usually raised from the emergency flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: Uuid,
    pub requested_by: Uuid,
    #[serde(default)]
    pub bloodbank_id: Option<Uuid>,
    pub blood_type: BloodType,
    pub units_required: u32,
    #[serde(default)]
    pub request_type: RequestType,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub urgency: Urgency,
    pub patient_name: String,
    pub contact_mobile: String,
    #[serde(default)]
    pub hospital_location: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub emergency_details: Option<String>,
    /// Set when the request was raised by a hospital
    #[serde(default)]
    pub hospital_id: Option<Uuid>,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub fulfilled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl BloodRequest {
    pub fn summary(&self) -> RequestSummary {
        RequestSummary {
            request_id: self.id,
            blood_type: self.blood_type,
            units_required: self.units_required,
            urgency: self.urgency,
            patient_name: self.patient_name.clone(),
            contact_mobile: self.contact_mobile.clone(),
            hospital_location: self
                .hospital_location
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            emergency_details: self.emergency_details.clone(),
            hospital_id: self.hospital_id,
            created_at: self.created_at,
        }
    }
}

/// Hospital profile, owned by an account with the hospital role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_number: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// A completed donation at a blood bank
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub bloodbank_id: Uuid,
    pub blood_type: BloodType,
    pub units_donated: u32,
    #[serde(default = "chrono::Utc::now")]
    pub donated_at: chrono::DateTime<chrono::Utc>,
}

/// Donor fields exposed to emergency requesters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorSummary {
    pub donor_id: Uuid,
    pub name: String,
    pub blood_type: BloodType,
    pub mobile_number: String,
    pub total_donations: u32,
}

/// Blood bank fields exposed in nearby searches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodBankSummary {
    pub bloodbank_id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_available: Option<u32>,
}

/// Request fields shown to donors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub request_id: Uuid,
    pub blood_type: BloodType,
    pub units_required: u32,
    pub urgency: Urgency,
    pub patient_name: String,
    pub contact_mobile: String,
    pub hospital_location: String,
    pub emergency_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_type_parsing() {
        assert_eq!("ab-".parse::<BloodType>().unwrap(), BloodType::AbNegative);
        assert_eq!(" O+ ".parse::<BloodType>().unwrap(), BloodType::OPositive);
        assert!("C+".parse::<BloodType>().is_err());
    }

    #[test]
    fn test_blood_type_wire_format() {
        let json = serde_json::to_string(&BloodType::AbPositive).unwrap();
        assert_eq!(json, "\"AB+\"");

        let mut inventory = BTreeMap::new();
        inventory.insert(BloodType::ONegative, 4u32);
        let json = serde_json::to_string(&inventory).unwrap();
        assert_eq!(json, r#"{"O-":4}"#);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Donor).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::BloodbankAdmin).unwrap(),
            "\"bloodbank_admin\""
        );
        assert_eq!("hospital".parse::<Role>().unwrap(), Role::Hospital);
        assert!(!Role::default().is_assigned());
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(
            RequestStatus::Pending.transition(RequestStatus::Accepted),
            Ok(RequestStatus::Accepted)
        );
        assert!(RequestStatus::Accepted.transition(RequestStatus::Rejected).is_err());
        assert!(RequestStatus::Pending.transition(RequestStatus::Pending).is_err());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_credential_tagging() {
        let credential = AccountCredential::ExternalIdentity {
            provider: "google".to_string(),
            subject_id: "1234".to_string(),
        };
        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["kind"], "external_identity");
        assert_eq!(json["subjectId"], "1234");
    }
}
