use serde::Deserialize;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use uuid::Uuid;

use crate::core::distance::GeoPoint;
use crate::core::filters::{has_stock, is_critical_candidate, is_open_urgent_request};
use crate::core::matcher::Candidate;
use crate::models::{
    Account, AccountCredential, BloodBank, BloodBankSummary, BloodRequest, BloodType,
    DirectoryCounts, DomainError, Donation, Donor, DonorSummary, Hospital,
    RegisterBloodBankRequest, RegisterDonorRequest, RegisterHospitalRequest, RequestStatus,
    RequestSummary, RequestType, Role, Urgency,
};

/// Errors that can occur with directory operations
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Role already assigned: {0}")]
    RoleAlreadyAssigned(Role),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not enough {blood_type} in stock: {available} available, {required} required")]
    InsufficientStock {
        blood_type: BloodType,
        available: u32,
        required: u32,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Directory lock poisoned")]
    Poisoned,

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Seed(#[from] serde_json::Error),
}

/// Supplies candidate pools to the proximity matcher
///
/// Implementations apply the eligibility predicates; the matcher only
/// looks at locations.
pub trait CandidateSource {
    /// Donors opted into critical service with exactly this blood type
    fn critical_donors(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<Candidate<DonorSummary>>, DirectoryError>;

    /// Blood banks, annotated with stock of `blood_type` when given
    fn blood_banks(
        &self,
        blood_type: Option<BloodType>,
        in_stock_only: bool,
    ) -> Result<Vec<Candidate<BloodBankSummary>>, DirectoryError>;

    /// Pending urgent or critical requests for this blood type, newest first
    fn urgent_requests(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<Candidate<RequestSummary>>, DirectoryError>;
}

/// Seed document loaded at startup
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySeed {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub donors: Vec<Donor>,
    #[serde(default)]
    pub blood_banks: Vec<BloodBank>,
    #[serde(default)]
    pub hospitals: Vec<Hospital>,
    #[serde(default)]
    pub requests: Vec<BloodRequest>,
    #[serde(default)]
    pub donations: Vec<Donation>,
}

/// Donor registration input
#[derive(Debug, Clone)]
pub struct NewDonor {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub blood_type: BloodType,
    pub emergency_contact_mobile: String,
    pub age: Option<u8>,
    pub weight_kg: Option<f64>,
    pub credential: AccountCredential,
}

impl From<RegisterDonorRequest> for NewDonor {
    fn from(req: RegisterDonorRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            mobile_number: req.mobile_number,
            blood_type: req.blood_type,
            emergency_contact_mobile: req.emergency_contact_mobile,
            age: req.age,
            weight_kg: req.weight_kg,
            credential: req.credential,
        }
    }
}

/// Blood bank registration input
#[derive(Debug, Clone)]
pub struct NewBloodBank {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub contact_number: String,
    pub email: String,
    pub credential: AccountCredential,
}

impl TryFrom<RegisterBloodBankRequest> for NewBloodBank {
    type Error = DirectoryError;

    fn try_from(req: RegisterBloodBankRequest) -> Result<Self, Self::Error> {
        let location = GeoPoint::new(req.latitude, req.longitude)
            .map_err(|e| DirectoryError::InvalidInput(e.to_string()))?;
        Ok(Self {
            name: req.name,
            address: req.address,
            location,
            contact_number: req.contact_number,
            email: req.email,
            credential: req.credential,
        })
    }
}

/// Hospital registration input
#[derive(Debug, Clone)]
pub struct NewHospital {
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    pub contact_number: String,
    pub email: String,
    pub credential: AccountCredential,
}

impl TryFrom<RegisterHospitalRequest> for NewHospital {
    type Error = DirectoryError;

    fn try_from(req: RegisterHospitalRequest) -> Result<Self, Self::Error> {
        let location = GeoPoint::new(req.latitude, req.longitude)
            .map_err(|e| DirectoryError::InvalidInput(e.to_string()))?;
        Ok(Self {
            name: req.name,
            address: req.address,
            location,
            contact_number: req.contact_number,
            email: req.email,
            credential: req.credential,
        })
    }
}

/// Hospital profile changes; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct HospitalUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Patient request raised by a hospital
#[derive(Debug, Clone)]
pub struct NewPatientRequest {
    pub blood_type: BloodType,
    pub units_required: u32,
    pub patient_name: String,
    pub patient_condition: Option<String>,
}

/// Request filed with a blood bank outside the emergency flow
#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub requested_by: Uuid,
    pub bloodbank_id: Uuid,
    pub blood_type: BloodType,
    pub units_required: u32,
    pub request_type: Option<RequestType>,
    pub patient_name: Option<String>,
    pub contact_mobile: Option<String>,
}

/// Donation input
#[derive(Debug, Clone, Copy)]
pub struct NewDonation {
    pub donor_id: Uuid,
    pub bloodbank_id: Uuid,
    pub blood_type: BloodType,
    pub units_donated: u32,
}

/// Emergency request input
#[derive(Debug, Clone)]
pub struct NewEmergencyRequest {
    pub requested_by: Uuid,
    pub bloodbank_id: Uuid,
    pub blood_type: BloodType,
    pub units_required: u32,
    pub urgency: Urgency,
    pub patient_name: String,
    pub contact_mobile: String,
    pub hospital_location: String,
    pub location: Option<GeoPoint>,
    pub emergency_details: String,
}

/// What to do with a donor's stored location
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationUpdate {
    Keep,
    Set(GeoPoint),
    Clear,
}

/// Critical-service settings change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalStatusUpdate {
    pub is_critical_ready: bool,
    pub critical_service_radius_km: Option<f64>,
    pub location: LocationUpdate,
}

#[derive(Debug, Default)]
struct DirectoryData {
    accounts: Vec<Account>,
    donors: Vec<Donor>,
    blood_banks: Vec<BloodBank>,
    hospitals: Vec<Hospital>,
    requests: Vec<BloodRequest>,
    donations: Vec<Donation>,
}

impl DirectoryData {
    fn account_mut(&mut self, id: Uuid) -> Result<&mut Account, DirectoryError> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DirectoryError::NotFound(format!("account {}", id)))
    }

    fn donor_mut(&mut self, id: Uuid) -> Result<&mut Donor, DirectoryError> {
        self.donors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DirectoryError::NotFound(format!("donor {}", id)))
    }

    fn blood_bank_mut(&mut self, id: Uuid) -> Result<&mut BloodBank, DirectoryError> {
        self.blood_banks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| DirectoryError::NotFound(format!("blood bank {}", id)))
    }

    fn hospital_mut(&mut self, id: Uuid) -> Result<&mut Hospital, DirectoryError> {
        self.hospitals
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| DirectoryError::NotFound(format!("hospital {}", id)))
    }

    fn request_mut(&mut self, id: Uuid) -> Result<&mut BloodRequest, DirectoryError> {
        self.requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DirectoryError::NotFound(format!("request {}", id)))
    }

    /// Create an account, enforcing unique email, mobile number and external identity
    fn insert_account(
        &mut self,
        name: &str,
        email: &str,
        mobile_number: &str,
        role: Role,
        credential: AccountCredential,
    ) -> Result<Account, DirectoryError> {
        let email = normalize_email(email);

        if self.accounts.iter().any(|a| a.email == email) {
            return Err(DirectoryError::Conflict("Email already registered".to_string()));
        }
        if self.accounts.iter().any(|a| a.mobile_number == mobile_number) {
            return Err(DirectoryError::Conflict(
                "Mobile number already registered".to_string(),
            ));
        }
        if let AccountCredential::ExternalIdentity { .. } = &credential {
            if self.accounts.iter().any(|a| a.credential == credential) {
                return Err(DirectoryError::Conflict(
                    "External identity already linked".to_string(),
                ));
            }
        }

        let account = Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            mobile_number: mobile_number.to_string(),
            role,
            credential,
            created_at: chrono::Utc::now(),
        };
        self.accounts.push(account.clone());
        Ok(account)
    }
}

/// In-memory registry of accounts, donors, blood banks and blood requests
///
/// Shared across HTTP workers; every operation takes the lock for the
/// duration of a single in-memory read or mutation.
#[derive(Debug, Default)]
pub struct Directory {
    data: RwLock<DirectoryData>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a seed document
    ///
    /// Stored `(0, 0)` locations are legacy "unset" markers and load as `None`.
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let DirectorySeed {
            mut accounts,
            mut donors,
            mut blood_banks,
            mut hospitals,
            mut requests,
            donations,
        } = seed;

        // Registration compares against normalized emails
        for account in &mut accounts {
            account.email = normalize_email(&account.email);
        }
        for donor in &mut donors {
            normalize_location(&mut donor.location, "donor", donor.id);
        }
        for bank in &mut blood_banks {
            normalize_location(&mut bank.location, "blood bank", bank.id);
        }
        for hospital in &mut hospitals {
            normalize_location(&mut hospital.location, "hospital", hospital.id);
        }
        for request in &mut requests {
            normalize_location(&mut request.location, "request", request.id);
        }

        tracing::info!(
            "Directory seeded: {} accounts, {} donors, {} blood banks, {} hospitals, {} requests, {} donations",
            accounts.len(),
            donors.len(),
            blood_banks.len(),
            hospitals.len(),
            requests.len(),
            donations.len()
        );

        Self {
            data: RwLock::new(DirectoryData {
                accounts,
                donors,
                blood_banks,
                hospitals,
                requests,
                donations,
            }),
        }
    }

    /// Load a seed document from a JSON file
    pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let seed: DirectorySeed = serde_json::from_str(&contents)?;
        Ok(Self::from_seed(seed))
    }

    /// Async variant of `load_seed` for use inside the server runtime
    pub async fn load_seed_async<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let seed: DirectorySeed = serde_json::from_str(&contents)?;
        Ok(Self::from_seed(seed))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DirectoryData>, DirectoryError> {
        self.data.read().map_err(|_| DirectoryError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DirectoryData>, DirectoryError> {
        self.data.write().map_err(|_| DirectoryError::Poisoned)
    }

    pub fn counts(&self) -> Result<DirectoryCounts, DirectoryError> {
        let data = self.read()?;
        Ok(DirectoryCounts {
            accounts: data.accounts.len(),
            donors: data.donors.len(),
            blood_banks: data.blood_banks.len(),
            hospitals: data.hospitals.len(),
            requests: data.requests.len(),
            donations: data.donations.len(),
        })
    }

    pub fn account(&self, id: Uuid) -> Result<Account, DirectoryError> {
        let data = self.read()?;
        data.accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("account {}", id)))
    }

    pub fn donor(&self, id: Uuid) -> Result<Donor, DirectoryError> {
        let data = self.read()?;
        data.donors
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("donor {}", id)))
    }

    pub fn blood_bank(&self, id: Uuid) -> Result<BloodBank, DirectoryError> {
        let data = self.read()?;
        data.blood_banks
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("blood bank {}", id)))
    }

    pub fn hospital(&self, id: Uuid) -> Result<Hospital, DirectoryError> {
        let data = self.read()?;
        data.hospitals
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("hospital {}", id)))
    }

    pub fn hospitals(&self) -> Result<Vec<Hospital>, DirectoryError> {
        Ok(self.read()?.hospitals.clone())
    }

    pub fn request(&self, id: Uuid) -> Result<BloodRequest, DirectoryError> {
        let data = self.read()?;
        data.requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("request {}", id)))
    }

    /// Register a donor together with its account
    pub fn register_donor(&self, new: NewDonor) -> Result<(Account, Donor), DirectoryError> {
        let mut data = self.write()?;
        let account = data.insert_account(
            &new.name,
            &new.email,
            &new.mobile_number,
            Role::Donor,
            new.credential,
        )?;

        let donor = Donor {
            id: Uuid::new_v4(),
            account_id: account.id,
            name: new.name,
            blood_type: new.blood_type,
            mobile_number: new.mobile_number,
            emergency_contact_mobile: new.emergency_contact_mobile,
            age: new.age,
            weight_kg: new.weight_kg,
            total_donations: 0,
            is_critical_ready: false,
            critical_service_radius_km: None,
            location: None,
        };
        data.donors.push(donor.clone());

        tracing::info!("Registered donor {} ({})", donor.id, donor.blood_type);
        Ok((account, donor))
    }

    /// Register a blood bank together with its admin account
    pub fn register_blood_bank(
        &self,
        new: NewBloodBank,
    ) -> Result<(Account, BloodBank), DirectoryError> {
        ensure_not_sentinel(&new.location)?;

        let mut data = self.write()?;
        let account = data.insert_account(
            &new.name,
            &new.email,
            &new.contact_number,
            Role::BloodbankAdmin,
            new.credential,
        )?;

        let bank = BloodBank {
            id: Uuid::new_v4(),
            admin_account_id: account.id,
            name: new.name,
            address: new.address,
            contact_number: new.contact_number,
            location: Some(new.location),
            inventory: Default::default(),
        };
        data.blood_banks.push(bank.clone());

        tracing::info!("Registered blood bank {} ({})", bank.id, bank.name);
        Ok((account, bank))
    }

    /// Register a hospital together with its account
    pub fn register_hospital(
        &self,
        new: NewHospital,
    ) -> Result<(Account, Hospital), DirectoryError> {
        ensure_not_sentinel(&new.location)?;

        let mut data = self.write()?;
        let account = data.insert_account(
            &new.name,
            &new.email,
            &new.contact_number,
            Role::Hospital,
            new.credential,
        )?;

        let hospital = Hospital {
            id: Uuid::new_v4(),
            account_id: account.id,
            name: new.name,
            address: new.address,
            contact_number: new.contact_number,
            location: Some(new.location),
        };
        data.hospitals.push(hospital.clone());

        tracing::info!("Registered hospital {} ({})", hospital.id, hospital.name);
        Ok((account, hospital))
    }

    pub fn update_hospital(
        &self,
        hospital_id: Uuid,
        update: HospitalUpdate,
    ) -> Result<Hospital, DirectoryError> {
        if let Some(point) = &update.location {
            ensure_not_sentinel(point)?;
        }

        let mut data = self.write()?;
        let hospital = data.hospital_mut(hospital_id)?;
        if let Some(name) = update.name {
            hospital.name = name;
        }
        if let Some(address) = update.address {
            hospital.address = address;
        }
        if let Some(contact_number) = update.contact_number {
            hospital.contact_number = contact_number;
        }
        if let Some(location) = update.location {
            hospital.location = Some(location);
        }

        tracing::info!("Updated hospital {}", hospital_id);
        Ok(hospital.clone())
    }

    /// Role selection; an account picks its role exactly once
    pub fn assign_role(&self, account_id: Uuid, role: Role) -> Result<Account, DirectoryError> {
        if !role.is_assigned() {
            return Err(DirectoryError::InvalidInput(
                "Cannot select the unassigned role".to_string(),
            ));
        }

        let mut data = self.write()?;
        let account = data.account_mut(account_id)?;
        if account.role.is_assigned() {
            return Err(DirectoryError::RoleAlreadyAssigned(account.role));
        }
        account.role = role;

        tracing::info!("Account {} selected role {}", account_id, role);
        Ok(account.clone())
    }

    /// Change a donor's emergency opt-in, travel radius and location
    pub fn update_critical_status(
        &self,
        donor_id: Uuid,
        update: CriticalStatusUpdate,
    ) -> Result<Donor, DirectoryError> {
        if let LocationUpdate::Set(point) = &update.location {
            ensure_not_sentinel(point)?;
        }

        let mut data = self.write()?;
        let donor = data.donor_mut(donor_id)?;

        donor.is_critical_ready = update.is_critical_ready;
        if let Some(radius) = update.critical_service_radius_km {
            donor.critical_service_radius_km = Some(radius);
        }
        match update.location {
            LocationUpdate::Keep => {}
            LocationUpdate::Set(point) => donor.location = Some(point),
            LocationUpdate::Clear => donor.location = None,
        }

        tracing::info!(
            "Donor {} critical service {}",
            donor_id,
            if donor.is_critical_ready { "enabled" } else { "disabled" }
        );
        Ok(donor.clone())
    }

    /// Replace the stock level of one blood type
    pub fn set_inventory(
        &self,
        bank_id: Uuid,
        blood_type: BloodType,
        units: u32,
    ) -> Result<BloodBank, DirectoryError> {
        let mut data = self.write()?;
        let bank = data.blood_bank_mut(bank_id)?;
        bank.inventory.insert(blood_type, units);

        tracing::info!("Blood bank {} now holds {} units of {}", bank_id, units, blood_type);
        Ok(bank.clone())
    }

    /// File a pending emergency request against a blood bank
    pub fn create_emergency_request(
        &self,
        new: NewEmergencyRequest,
    ) -> Result<BloodRequest, DirectoryError> {
        if let Some(point) = &new.location {
            ensure_not_sentinel(point)?;
        }

        let mut data = self.write()?;
        data.account_mut(new.requested_by)?;
        data.blood_bank_mut(new.bloodbank_id)?;

        let request = BloodRequest {
            id: Uuid::new_v4(),
            requested_by: new.requested_by,
            bloodbank_id: Some(new.bloodbank_id),
            blood_type: new.blood_type,
            units_required: new.units_required,
            request_type: RequestType::Emergency,
            status: RequestStatus::Pending,
            urgency: new.urgency,
            patient_name: new.patient_name,
            contact_mobile: new.contact_mobile,
            hospital_location: Some(new.hospital_location),
            location: new.location.filter(|p| p.is_locatable()),
            emergency_details: Some(new.emergency_details),
            hospital_id: None,
            created_at: chrono::Utc::now(),
            fulfilled_at: None,
        };
        data.requests.push(request.clone());

        tracing::info!(
            "Emergency request {} for {} units of {} filed with blood bank {}",
            request.id,
            request.units_required,
            request.blood_type,
            new.bloodbank_id
        );
        Ok(request)
    }

    /// Ask a hospital's nearby donors for blood for one patient
    ///
    /// Patient requests are always critical and located at the hospital, so
    /// they reach donors through `urgent_requests`.
    pub fn create_patient_request(
        &self,
        hospital_id: Uuid,
        new: NewPatientRequest,
    ) -> Result<BloodRequest, DirectoryError> {
        let mut data = self.write()?;
        let hospital = data.hospital_mut(hospital_id)?.clone();

        let request = BloodRequest {
            id: Uuid::new_v4(),
            requested_by: hospital.account_id,
            bloodbank_id: None,
            blood_type: new.blood_type,
            units_required: new.units_required,
            request_type: RequestType::Emergency,
            status: RequestStatus::Pending,
            urgency: Urgency::Critical,
            patient_name: new.patient_name,
            contact_mobile: hospital.contact_number,
            hospital_location: Some(hospital.address),
            location: hospital.location,
            emergency_details: new.patient_condition,
            hospital_id: Some(hospital.id),
            created_at: chrono::Utc::now(),
            fulfilled_at: None,
        };
        data.requests.push(request.clone());

        tracing::info!(
            "Hospital {} requested {} units of {} for a patient",
            hospital_id,
            request.units_required,
            request.blood_type
        );
        Ok(request)
    }

    /// File a normal or emergency request with a blood bank
    ///
    /// Normal requests are reserved for hospitals. Donors filing an emergency
    /// request must name the patient and a contact number.
    pub fn create_blood_request(
        &self,
        new: NewBloodRequest,
    ) -> Result<BloodRequest, DirectoryError> {
        let mut data = self.write()?;
        let requester = data.account_mut(new.requested_by)?.clone();
        data.blood_bank_mut(new.bloodbank_id)?;

        let is_hospital = requester.role == Role::Hospital;
        let request_type = new.request_type.unwrap_or(if is_hospital {
            RequestType::Normal
        } else {
            RequestType::Emergency
        });

        if request_type == RequestType::Normal && !is_hospital {
            return Err(DirectoryError::Forbidden(
                "Only hospitals can create normal blood requests".to_string(),
            ));
        }
        if request_type == RequestType::Emergency
            && requester.role == Role::Donor
            && (new.patient_name.is_none() || new.contact_mobile.is_none())
        {
            return Err(DirectoryError::InvalidInput(
                "Emergency requests need a patient name and contact number".to_string(),
            ));
        }

        let hospital = data
            .hospitals
            .iter()
            .find(|h| h.account_id == requester.id)
            .cloned();

        let request = BloodRequest {
            id: Uuid::new_v4(),
            requested_by: requester.id,
            bloodbank_id: Some(new.bloodbank_id),
            blood_type: new.blood_type,
            units_required: new.units_required,
            request_type,
            status: RequestStatus::Pending,
            urgency: match request_type {
                RequestType::Normal => Urgency::Routine,
                RequestType::Emergency => Urgency::Urgent,
            },
            patient_name: new.patient_name.unwrap_or_else(|| requester.name.clone()),
            contact_mobile: new
                .contact_mobile
                .unwrap_or_else(|| requester.mobile_number.clone()),
            hospital_location: hospital.as_ref().map(|h| h.address.clone()),
            location: hospital.as_ref().and_then(|h| h.location),
            emergency_details: None,
            hospital_id: hospital.as_ref().map(|h| h.id),
            created_at: chrono::Utc::now(),
            fulfilled_at: None,
        };
        data.requests.push(request.clone());

        tracing::info!(
            "{} request {} for {} units of {} filed with blood bank {}",
            match request_type {
                RequestType::Normal => "Normal",
                RequestType::Emergency => "Emergency",
            },
            request.id,
            request.units_required,
            request.blood_type,
            new.bloodbank_id
        );
        Ok(request)
    }

    /// Requests filed with a blood bank, newest first
    pub fn requests_for_bank(
        &self,
        bank_id: Uuid,
        status: Option<RequestStatus>,
        request_type: Option<RequestType>,
    ) -> Result<Vec<BloodRequest>, DirectoryError> {
        let data = self.read()?;
        if !data.blood_banks.iter().any(|b| b.id == bank_id) {
            return Err(DirectoryError::NotFound(format!("blood bank {}", bank_id)));
        }

        let mut requests: Vec<BloodRequest> = data
            .requests
            .iter()
            .filter(|r| r.bloodbank_id == Some(bank_id))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter(|r| request_type.map_or(true, |t| r.request_type == t))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Accept or reject a pending request
    ///
    /// Accepting a request filed with a blood bank takes the units out of
    /// that bank's stock, and fails if the stock is short.
    pub fn update_request_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<BloodRequest, DirectoryError> {
        let mut data = self.write()?;
        let request = data.request_mut(request_id)?;
        let next = request.status.transition(status)?;
        let (bank_id, blood_type, required) =
            (request.bloodbank_id, request.blood_type, request.units_required);

        if next == RequestStatus::Accepted {
            if let Some(bank_id) = bank_id {
                let bank = data.blood_bank_mut(bank_id)?;
                let available = bank.units_of(blood_type);
                if available < required {
                    return Err(DirectoryError::InsufficientStock {
                        blood_type,
                        available,
                        required,
                    });
                }
                bank.inventory.insert(blood_type, available - required);
            }
        }

        let request = data.request_mut(request_id)?;
        request.status = next;
        if next == RequestStatus::Accepted {
            request.fulfilled_at = Some(chrono::Utc::now());
        }

        tracing::info!("Request {} is now {}", request_id, request.status);
        Ok(request.clone())
    }

    /// Record a donation and bump the donor's running count
    ///
    /// Returns the donation and the donor's new total.
    pub fn record_donation(&self, new: NewDonation) -> Result<(Donation, u32), DirectoryError> {
        if new.units_donated == 0 {
            return Err(DirectoryError::InvalidInput(
                "Units donated must be a positive number".to_string(),
            ));
        }

        let mut data = self.write()?;
        data.blood_bank_mut(new.bloodbank_id)?;
        let donor = data.donor_mut(new.donor_id)?;
        if donor.blood_type != new.blood_type {
            return Err(DirectoryError::InvalidInput(format!(
                "Donor is {}, not {}",
                donor.blood_type, new.blood_type
            )));
        }
        donor.total_donations += 1;
        let total_donations = donor.total_donations;

        let donation = Donation {
            id: Uuid::new_v4(),
            donor_id: new.donor_id,
            bloodbank_id: new.bloodbank_id,
            blood_type: new.blood_type,
            units_donated: new.units_donated,
            donated_at: chrono::Utc::now(),
        };
        data.donations.push(donation.clone());

        tracing::info!(
            "Donor {} gave {} units at blood bank {} ({} donations)",
            new.donor_id,
            new.units_donated,
            new.bloodbank_id,
            total_donations
        );
        Ok((donation, total_donations))
    }

    /// Donations, optionally narrowed to a donor and/or blood bank, newest first
    pub fn donations(
        &self,
        donor_id: Option<Uuid>,
        bloodbank_id: Option<Uuid>,
    ) -> Result<Vec<Donation>, DirectoryError> {
        let data = self.read()?;
        let mut donations: Vec<Donation> = data
            .donations
            .iter()
            .filter(|d| donor_id.map_or(true, |id| d.donor_id == id))
            .filter(|d| bloodbank_id.map_or(true, |id| d.bloodbank_id == id))
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.donated_at.cmp(&a.donated_at));
        Ok(donations)
    }
}

impl CandidateSource for Directory {
    fn critical_donors(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<Candidate<DonorSummary>>, DirectoryError> {
        let data = self.read()?;
        Ok(data
            .donors
            .iter()
            .filter(|donor| is_critical_candidate(donor, blood_type))
            .map(|donor| Candidate::new(donor.id.to_string(), donor.location, donor.summary()))
            .collect())
    }

    fn blood_banks(
        &self,
        blood_type: Option<BloodType>,
        in_stock_only: bool,
    ) -> Result<Vec<Candidate<BloodBankSummary>>, DirectoryError> {
        let data = self.read()?;
        Ok(data
            .blood_banks
            .iter()
            .filter(|bank| match (blood_type, in_stock_only) {
                (Some(bt), true) => has_stock(bank, bt),
                _ => true,
            })
            .map(|bank| {
                Candidate::new(bank.id.to_string(), bank.location, bank.summary(blood_type))
            })
            .collect())
    }

    fn urgent_requests(
        &self,
        blood_type: BloodType,
    ) -> Result<Vec<Candidate<RequestSummary>>, DirectoryError> {
        let data = self.read()?;
        let mut open: Vec<&BloodRequest> = data
            .requests
            .iter()
            .filter(|request| is_open_urgent_request(request, blood_type))
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(open
            .into_iter()
            .map(|request| {
                Candidate::new(request.id.to_string(), request.location, request.summary())
            })
            .collect())
    }
}

fn normalize_location(location: &mut Option<GeoPoint>, kind: &str, id: Uuid) {
    if let Some(point) = *location {
        if point.is_unset_sentinel() {
            *location = None;
        } else if !point.is_valid() {
            tracing::warn!(
                "Dropping out-of-range location ({}, {}) on {} {}",
                point.latitude,
                point.longitude,
                kind,
                id
            );
            *location = None;
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_not_sentinel(point: &GeoPoint) -> Result<(), DirectoryError> {
    if point.is_unset_sentinel() {
        return Err(DirectoryError::InvalidInput(
            "(0, 0) is reserved for unset locations".to_string(),
        ));
    }
    Ok(())
}
