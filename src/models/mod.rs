// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Account, AccountCredential, BloodBank, BloodBankSummary, BloodRequest, BloodType, DomainError,
    Donation, Donor, DonorSummary, Hospital, RequestStatus, RequestSummary, RequestType, Role,
    Urgency,
};
pub use requests::{
    BankRequestsQuery, CreateBloodRequestBody, CriticalStatusRequest, DonationsQuery,
    EmergencyRequestBody, InventoryUpdateRequest, MatchRequest, NearbyBloodBanksRequest,
    NearbyDonorsRequest, PatientRequestBody, RecordDonationRequest, RegisterBloodBankRequest,
    RegisterDonorRequest, RegisterHospitalRequest, RoleSelectionRequest, UpdateHospitalRequest,
    UpdateRequestStatusBody,
};
pub use responses::{
    AccountResponse, BloodBankRegistrationResponse, BloodBankResponse, BloodRequestResponse,
    BloodRequestsResponse, DirectoryCounts, DonationResponse, DonationsResponse,
    DonorRegistrationResponse, DonorResponse, EmergencyRequestResponse, ErrorResponse,
    HealthResponse, HospitalRegistrationResponse, HospitalResponse, HospitalsResponse,
    IncomingRequestsResponse, MatchResponse, NearbyBloodBanksResponse, NearbyDonorsResponse,
};
