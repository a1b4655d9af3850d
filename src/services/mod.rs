// Service exports
pub mod directory;

pub use directory::{
    CandidateSource, CriticalStatusUpdate, Directory, DirectoryError, DirectorySeed,
    HospitalUpdate, LocationUpdate, NewBloodBank, NewBloodRequest, NewDonation, NewDonor,
    NewEmergencyRequest, NewHospital, NewPatientRequest,
};
