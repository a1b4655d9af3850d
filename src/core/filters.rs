use crate::models::{BloodBank, BloodRequest, BloodType, Donor, RequestStatus, Urgency};

/// Check if a donor can be offered for an emergency of the given blood type
///
/// The donor must have opted into critical service and match exactly.
#[inline]
pub fn is_critical_candidate(donor: &Donor, blood_type: BloodType) -> bool {
    donor.is_critical_ready && donor.blood_type == blood_type
}

/// Check if a request should be shown to donors of the given blood type
#[inline]
pub fn is_open_urgent_request(request: &BloodRequest, blood_type: BloodType) -> bool {
    request.status == RequestStatus::Pending
        && matches!(request.urgency, Urgency::Urgent | Urgency::Critical)
        && request.blood_type == blood_type
}

/// Check if a blood bank holds at least one unit of the given blood type
#[inline]
pub fn has_stock(bank: &BloodBank, blood_type: BloodType) -> bool {
    bank.units_of(blood_type) > 0
}

/// The radius a donor is willing to travel, or `default_km` if unset
#[inline]
pub fn service_radius_km(donor: &Donor, default_km: f64) -> f64 {
    donor
        .critical_service_radius_km
        .filter(|radius| *radius > 0.0 && radius.is_finite())
        .unwrap_or(default_km)
}
