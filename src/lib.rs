//! Bloodbridge - proximity matching service for blood donor coordination
//!
//! This library provides the Haversine proximity matcher used to find nearby
//! donors, blood banks and urgent requests, plus the in-memory directory and
//! HTTP routes that feed it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::{calculate_bounding_box, haversine_distance, GeoPoint},
    Candidate, MatchError, MatchQuery, MatchResult, NearbySearch, ProximityMatcher,
};
pub use crate::models::{BloodType, Role};
pub use crate::services::{CandidateSource, Directory, DirectoryError};
