// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;

pub use distance::{
    calculate_bounding_box, haversine_distance, is_within_bounding_box, round_to_tenth,
    BoundingBox, GeoError, GeoPoint, EARTH_RADIUS_KM,
};
pub use filters::{has_stock, is_critical_candidate, is_open_urgent_request, service_radius_km};
pub use matcher::{Candidate, MatchError, MatchQuery, MatchResult, NearbySearch, ProximityMatcher};
