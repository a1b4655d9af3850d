use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack added to bounding boxes so floating point noise never drops a point on the edge
const BOUNDING_BOX_SLACK_DEG: f64 = 1e-9;

/// Errors raised when constructing a coordinate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    InvalidLatitude(f64),

    #[error("Longitude out of range [-180, 180]: {0}")]
    InvalidLongitude(f64),
}

/// A latitude/longitude pair in degrees
///
/// Deserialization does not range-check; use [`GeoPoint::new`] or
/// [`GeoPoint::is_valid`] where the input is untrusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidLongitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// Both coordinates are finite and within range
    pub fn is_valid(&self) -> bool {
        Self::new(self.latitude, self.longitude).is_ok()
    }

    /// `(0, 0)` is how legacy records spell "location not set"
    pub fn is_unset_sentinel(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Valid and not the unset sentinel
    pub fn is_locatable(&self) -> bool {
        self.is_valid() && !self.is_unset_sentinel()
    }

    /// Great-circle distance to another point in kilometers
    #[inline]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.longitude, point.latitude)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self {
            latitude: point.y(),
            longitude: point.x(),
        }
    }
}

/// Geospatial bounding box in degrees
///
/// When `min_lon > max_lon` the box wraps across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The whole globe
    pub fn world() -> Self {
        Self {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lon: -180.0,
            max_lon: 180.0,
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push antipodal points just past 1.0
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box that contains every point within `radius_km` of `center`
///
/// Much cheaper than Haversine, so it is used as a pre-filter. The longitude
/// span is the exact tangent-meridian bound rather than `radius / (111 * cos(lat))`,
/// which would cut off the poleward corners of the circle. If the circle covers a
/// pole the box spans all longitudes.
///
/// # Arguments
/// * `center` - Center point
/// * `radius_km` - Radius in kilometers, may be infinite
pub fn calculate_bounding_box(center: GeoPoint, radius_km: f64) -> BoundingBox {
    let angular = radius_km / EARTH_RADIUS_KM;
    if !angular.is_finite() || angular >= std::f64::consts::PI {
        return BoundingBox::world();
    }

    let lat = center.latitude.to_radians();
    let min_lat = lat - angular;
    let max_lat = lat + angular;

    if min_lat <= -std::f64::consts::FRAC_PI_2 || max_lat >= std::f64::consts::FRAC_PI_2 {
        return BoundingBox {
            min_lat: (min_lat.to_degrees() - BOUNDING_BOX_SLACK_DEG).max(-90.0),
            max_lat: (max_lat.to_degrees() + BOUNDING_BOX_SLACK_DEG).min(90.0),
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let delta_lon = (angular.sin() / lat.cos()).asin().to_degrees() + BOUNDING_BOX_SLACK_DEG;

    let mut min_lon = center.longitude - delta_lon;
    let mut max_lon = center.longitude + delta_lon;
    if min_lon < -180.0 {
        min_lon += 360.0;
    }
    if max_lon > 180.0 {
        max_lon -= 360.0;
    }

    BoundingBox {
        min_lat: min_lat.to_degrees() - BOUNDING_BOX_SLACK_DEG,
        max_lat: max_lat.to_degrees() + BOUNDING_BOX_SLACK_DEG,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    if lat < bbox.min_lat || lat > bbox.max_lat {
        return false;
    }

    if bbox.crosses_antimeridian() {
        lon >= bbox.min_lon || lon <= bbox.max_lon
    } else {
        lon >= bbox.min_lon && lon <= bbox.max_lon
    }
}

/// Round a distance to one decimal place for display
#[inline]
pub fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}
