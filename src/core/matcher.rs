use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::distance::{
    calculate_bounding_box, is_within_bounding_box, round_to_tenth, GeoPoint,
};

/// Errors returned by the matcher
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// A locatable entity offered to the matcher
///
/// The payload is carried through untouched. A missing payload
/// deserializes to `T::default()` (`null` for JSON values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<T> {
    pub id: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub payload: T,
}

impl<T> Candidate<T> {
    pub fn new(id: impl Into<String>, location: Option<GeoPoint>, payload: T) -> Self {
        Self {
            id: id.into(),
            location,
            payload,
        }
    }
}

/// Proximity query parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchQuery {
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub limit: usize,
}

impl MatchQuery {
    pub fn new(origin: GeoPoint, radius_km: f64, limit: usize) -> Self {
        Self {
            origin,
            radius_km,
            limit,
        }
    }

    /// Same origin and limit, no radius bound
    pub fn unbounded(&self) -> Self {
        Self {
            radius_km: f64::INFINITY,
            ..*self
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        // Written as a negated comparison so NaN is rejected too
        if !(self.radius_km > 0.0) {
            return Err(MatchError::InvalidQuery(format!(
                "radius must be greater than 0, got {}",
                self.radius_km
            )));
        }
        if self.limit == 0 {
            return Err(MatchError::InvalidQuery(
                "limit must be greater than 0".to_string(),
            ));
        }
        if !self.origin.is_valid() {
            return Err(MatchError::InvalidQuery(format!(
                "origin out of range: ({}, {})",
                self.origin.latitude, self.origin.longitude
            )));
        }
        Ok(())
    }
}

/// A candidate annotated with its distance from the query origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<T> {
    pub id: String,
    pub location: GeoPoint,
    /// Rounded to one decimal place
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "rawDistanceKm")]
    pub raw_distance_km: f64,
    pub payload: T,
}

/// Outcome of a search that may widen its radius
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearch<T> {
    pub results: Vec<MatchResult<T>>,
    /// Nothing was inside the radius, so the results ignore it
    pub expanded: bool,
}

/// Stateless proximity matcher
///
/// # Pipeline Stages
/// 1. Drop unlocatable candidates (missing, invalid, or `(0, 0)`)
/// 2. Bounding box pre-filter
/// 3. Haversine distance and radius cut
/// 4. Stable sort by distance and truncate
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityMatcher;

impl ProximityMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Find the candidates within `query.radius_km` of `query.origin`
    ///
    /// Results are nearest first; equal distances keep their input order.
    /// Candidates without a usable location are skipped, never reported as errors.
    ///
    /// # Errors
    /// `MatchError::InvalidQuery` if the radius or limit is not positive, or the
    /// origin is out of range. No partial result is produced.
    pub fn find_nearby<T>(
        &self,
        query: &MatchQuery,
        candidates: Vec<Candidate<T>>,
    ) -> Result<Vec<MatchResult<T>>, MatchError> {
        query.validate()?;

        let total_candidates = candidates.len();
        let bbox = calculate_bounding_box(query.origin, query.radius_km);

        let mut matches: Vec<MatchResult<T>> = candidates
            .into_iter()
            // Stage 1: locatable only
            .filter_map(|candidate| match candidate.location {
                Some(location) if location.is_locatable() => Some((location, candidate)),
                _ => None,
            })
            // Stage 2: bounding box
            .filter(|(location, _)| {
                is_within_bounding_box(location.latitude, location.longitude, &bbox)
            })
            // Stage 3: exact distance
            .filter_map(|(location, candidate)| {
                let raw_distance_km = query.origin.distance_to(&location);
                if raw_distance_km > query.radius_km {
                    return None;
                }
                Some(MatchResult {
                    id: candidate.id,
                    location,
                    distance_km: round_to_tenth(raw_distance_km),
                    raw_distance_km,
                    payload: candidate.payload,
                })
            })
            .collect();

        // Stage 4: `sort_by` is stable, which gives the input-order tie break
        matches.sort_by(|a, b| a.raw_distance_km.total_cmp(&b.raw_distance_km));
        matches.truncate(query.limit);

        tracing::trace!(
            "Proximity match kept {} of {} candidates within {}km",
            matches.len(),
            total_candidates,
            query.radius_km
        );

        Ok(matches)
    }

    /// Search within the radius, and if nothing is there fall back to the nearest
    /// candidates at any distance
    pub fn find_nearest_with_fallback<T: Clone>(
        &self,
        query: &MatchQuery,
        candidates: Vec<Candidate<T>>,
    ) -> Result<NearbySearch<T>, MatchError> {
        let results = self.find_nearby(query, candidates.clone())?;
        if !results.is_empty() {
            return Ok(NearbySearch {
                results,
                expanded: false,
            });
        }

        tracing::debug!(
            "No candidates within {}km of ({}, {}), expanding search",
            query.radius_km,
            query.origin.latitude,
            query.origin.longitude
        );

        let results = self.find_nearby(&query.unbounded(), candidates)?;
        Ok(NearbySearch {
            results,
            expanded: true,
        })
    }
}
