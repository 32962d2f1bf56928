use crate::core::distance::haversine_distance;
use crate::models::{Candidate, GeoPoint};

/// Largest radius any query may use, in kilometers
pub const MAX_RADIUS_KM: f64 = 100.0;

/// A candidate that passed the radius check, with its verified distance
#[derive(Debug, Clone, Copy)]
pub struct Measured<'a> {
    pub candidate: &'a Candidate,
    pub distance_km: f64,
}

/// Radius filter
///
/// Sources are allowed to be approximate (bounding boxes, coarse geo
/// indexes), so every candidate is measured again here. Anything this
/// returns is provably within the requested radius.
#[derive(Debug, Clone, Copy)]
pub struct RadiusFilter {
    max_radius_km: f64,
}

impl RadiusFilter {
    pub fn new(max_radius_km: f64) -> Self {
        Self { max_radius_km }
    }

    pub fn max_radius_km(&self) -> f64 {
        self.max_radius_km
    }

    /// Clamp a requested radius to the configured maximum
    ///
    /// Returns `None` for radii that can never match anything (`<= 0`, NaN).
    #[inline]
    pub fn effective_radius(&self, radius_km: f64) -> Option<f64> {
        if radius_km.is_nan() || radius_km <= 0.0 {
            return None;
        }
        Some(radius_km.min(self.max_radius_km))
    }

    /// Candidates within `radius_km` of `point` (inclusive)
    ///
    /// Output order is unspecified.
    pub fn within<'a>(
        &self,
        point: GeoPoint,
        radius_km: f64,
        candidates: &'a [Candidate],
    ) -> Vec<&'a Candidate> {
        self.measure(point, radius_km, candidates)
            .into_iter()
            .map(|m| m.candidate)
            .collect()
    }

    /// Like [`RadiusFilter::within`], keeping the computed distance
    pub fn measure<'a>(
        &self,
        point: GeoPoint,
        radius_km: f64,
        candidates: &'a [Candidate],
    ) -> Vec<Measured<'a>> {
        let Some(radius_km) = self.effective_radius(radius_km) else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter_map(|candidate| {
                let distance_km = haversine_distance(point, candidate.location);
                (distance_km <= radius_km).then_some(Measured {
                    candidate,
                    distance_km,
                })
            })
            .collect()
    }
}

impl Default for RadiusFilter {
    fn default() -> Self {
        Self::new(MAX_RADIUS_KM)
    }
}

/// [`RadiusFilter::within`] with the default cap
pub fn within<'a>(point: GeoPoint, radius_km: f64, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
    RadiusFilter::default().within(point, radius_km, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateKind;

    const CENTER: GeoPoint = GeoPoint::new(40.7128, -74.0060);

    fn candidate(id: &str, lat: f64, lon: f64) -> Candidate {
        Candidate {
            id: id.to_string(),
            location: GeoPoint::new(lat, lon),
            tags: vec![],
            verified: true,
            kind: CandidateKind::Seeker,
        }
    }

    fn ids(found: &[&Candidate]) -> Vec<String> {
        let mut ids: Vec<String> = found.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_within_keeps_close_candidates() {
        let candidates = vec![
            candidate("near", 40.72, -74.01),  // ~1km
            candidate("mid", 41.0, -74.0),     // ~32km
            candidate("far", 45.0, -74.0),     // >400km
        ];

        let found = within(CENTER, 50.0, &candidates);
        assert_eq!(ids(&found), vec!["mid", "near"]);
    }

    #[test]
    fn test_radius_is_clamped_to_max() {
        // ~222km north, beyond the 100km cap
        let candidates = vec![candidate("far", 42.7128, -74.0060)];

        assert!(within(CENTER, 500.0, &candidates).is_empty());
        assert_eq!(RadiusFilter::new(300.0).within(CENTER, 500.0, &candidates).len(), 1);
    }

    #[test]
    fn test_non_positive_radius_is_empty() {
        let candidates = vec![candidate("same", 40.7128, -74.0060)];

        assert!(within(CENTER, 0.0, &candidates).is_empty());
        assert!(within(CENTER, -5.0, &candidates).is_empty());
        assert!(within(CENTER, f64::NAN, &candidates).is_empty());
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let target = candidate("edge", 40.8, -74.0060);
        let exact = haversine_distance(CENTER, target.location);
        let candidates = vec![target];

        assert_eq!(within(CENTER, exact, &candidates).len(), 1);
    }

    #[test]
    fn test_measure_reports_distance() {
        let candidates = vec![candidate("near", 40.72, -74.01)];
        let measured = RadiusFilter::default().measure(CENTER, 10.0, &candidates);

        assert_eq!(measured.len(), 1);
        assert_eq!(
            measured[0].distance_km,
            haversine_distance(CENTER, candidates[0].location)
        );
    }
}
