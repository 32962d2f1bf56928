use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::{
    affinity::{affinity, matched_tags},
    radius::RadiusFilter,
};
use crate::models::{Candidate, GeoPoint, MatchResult, RequiredTags};

/// Width of a distance band when no setting overrides it
pub const DEFAULT_TIE_BAND_KM: f64 = 1.0;

/// Result of a ranking pass
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    /// Candidates handed to the ranker, before any filtering
    pub total_candidates: usize,
    /// Candidates that survived the radius check
    pub within_radius: usize,
}

#[derive(Debug)]
struct Scored<'a> {
    candidate: &'a Candidate,
    distance_km: f64,
    affinity: f64,
}

fn by_distance(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

fn by_affinity(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    b.affinity
        .total_cmp(&a.affinity)
        .then_with(|| by_distance(a, b))
}

/// Ranking composer
///
/// # Pipeline Stages
/// 1. Radius filter (distance re-verified per candidate)
/// 2. Affinity scoring against the required tags
/// 3. Distance ordering, id ascending on exact ties
/// 4. Distance bands re-ordered by affinity
/// 5. Truncation and dense rank assignment
///
/// A band starts at the closest unplaced candidate (its anchor) and holds
/// every candidate less than `tie_band_km` farther than the anchor.
/// Membership is measured from the anchor only, never pairwise, so the
/// grouping is well defined. Inside a band the order is affinity
/// descending, then distance, then candidate id.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    filter: RadiusFilter,
    tie_band_km: f64,
}

impl Matcher {
    pub fn new(filter: RadiusFilter, tie_band_km: f64) -> Self {
        Self { filter, tie_band_km }
    }

    pub fn with_defaults() -> Self {
        Self::new(RadiusFilter::default(), DEFAULT_TIE_BAND_KM)
    }

    pub fn filter(&self) -> &RadiusFilter {
        &self.filter
    }

    pub fn tie_band_km(&self) -> f64 {
        self.tie_band_km
    }

    /// Rank candidates around `point`
    ///
    /// # Arguments
    /// * `point` - Query location
    /// * `radius_km` - Search radius, clamped to the filter's maximum
    /// * `required` - Tags to score affinity against; may be empty
    /// * `candidates` - Candidate records from the source, possibly over-inclusive
    /// * `limit` - Maximum number of results
    ///
    /// # Returns
    /// MatchOutcome whose matches carry ranks `1..=k`. Duplicate candidate
    /// ids are collapsed to their closest occurrence.
    pub fn rank(
        &self,
        point: GeoPoint,
        radius_km: f64,
        required: &RequiredTags,
        candidates: &[Candidate],
        limit: usize,
    ) -> MatchOutcome {
        let total_candidates = candidates.len();

        let mut scored: Vec<Scored<'_>> = self
            .filter
            .measure(point, radius_km, candidates)
            .into_iter()
            .map(|m| Scored {
                candidate: m.candidate,
                distance_km: m.distance_km,
                affinity: affinity(required, &m.candidate.tags),
            })
            .collect();

        scored.sort_by(by_distance);

        let mut seen = HashSet::with_capacity(scored.len());
        scored.retain(|s| seen.insert(s.candidate.id.as_str()));
        let within_radius = scored.len();

        self.apply_bands(&mut scored);

        let matches = scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, s)| MatchResult {
                candidate_id: s.candidate.id.clone(),
                kind: s.candidate.kind,
                verified: s.candidate.verified,
                distance_km: s.distance_km,
                affinity_score: s.affinity,
                matched_tags: matched_tags(required, &s.candidate.tags),
                combined_rank: index + 1,
            })
            .collect();

        MatchOutcome {
            matches,
            total_candidates,
            within_radius,
        }
    }

    /// Re-order distance bands of an already distance-sorted slice
    fn apply_bands(&self, sorted: &mut [Scored<'_>]) {
        // Also rejects NaN
        if !(self.tie_band_km > 0.0) {
            return;
        }

        let mut start = 0;
        while start < sorted.len() {
            let anchor = sorted[start].distance_km;
            let end = sorted[start..]
                .iter()
                .position(|s| s.distance_km - anchor >= self.tie_band_km)
                .map_or(sorted.len(), |offset| start + offset);

            sorted[start..end].sort_by(by_affinity);
            start = end;
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Rank with the default radius cap and band width
pub fn rank(
    point: GeoPoint,
    radius_km: f64,
    required: &RequiredTags,
    candidates: &[Candidate],
    limit: usize,
) -> Vec<MatchResult> {
    Matcher::with_defaults()
        .rank(point, radius_km, required, candidates, limit)
        .matches
}
