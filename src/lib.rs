//! Civic Match - proximity and skill-affinity matching for volunteers and organizations
//!
//! This library provides the matching engine behind the civic-match service.
//! Candidates are filtered to a radius around a query point, scored by how
//! many of the requested skill tags they carry, and ordered distance first
//! with affinity breaking near-ties. A separate aggregator turns contribution
//! history into a ranked volunteer leaderboard.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate, affinity, haversine_distance, calculate_bounding_box, rank, Matcher, RadiusFilter};
pub use crate::models::{Candidate, CandidateKind, ContributionEvent, GeoPoint, LeaderboardEntry, MatchResult, RequiredTags};
pub use crate::services::{LeaderboardService, MatchService, MemoryStore, PostgresStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bbox = calculate_bounding_box(GeoPoint::new(40.7128, -74.0060), 10.0);
        assert!(bbox.min_lat < 40.7128);
        assert!(haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.0)) == 0.0);
    }
}
