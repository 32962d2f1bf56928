use serde::{Deserialize, Serialize};
use crate::core::distance::round_km;
use crate::models::domain::{CandidateKind, GeoPoint, LeaderboardEntry, MatchResult};

/// A match as presented to API clients
///
/// Distances are rounded to one decimal here and nowhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub kind: CandidateKind,
    pub verified: bool,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "affinityScore")]
    pub affinity_score: f64,
    #[serde(rename = "matchPercent")]
    pub match_percent: u8,
    #[serde(rename = "matchedTags")]
    pub matched_tags: Vec<String>,
    pub rank: usize,
}

impl From<MatchResult> for MatchView {
    fn from(result: MatchResult) -> Self {
        Self {
            candidate_id: result.candidate_id,
            kind: result.kind,
            verified: result.verified,
            distance_km: round_km(result.distance_km),
            affinity_score: result.affinity_score,
            match_percent: (result.affinity_score * 100.0).round().clamp(0.0, 100.0) as u8,
            matched_tags: result.matched_tags,
            rank: result.combined_rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMeta {
    pub count: usize,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
    pub center: GeoPoint,
}

/// Response for find matches endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchView>,
    pub meta: MatchMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardMeta {
    pub count: usize,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

/// Response for leaderboard endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub data: Vec<LeaderboardEntry>,
    pub meta: LeaderboardMeta,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_view_rounds_for_display() {
        let view = MatchView::from(MatchResult {
            candidate_id: "1".to_string(),
            kind: CandidateKind::Provider,
            verified: true,
            distance_km: 2.8749,
            affinity_score: 2.0 / 3.0,
            matched_tags: vec!["teaching".to_string()],
            combined_rank: 1,
        });

        assert_eq!(view.distance_km, 2.9);
        assert_eq!(view.match_percent, 67);
        assert_eq!(view.rank, 1);
    }
}
