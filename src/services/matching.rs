use crate::core::{affinity, calculate_bounding_box, MatchOutcome, Matcher};
use crate::models::{Candidate, CandidateQuery, MatchQuery};
use crate::services::error::ServiceError;
use crate::services::sources::CandidateSource;

/// Match finding service
///
/// Fetches candidates through its [`CandidateSource`], applies the query's
/// policy flags and hands the rest to the [`Matcher`].
pub struct MatchService<S>
where
    S: CandidateSource,
{
    source: S,
    matcher: Matcher,
}

impl<S> Clone for MatchService<S>
where
    S: CandidateSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            matcher: self.matcher,
        }
    }
}

impl<S> MatchService<S>
where
    S: CandidateSource,
{
    pub fn new(source: S, matcher: Matcher) -> Self {
        Self { source, matcher }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build the source query for a match query
    ///
    /// Returns `None` when the radius can't match anything.
    pub fn candidate_query(&self, query: &MatchQuery) -> Option<CandidateQuery> {
        let radius_km = self.matcher.filter().effective_radius(query.radius_km)?;

        Some(CandidateQuery {
            center: query.center,
            radius_km,
            bounding_box: calculate_bounding_box(query.center, radius_km),
            kind: query.kind,
            verified_only: query.verified_only,
        })
    }

    /// Find and rank matches for a query
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The center is not a valid coordinate, or the radius is negative/NaN
    /// - The candidate source fails
    pub async fn find_matches(&self, query: &MatchQuery) -> Result<MatchOutcome, ServiceError> {
        if !query.center.is_valid() {
            return Err(ServiceError::InvalidInput(format!(
                "coordinates out of range: ({}, {})",
                query.center.latitude, query.center.longitude
            )));
        }
        if query.radius_km.is_nan() || query.radius_km < 0.0 {
            return Err(ServiceError::InvalidInput(format!(
                "radius must be non-negative, got {}",
                query.radius_km
            )));
        }

        let Some(candidate_query) = self.candidate_query(query) else {
            tracing::debug!("Zero radius query at {:?}, returning no matches", query.center);
            return Ok(MatchOutcome::default());
        };
        if query.limit == 0 {
            return Ok(MatchOutcome::default());
        }

        let fetched = self.source.fetch_candidates_near(&candidate_query).await?;
        let total_candidates = fetched.len();

        let candidates: Vec<Candidate> = fetched
            .into_iter()
            .filter(|c| self.passes_policy(c, query))
            .collect();

        let mut outcome = self.matcher.rank(
            candidate_query.center,
            candidate_query.radius_km,
            &query.required_tags,
            &candidates,
            query.limit,
        );
        outcome.total_candidates = total_candidates;

        tracing::info!(
            "Returning {} matches within {:.1}km (from {} candidates, {} in radius)",
            outcome.matches.len(),
            candidate_query.radius_km,
            outcome.total_candidates,
            outcome.within_radius
        );

        Ok(outcome)
    }

    fn passes_policy(&self, candidate: &Candidate, query: &MatchQuery) -> bool {
        if !candidate.location.is_valid() {
            tracing::warn!("Skipping candidate {} with invalid coordinates", candidate.id);
            return false;
        }
        if query.kind.is_some_and(|kind| kind != candidate.kind) {
            return false;
        }
        if query.verified_only && !candidate.verified {
            return false;
        }
        if query.require_tag_overlap
            && !query.required_tags.is_empty()
            && affinity(&query.required_tags, &candidate.tags) == 0.0
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateKind, GeoPoint, RequiredTags};
    use crate::services::sources::MemoryStore;

    fn candidate(id: &str, lat: f64, lon: f64, tags: &[&str], verified: bool) -> Candidate {
        Candidate {
            id: id.to_string(),
            location: GeoPoint::new(lat, lon),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            verified,
            kind: CandidateKind::Provider,
        }
    }

    fn query(radius_km: f64) -> MatchQuery {
        MatchQuery {
            center: GeoPoint::new(40.7128, -74.0060),
            radius_km,
            required_tags: RequiredTags::new(["teaching"]),
            kind: None,
            verified_only: false,
            require_tag_overlap: false,
            limit: 20,
        }
    }

    fn service() -> MatchService<MemoryStore> {
        let store = MemoryStore::with_data(
            vec![
                candidate("teach", 40.72, -74.01, &["Teaching"], true),
                candidate("health", 40.725, -74.012, &["healthcare"], false),
                candidate("far", 45.0, -74.0, &["teaching"], true),
            ],
            vec![],
        );
        MatchService::new(store, Matcher::with_defaults())
    }

    #[tokio::test]
    async fn test_find_matches() {
        let outcome = service().find_matches(&query(25.0)).await.unwrap();

        let ids: Vec<&str> = outcome.matches.iter().map(|m| m.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["teach", "health"]);
        assert_eq!(outcome.matches[0].affinity_score, 1.0);
    }

    #[tokio::test]
    async fn test_policy_flags() {
        let mut q = query(25.0);
        q.verified_only = true;
        let outcome = service().find_matches(&q).await.unwrap();
        assert_eq!(outcome.matches.len(), 1);

        let mut q = query(25.0);
        q.require_tag_overlap = true;
        let outcome = service().find_matches(&q).await.unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].candidate_id, "teach");

        let mut q = query(25.0);
        q.kind = Some(CandidateKind::Seeker);
        assert!(service().find_matches(&q).await.unwrap().matches.is_empty());
    }

    #[tokio::test]
    async fn test_zero_radius_is_empty() {
        let outcome = service().find_matches(&query(0.0)).await.unwrap();
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.total_candidates, 0);
    }

    #[tokio::test]
    async fn test_rejects_invalid_input() {
        let result = service().find_matches(&query(-1.0)).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

        let mut q = query(10.0);
        q.center = GeoPoint::new(120.0, 0.0);
        let result = service().find_matches(&q).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn test_candidate_query_clamps_radius() {
        let service = service();
        let cq = service.candidate_query(&query(500.0)).unwrap();
        assert_eq!(cq.radius_km, 100.0);
        assert!(service.candidate_query(&query(0.0)).is_none());
    }
}
