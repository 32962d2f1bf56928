//! Collaborator interfaces the engine pulls its data through.
//!
//! The matching and leaderboard services never reach for a database
//! directly. They are handed a [`CandidateSource`] and a
//! [`ContributionSource`] at construction, which keeps them testable with
//! [`MemoryStore`] and lets deployments plug in their own storage.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::core::is_within_bounding_box;
use crate::models::{Candidate, CandidateQuery, ContributionEvent};
use crate::services::error::SourceError;

/// Supplies candidates near a point
///
/// Implementations may be approximate and return candidates outside the
/// radius (bounding boxes, coarse geo indexes). They should honour
/// `kind` and `verified_only` when they can; the match service re-applies
/// both anyway.
pub trait CandidateSource: Send + Sync {
    fn fetch_candidates_near(
        &self,
        query: &CandidateQuery,
    ) -> impl Future<Output = Result<Vec<Candidate>, SourceError>> + Send;

    /// Whether the backing store is reachable
    fn is_healthy(&self) -> impl Future<Output = bool> + Send {
        async { true }
    }
}

/// Supplies the full contribution history for leaderboard recomputes
pub trait ContributionSource: Send + Sync {
    fn fetch_all_contribution_events(
        &self,
    ) -> impl Future<Output = Result<Vec<ContributionEvent>, SourceError>> + Send;
}

/// Fixture contents for a [`MemoryStore`]
///
/// ```json
/// {
///   "candidates": [
///     {"id": "ngo-1", "location": {"lat": 19.05, "lng": 72.88},
///      "tags": ["teaching"], "verified": true, "kind": "provider"}
///   ],
///   "contributions": [{"subjectId": "vol-1", "hours": 3.5}]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub contributions: Vec<ContributionEvent>,
}

#[derive(Debug, Default)]
struct MemoryData {
    candidates: Vec<Candidate>,
    events: Vec<ContributionEvent>,
}

/// In-process store for development and tests
///
/// Cloning shares the underlying data. Candidate lookups use the query's
/// bounding box, which is coarser than the radius.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(candidates: Vec<Candidate>, events: Vec<ContributionEvent>) -> Self {
        Self {
            data: Arc::new(RwLock::new(MemoryData { candidates, events })),
        }
    }

    pub fn from_seed(seed: SeedData) -> Self {
        Self::with_data(seed.candidates, seed.contributions)
    }

    /// Load a JSON fixture (see [`SeedData`])
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        Ok(Self::from_seed(seed))
    }

    /// Insert a candidate, replacing any existing one with the same id
    pub async fn upsert_candidate(&self, candidate: Candidate) {
        let mut data = self.data.write().await;
        match data.candidates.iter().position(|c| c.id == candidate.id) {
            Some(index) => data.candidates[index] = candidate,
            None => data.candidates.push(candidate),
        }
    }

    /// Remove a candidate, returning whether it existed
    pub async fn remove_candidate(&self, id: &str) -> bool {
        let mut data = self.data.write().await;
        let before = data.candidates.len();
        data.candidates.retain(|c| c.id != id);
        data.candidates.len() != before
    }

    pub async fn record_contribution(&self, event: ContributionEvent) {
        self.data.write().await.events.push(event);
    }

    pub async fn candidate_count(&self) -> usize {
        self.data.read().await.candidates.len()
    }
}

impl CandidateSource for MemoryStore {
    async fn fetch_candidates_near(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, SourceError> {
        let data = self.data.read().await;
        let candidates: Vec<Candidate> = data
            .candidates
            .iter()
            .filter(|c| is_within_bounding_box(c.location, &query.bounding_box))
            .filter(|c| query.kind.map_or(true, |kind| c.kind == kind))
            .filter(|c| !query.verified_only || c.verified)
            .cloned()
            .collect();

        tracing::debug!("Memory store returned {} candidates", candidates.len());
        Ok(candidates)
    }
}

impl ContributionSource for MemoryStore {
    async fn fetch_all_contribution_events(&self) -> Result<Vec<ContributionEvent>, SourceError> {
        Ok(self.data.read().await.events.clone())
    }
}
