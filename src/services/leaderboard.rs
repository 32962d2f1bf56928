use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::core::aggregate;
use crate::models::{ContributionEvent, LeaderboardEntry, LeaderboardSnapshot};
use crate::services::error::ServiceError;
use crate::services::sources::ContributionSource;

/// Holder for the current leaderboard
///
/// A recompute builds the whole snapshot first and then swaps the `Arc`
/// in a single write. Readers clone the `Arc` and drop the lock right
/// away, so they see either the previous table or the new one in full.
#[derive(Debug, Default)]
pub struct LeaderboardStore {
    current: RwLock<Arc<LeaderboardSnapshot>>,
}

impl LeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot
    pub async fn snapshot(&self) -> Arc<LeaderboardSnapshot> {
        self.current.read().await.clone()
    }

    /// Replace the current snapshot wholesale
    pub async fn replace(&self, snapshot: LeaderboardSnapshot) -> Arc<LeaderboardSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = Arc::clone(&snapshot);
        snapshot
    }
}

/// Leaderboard service
///
/// Recomputes from the complete event history on every run; the previous
/// table is discarded, never merged. Recomputes are serialized, so a table
/// built from an older read of the ledger never replaces a newer one.
pub struct LeaderboardService<S>
where
    S: ContributionSource,
{
    source: S,
    store: Arc<LeaderboardStore>,
    recompute_lock: Mutex<()>,
    top_n: usize,
}

impl<S> LeaderboardService<S>
where
    S: ContributionSource,
{
    pub fn new(source: S, top_n: usize) -> Self {
        Self::with_store(source, Arc::new(LeaderboardStore::new()), top_n)
    }

    pub fn with_store(source: S, store: Arc<LeaderboardStore>, top_n: usize) -> Self {
        Self {
            source,
            store,
            recompute_lock: Mutex::new(()),
            top_n,
        }
    }

    pub fn store(&self) -> &Arc<LeaderboardStore> {
        &self.store
    }

    /// Rebuild the leaderboard keeping `top_n` rows and publish it
    ///
    /// # Errors
    ///
    /// Returns an error if the contribution source fails. The published
    /// leaderboard is left untouched in that case.
    pub async fn compute_leaderboard(
        &self,
        top_n: usize,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let snapshot = self.recompute(top_n).await?;
        Ok(snapshot.entries.clone())
    }

    /// Recompute with the configured row count
    ///
    /// Returns the table this run published.
    pub async fn refresh(&self) -> Result<Arc<LeaderboardSnapshot>, ServiceError> {
        self.recompute(self.top_n).await
    }

    /// Fetch, aggregate and publish while holding the recompute lock
    async fn recompute(&self, top_n: usize) -> Result<Arc<LeaderboardSnapshot>, ServiceError> {
        let _guard = self.recompute_lock.lock().await;

        let events = sanitize(self.source.fetch_all_contribution_events().await?);
        let entries = aggregate(&events, top_n);

        let snapshot = self
            .store
            .replace(LeaderboardSnapshot {
                entries,
                updated_at: Some(chrono::Utc::now()),
            })
            .await;

        tracing::info!(
            "Leaderboard updated with {} entries from {} events",
            snapshot.entries.len(),
            events.len()
        );

        Ok(snapshot)
    }

    /// The first `limit` rows of the published leaderboard
    pub async fn current(&self, limit: usize) -> LeaderboardSnapshot {
        let snapshot = self.store.snapshot().await;
        LeaderboardSnapshot {
            entries: snapshot.entries.iter().take(limit).cloned().collect(),
            updated_at: snapshot.updated_at,
        }
    }
}

impl<S> LeaderboardService<S>
where
    S: ContributionSource + 'static,
{
    /// Recompute on a fixed interval until the task is aborted
    ///
    /// Failed runs are logged and the last good table stays published.
    pub fn spawn_refresh(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    tracing::error!("Leaderboard refresh failed: {}", e);
                }
            }
        })
    }
}

/// Drop events the aggregator must not see
fn sanitize(events: Vec<ContributionEvent>) -> Vec<ContributionEvent> {
    let total = events.len();
    let valid: Vec<ContributionEvent> = events
        .into_iter()
        .filter(|e| e.hours.is_finite() && e.hours >= 0.0 && !e.subject_id.trim().is_empty())
        .collect();

    if valid.len() != total {
        tracing::warn!(
            "Dropped {} contribution events with negative hours or no subject",
            total - valid.len()
        );
    }

    valid
}
