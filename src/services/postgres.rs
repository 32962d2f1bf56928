use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{Candidate, CandidateKind, CandidateQuery, ContributionEvent, GeoPoint};
use crate::services::error::SourceError;
use crate::services::sources::{CandidateSource, ContributionSource};

/// Candidate kind as stored in the `candidate_kind` Postgres enum
#[derive(Debug, Clone, Copy, sqlx::Type)]
#[sqlx(type_name = "candidate_kind", rename_all = "lowercase")]
pub(crate) enum KindColumn {
    Seeker,
    Provider,
}

impl From<CandidateKind> for KindColumn {
    fn from(value: CandidateKind) -> Self {
        match value {
            CandidateKind::Seeker => KindColumn::Seeker,
            CandidateKind::Provider => KindColumn::Provider,
        }
    }
}

impl From<KindColumn> for CandidateKind {
    fn from(value: KindColumn) -> Self {
        match value {
            KindColumn::Seeker => CandidateKind::Seeker,
            KindColumn::Provider => CandidateKind::Provider,
        }
    }
}

/// PostgreSQL-backed candidate and contribution store
///
/// Candidate lookups filter on a latitude/longitude bounding box, which
/// is cheap with a btree index but over-inclusive at the corners. The
/// radius filter in the matcher trims the extra rows.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, SourceError> {
        if url.is_empty() {
            return Err(SourceError::Unavailable("database.url is not set".to_string()));
        }

        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Insert or replace a candidate
    pub async fn upsert_candidate(&self, candidate: &Candidate) -> Result<(), SourceError> {
        let query = r#"
            INSERT INTO candidates (id, kind, latitude, longitude, tags, verified)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id)
            DO UPDATE SET
                kind = EXCLUDED.kind,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                tags = EXCLUDED.tags,
                verified = EXCLUDED.verified
        "#;

        sqlx::query(query)
            .bind(&candidate.id)
            .bind(KindColumn::from(candidate.kind))
            .bind(candidate.location.latitude)
            .bind(candidate.location.longitude)
            .bind(&candidate.tags)
            .bind(candidate.verified)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, SourceError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl CandidateSource for PostgresStore {
    async fn fetch_candidates_near(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<Candidate>, SourceError> {
        let sql = r#"
            SELECT id, kind, latitude, longitude, tags, verified
            FROM candidates
            WHERE latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
              AND ($5::candidate_kind IS NULL OR kind = $5)
              AND (NOT $6 OR verified)
        "#;

        let bbox = &query.bounding_box;
        let rows = sqlx::query(sql)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(query.kind.map(KindColumn::from))
            .bind(query.verified_only)
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| -> Result<Candidate, sqlx::Error> {
                let kind: KindColumn = row.try_get("kind")?;
                Ok(Candidate {
                    id: row.try_get("id")?,
                    location: GeoPoint::new(row.try_get("latitude")?, row.try_get("longitude")?),
                    tags: row.try_get("tags")?,
                    verified: row.try_get("verified")?,
                    kind: kind.into(),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Queried {} candidates inside bounding box", candidates.len());

        Ok(candidates)
    }

    async fn is_healthy(&self) -> bool {
        match self.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("PostgreSQL health check failed: {}", e);
                false
            }
        }
    }
}

impl ContributionSource for PostgresStore {
    async fn fetch_all_contribution_events(&self) -> Result<Vec<ContributionEvent>, SourceError> {
        let sql = r#"
            SELECT subject_id, display_name, hours
            FROM contribution_events
            ORDER BY id
        "#;

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let events = rows
            .iter()
            .map(|row| -> Result<ContributionEvent, sqlx::Error> {
                Ok(ContributionEvent {
                    subject_id: row.try_get("subject_id")?,
                    display_name: row.try_get("display_name")?,
                    hours: row.try_get("hours")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Loaded {} contribution events", events.len());

        Ok(events)
    }
}
