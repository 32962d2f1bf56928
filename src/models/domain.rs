use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A point on the Earth's surface in decimal degrees
///
/// Range checks are the caller's job; the matching core assumes
/// `latitude ∈ [-90, 90]` and `longitude ∈ [-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both coordinates are finite and inside their valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Which side of the platform a candidate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    /// A volunteer looking for opportunities
    #[serde(alias = "volunteer")]
    Seeker,
    /// An organization offering opportunities
    #[serde(alias = "ngo", alias = "organization")]
    Provider,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Seeker => "seeker",
            CandidateKind::Provider => "provider",
        }
    }
}

impl std::str::FromStr for CandidateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seeker" | "volunteer" => Ok(CandidateKind::Seeker),
            "provider" | "ngo" | "organization" => Ok(CandidateKind::Provider),
            other => Err(format!("unknown candidate kind: {}", other)),
        }
    }
}

/// An entity eligible to appear in match results
///
/// Owned by the storage layer; the core only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    pub kind: CandidateKind,
}

/// Normalized set of tags a query asks for
///
/// Tags are trimmed and lower-cased; blank entries are dropped because an
/// empty string is a substring of every tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredTags(BTreeSet<String>);

impl RequiredTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().collect()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate the normalized tags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for RequiredTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }
}

/// A single ranked entry produced by a match query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub kind: CandidateKind,
    pub verified: bool,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "affinityScore")]
    pub affinity_score: f64,
    #[serde(rename = "matchedTags")]
    pub matched_tags: Vec<String>,
    #[serde(rename = "combinedRank")]
    pub combined_rank: usize,
}

/// Hours contributed by one subject, as recorded by the external ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionEvent {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    pub hours: f64,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

impl ContributionEvent {
    pub fn new(subject_id: impl Into<String>, hours: f64) -> Self {
        Self {
            subject_id: subject_id.into(),
            hours,
            display_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "totalHours")]
    pub total_hours: f64,
    pub rank: usize,
}

/// A complete leaderboard table; replaced as a whole on each recompute
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// What a candidate source is asked for
///
/// The bounding box is a hint for index-backed sources. Sources may
/// return more than asked; the radius filter re-checks every distance.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub bounding_box: BoundingBox,
    pub kind: Option<CandidateKind>,
    pub verified_only: bool,
}

/// A validated match query
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub required_tags: RequiredTags,
    pub kind: Option<CandidateKind>,
    pub verified_only: bool,
    /// Drop candidates sharing no tag with a non-empty `required_tags`
    pub require_tag_overlap: bool,
    pub limit: usize,
}
