// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, Candidate, CandidateKind, CandidateQuery, ContributionEvent, GeoPoint,
    LeaderboardEntry, LeaderboardSnapshot, MatchQuery, MatchResult, RequiredTags,
};
pub use requests::{FindMatchesRequest, LeaderboardQuery, NearbyQuery};
pub use responses::{
    ErrorResponse, FindMatchesResponse, HealthResponse, LeaderboardMeta, LeaderboardResponse,
    MatchMeta, MatchView,
};
