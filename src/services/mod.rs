// Service exports
pub mod error;
pub mod leaderboard;
pub mod matching;
pub mod postgres;
pub mod sources;

pub use error::{ServiceError, SourceError};
pub use leaderboard::{LeaderboardService, LeaderboardStore};
pub use matching::MatchService;
pub use postgres::PostgresStore;
pub use sources::{CandidateSource, ContributionSource, MemoryStore, SeedData};
