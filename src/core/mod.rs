// Core algorithm exports
pub mod affinity;
pub mod distance;
pub mod leaderboard;
pub mod radius;
pub mod ranking;

pub use affinity::{affinity, matched_tags};
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box, round_km};
pub use leaderboard::aggregate;
pub use radius::{within, Measured, RadiusFilter, MAX_RADIUS_KM};
pub use ranking::{rank, MatchOutcome, Matcher, DEFAULT_TIE_BAND_KM};
