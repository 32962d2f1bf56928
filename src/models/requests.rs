use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::config::MatchingSettings;
use crate::models::domain::{CandidateKind, GeoPoint, MatchQuery, RequiredTags};

/// Request to find matches around a point
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(alias = "longitude")]
    pub lng: f64,
    #[validate(range(min = 0.0))]
    #[serde(rename = "radiusKm", alias = "radius_km", default)]
    pub radius_km: Option<f64>,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub kind: Option<CandidateKind>,
    #[serde(rename = "verifiedOnly", alias = "verified_only", default)]
    pub verified_only: Option<bool>,
    #[serde(rename = "requireTagOverlap", alias = "require_tag_overlap", default)]
    pub require_tag_overlap: bool,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}

impl FindMatchesRequest {
    /// Build the typed query, filling unset fields from the settings
    ///
    /// Call only after `validate()` succeeded.
    pub fn into_query(self, defaults: &MatchingSettings) -> MatchQuery {
        let limit = self
            .limit
            .map(usize::from)
            .unwrap_or(defaults.default_limit)
            .min(defaults.max_limit);

        MatchQuery {
            center: GeoPoint::new(self.lat, self.lng),
            radius_km: self.radius_km.unwrap_or(defaults.default_radius_km),
            required_tags: RequiredTags::new(&self.tags),
            kind: self.kind,
            verified_only: self.verified_only.unwrap_or(defaults.verified_only),
            require_tag_overlap: self.require_tag_overlap,
            limit,
        }
    }
}

/// Query-string flavour of [`FindMatchesRequest`]
///
/// `tags` is a comma-separated list, e.g. `?lat=19.07&lng=72.87&tags=teaching,health`.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyQuery {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
    #[serde(rename = "radiusKm", alias = "radius_km", default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub kind: Option<CandidateKind>,
    #[serde(rename = "verifiedOnly", alias = "verified_only", default)]
    pub verified_only: Option<bool>,
    #[serde(rename = "requireTagOverlap", alias = "require_tag_overlap", default)]
    pub require_tag_overlap: Option<bool>,
    #[serde(default)]
    pub limit: Option<u16>,
}

impl From<NearbyQuery> for FindMatchesRequest {
    fn from(query: NearbyQuery) -> Self {
        let tags = query
            .tags
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        FindMatchesRequest {
            lat: query.lat,
            lng: query.lng,
            radius_km: query.radius_km,
            tags,
            kind: query.kind,
            verified_only: query.verified_only,
            require_tag_overlap: query.require_tag_overlap.unwrap_or(false),
            limit: query.limit,
        }
    }
}

/// Query parameters for reading the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeaderboardQuery {
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FindMatchesRequest {
        FindMatchesRequest {
            lat: 19.0760,
            lng: 72.8777,
            radius_km: None,
            tags: vec![" Teaching ".to_string(), "".to_string()],
            kind: None,
            verified_only: None,
            require_tag_overlap: false,
            limit: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let mut req = request();
        req.lat = 91.0;
        assert!(req.validate().is_err());

        let mut req = request();
        req.lng = -180.5;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_radius() {
        let mut req = request();
        req.radius_km = Some(-1.0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_query_applies_defaults() {
        let settings = MatchingSettings::default();
        let query = request().into_query(&settings);

        assert_eq!(query.radius_km, settings.default_radius_km);
        assert_eq!(query.limit, settings.default_limit);
        assert_eq!(query.verified_only, settings.verified_only);
        assert_eq!(query.required_tags.iter().collect::<Vec<_>>(), vec!["teaching"]);
    }

    #[test]
    fn test_nearby_query_splits_tags() {
        let query = NearbyQuery {
            lat: 1.0,
            lng: 2.0,
            radius_km: Some(10.0),
            tags: Some("teaching,healthcare".to_string()),
            kind: Some(CandidateKind::Provider),
            verified_only: None,
            require_tag_overlap: None,
            limit: Some(5),
        };

        let req = FindMatchesRequest::from(query);
        assert_eq!(req.tags, vec!["teaching", "healthcare"]);
        assert_eq!(req.kind, Some(CandidateKind::Provider));
        assert!(!req.require_tag_overlap);
    }
}
