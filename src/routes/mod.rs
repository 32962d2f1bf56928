// Route exports
pub mod leaderboard;
pub mod matches;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use std::fmt;
use std::sync::Arc;

use crate::config::{LeaderboardSettings, MatchingSettings, Settings};
use crate::core::{Matcher, RadiusFilter};
use crate::models::ErrorResponse;
use crate::services::{
    CandidateSource, ContributionSource, LeaderboardService, MatchService, ServiceError,
};

/// Application state shared across all handlers
pub struct AppState<S>
where
    S: CandidateSource + ContributionSource,
{
    pub matches: Arc<MatchService<S>>,
    pub leaderboard: Arc<LeaderboardService<S>>,
    pub matching: MatchingSettings,
    pub leaderboard_settings: LeaderboardSettings,
}

impl<S> Clone for AppState<S>
where
    S: CandidateSource + ContributionSource,
{
    fn clone(&self) -> Self {
        Self {
            matches: Arc::clone(&self.matches),
            leaderboard: Arc::clone(&self.leaderboard),
            matching: self.matching.clone(),
            leaderboard_settings: self.leaderboard_settings.clone(),
        }
    }
}

impl<S> AppState<S>
where
    S: CandidateSource + ContributionSource + Clone,
{
    /// Wire both services to one store
    pub fn new(source: S, matching: MatchingSettings, leaderboard_settings: LeaderboardSettings) -> Self {
        let matcher = Matcher::new(RadiusFilter::new(matching.max_radius_km), matching.tie_band_km);

        Self {
            matches: Arc::new(MatchService::new(source.clone(), matcher)),
            leaderboard: Arc::new(LeaderboardService::new(source, leaderboard_settings.top_n)),
            matching,
            leaderboard_settings,
        }
    }

    pub fn from_settings(source: S, settings: &Settings) -> Self {
        Self::new(source, settings.matching.clone(), settings.leaderboard.clone())
    }
}

pub fn configure_routes<S>(cfg: &mut web::ServiceConfig)
where
    S: CandidateSource + ContributionSource + 'static,
{
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure::<S>)
            .configure(leaderboard::configure::<S>),
    );
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl error::ResponseError for ErrorResponse {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl ErrorResponse {
    pub fn bad_request(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code: 400,
        }
    }
}

/// Map a service failure onto an HTTP response
pub(crate) fn service_error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::InvalidInput(message) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request("invalid_input", message.clone()))
        }
        ServiceError::Source(source) => {
            tracing::error!("Data source failure: {}", source);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "source_unavailable".to_string(),
                message: source.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ErrorResponse::bad_request("invalid_json", format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query string error on {}: {}", req.path(), err);
    ErrorResponse::bad_request("invalid_query", format!("Invalid query: {}", err)).into()
}

/// JSON extractor config using [`handle_json_payload_error`]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

/// Query extractor config using [`handle_query_payload_error`]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(handle_query_payload_error)
}
