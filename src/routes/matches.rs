use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, MatchMeta, MatchView,
    NearbyQuery,
};
use crate::routes::{service_error_response, AppState};
use crate::services::{CandidateSource, ContributionSource};

/// Configure all match-related routes
pub fn configure<S>(cfg: &mut web::ServiceConfig)
where
    S: CandidateSource + ContributionSource + 'static,
{
    cfg.route("/health", web::get().to(health_check::<S>))
        .route("/matches/find", web::post().to(find_matches::<S>))
        .route("/matches/nearby", web::get().to(nearby::<S>));
}

/// Health check endpoint
async fn health_check<S>(state: web::Data<AppState<S>>) -> impl Responder
where
    S: CandidateSource + ContributionSource + 'static,
{
    let healthy = state.matches.source().is_healthy().await;
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "lat": 19.0760,
///   "lng": 72.8777,
///   "radiusKm": 10,
///   "tags": ["teaching", "healthcare"],
///   "kind": "provider",
///   "verifiedOnly": true,
///   "requireTagOverlap": false,
///   "limit": 20
/// }
/// ```
async fn find_matches<S>(
    state: web::Data<AppState<S>>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder
where
    S: CandidateSource + ContributionSource + 'static,
{
    respond_with_matches(&state, req.into_inner()).await
}

/// Nearby endpoint, the query-string form of [`find_matches`]
///
/// GET /api/v1/matches/nearby?lat=19.07&lng=72.87&radiusKm=10&tags=teaching,healthcare
async fn nearby<S>(state: web::Data<AppState<S>>, query: web::Query<NearbyQuery>) -> impl Responder
where
    S: CandidateSource + ContributionSource + 'static,
{
    respond_with_matches(&state, query.into_inner().into()).await
}

async fn respond_with_matches<S>(state: &AppState<S>, req: FindMatchesRequest) -> HttpResponse
where
    S: CandidateSource + ContributionSource,
{
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "Validation failed",
            errors.to_string(),
        ));
    }

    let query = req.into_query(&state.matching);

    tracing::info!(
        "Finding matches near ({}, {}), radius: {}km, tags: {}, limit: {}",
        query.center.latitude,
        query.center.longitude,
        query.radius_km,
        query.required_tags.len(),
        query.limit
    );

    let outcome = match state.matches.find_matches(&query).await {
        Ok(outcome) => outcome,
        Err(e) => return service_error_response(&e),
    };

    let radius_km = state
        .matches
        .matcher()
        .filter()
        .effective_radius(query.radius_km)
        .unwrap_or(0.0);

    let matches: Vec<MatchView> = outcome.matches.into_iter().map(MatchView::from).collect();

    HttpResponse::Ok().json(FindMatchesResponse {
        meta: MatchMeta {
            count: matches.len(),
            total_candidates: outcome.total_candidates,
            radius_km,
            center: query.center,
        },
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    use crate::config::{LeaderboardSettings, MatchingSettings};
    use crate::models::{Candidate, CandidateKind, GeoPoint};
    use crate::services::MemoryStore;

    fn state() -> AppState<MemoryStore> {
        let store = MemoryStore::with_data(
            vec![Candidate {
                id: "org-1".to_string(),
                location: GeoPoint::new(19.08, 72.88),
                tags: vec!["teaching".to_string()],
                verified: true,
                kind: CandidateKind::Provider,
            }],
            vec![],
        );
        AppState::new(store, MatchingSettings::default(), LeaderboardSettings::default())
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure::<MemoryStore>),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
    }

    #[actix_web::test]
    async fn test_nearby_rejects_bad_latitude() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure::<MemoryStore>),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/matches/nearby?lat=95&lng=72.8")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
