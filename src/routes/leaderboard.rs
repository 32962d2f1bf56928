use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{ErrorResponse, LeaderboardMeta, LeaderboardQuery, LeaderboardResponse, LeaderboardSnapshot};
use crate::routes::{service_error_response, AppState};
use crate::services::{CandidateSource, ContributionSource};

/// Configure leaderboard routes
pub fn configure<S>(cfg: &mut web::ServiceConfig)
where
    S: CandidateSource + ContributionSource + 'static,
{
    cfg.route("/leaderboard", web::get().to(get_leaderboard::<S>))
        .route("/leaderboard/refresh", web::post().to(refresh_leaderboard::<S>));
}

/// Read the published leaderboard
///
/// GET /api/v1/leaderboard?limit=10
///
/// Never triggers a recompute; an empty table is returned until the first
/// refresh completes.
async fn get_leaderboard<S>(
    state: web::Data<AppState<S>>,
    query: web::Query<LeaderboardQuery>,
) -> impl Responder
where
    S: CandidateSource + ContributionSource + 'static,
{
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for leaderboard request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "Validation failed",
            errors.to_string(),
        ));
    }

    let limit = query
        .limit
        .map(usize::from)
        .unwrap_or(state.leaderboard_settings.default_limit);

    let snapshot = state.leaderboard.current(limit).await;
    HttpResponse::Ok().json(into_response(snapshot))
}

/// Recompute the leaderboard from the full contribution history
///
/// POST /api/v1/leaderboard/refresh
async fn refresh_leaderboard<S>(state: web::Data<AppState<S>>) -> impl Responder
where
    S: CandidateSource + ContributionSource + 'static,
{
    match state.leaderboard.refresh().await {
        Ok(snapshot) => {
            tracing::info!("Leaderboard refreshed on request ({} entries)", snapshot.entries.len());
            HttpResponse::Ok().json(into_response(snapshot.as_ref().clone()))
        }
        Err(e) => service_error_response(&e),
    }
}

fn into_response(snapshot: LeaderboardSnapshot) -> LeaderboardResponse {
    LeaderboardResponse {
        meta: LeaderboardMeta {
            count: snapshot.entries.len(),
            last_updated: snapshot.updated_at,
        },
        data: snapshot.entries,
    }
}
