use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::dto::{common::ErrorResponse, leaderboard::LeaderboardResponse};

use crate::{
    error::{WebError, WebResult},
    state::AppState,
};

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Current rankings for both segments, fastest first", body = LeaderboardResponse),
        (status = 500, description = "Leaderboard could not be read", body = ErrorResponse)
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(State(state): State<AppState>) -> WebResult<Response> {
    let leaderboard = services::get_leaderboard(state.store.as_ref())
        .await
        .map_err(WebError::LeaderboardUnavailable)?;

    Ok(Json(leaderboard).into_response())
}
