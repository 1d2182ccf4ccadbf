use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use storage::dto::{
    common::ErrorResponse,
    submission::{SubmitRequest, SubmitResponse},
};

use crate::{
    error::{WebError, WebResult},
    state::AppState,
};

use super::services;

#[utoipa::path(
    post,
    path = "/api/submit",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Submission applied; action tells whether the record was created, updated or kept", body = SubmitResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Submission could not be stored", body = ErrorResponse)
    ),
    tag = "submissions"
)]
pub async fn submit_time(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> WebResult<Response> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected submission body: {}", e.body_text());
        WebError::BadRequest("Invalid request body".to_string())
    })?;

    let submission = req.validate()?;

    let today = chrono::Local::now().date_naive();
    let outcome = services::submit_time(state.store.as_ref(), state.policy, submission, today).await?;

    Ok(Json(SubmitResponse::from_outcome(&outcome)).into_response())
}
