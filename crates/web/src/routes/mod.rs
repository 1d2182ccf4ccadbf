use axum::{Json, Router, http::Method, routing::get};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::WebError,
    features::{leaderboard, submissions},
    state::AppState,
};

pub fn configure(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let api = Router::new()
        .merge(leaderboard::routes::routes())
        .merge(submissions::routes::routes());

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> WebError {
    WebError::NotFound
}
