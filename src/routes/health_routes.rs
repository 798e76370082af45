use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::models::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Touches the pool — lazily connecting on first use — and reports the outcome.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.db.pool().await {
        Ok(_) => Json(HealthResponse {
            ok: true,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse {
                ok: false,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}
