use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod dictionary_routes;
pub mod health_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", health_routes::router())
        .nest("/api", dictionary_routes::router())
        .nest("/api", appointment_routes::router())
        .with_state(state)
}
