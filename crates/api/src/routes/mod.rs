pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /analyses                     submit (POST)
/// /analyses/{id}                poll status and live buffers (GET)
/// /analyses/{id}/cancel         request cancellation (POST)
/// /analyses/{id}/coaching       coaching report from stored aggregates (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/analyses", post(handlers::analyses::submit_analysis))
        .route("/analyses/{id}", get(handlers::analyses::get_analysis))
        .route(
            "/analyses/{id}/cancel",
            post(handlers::analyses::cancel_analysis),
        )
        .route(
            "/analyses/{id}/coaching",
            post(handlers::analyses::coaching_report),
        )
}
