pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST /media                upload one file (multipart `file`)
/// POST /generate             submit a generation request
/// GET  /operations/{id}      vendor operation status
/// GET  /worlds/{id}          world id and viewer URL
/// GET  /tours                tours resolved by this server
/// POST /tours                resolve a finished operation into a tour
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/media", post(handlers::media::upload))
        .route("/generate", post(handlers::generation::generate))
        .route("/operations/{id}", get(handlers::operations::get_operation))
        .route("/worlds/{id}", get(handlers::worlds::get_world))
        .route(
            "/tours",
            get(handlers::tours::list_tours).post(handlers::tours::create_tour),
        )
}
