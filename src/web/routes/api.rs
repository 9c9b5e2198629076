//! REST API route definitions.

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::handlers::loops;
use crate::web::state::WebAppState;

/// Build the API router with all REST endpoints.
pub fn api_routes() -> Router<WebAppState> {
    Router::new()
        // Loop routes
        .route("/loops", get(loops::list_loops))
        .route("/loops", post(loops::create_loop))
        .route("/loops/{id}", get(loops::get_loop))
        .route("/loops/{id}/explain", post(loops::explain_loop))
        .route("/loops/{id}/fork", post(loops::fork_loop))
}
