//! camwatch-api — HTTP status surface for camwatch.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | HTML status table |
//! | GET | `/api/v1/status` | Current state of every camera |
//! | GET | `/api/v1/status/{camera}` | Current state of one camera |
//! | GET | `/api/v1/history` | All transitions, oldest first |
//! | POST | `/api/v1/check` | Run a check cycle now |
//!
//! An on-demand check waits for any running periodic cycle to finish
//! first; cycles never overlap.

pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use camwatch_health::Scheduler;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<Scheduler>,
}

/// Build the complete router (JSON API + status page).
pub fn build_router(scheduler: Arc<Scheduler>) -> Router {
    let state = ApiState { scheduler };

    let api_routes = Router::new()
        .route("/status", get(handlers::status))
        .route("/status/{camera}", get(handlers::camera_status))
        .route("/history", get(handlers::history))
        .route("/check", post(handlers::check_now));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/", get(pages::status_page))
        .with_state(state)
}
