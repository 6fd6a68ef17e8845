//! v1 API endpoints

pub mod chat;
pub mod incidents;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/incidents",
            post(incidents::start_incident).get(incidents::list_incidents),
        )
        .route(
            "/incidents/{case_id}",
            get(incidents::get_incident).delete(incidents::abandon_incident),
        )
        .route(
            "/incidents/{case_id}/decision",
            post(incidents::submit_decision),
        )
        .route("/chat/route", post(chat::route_query))
}
