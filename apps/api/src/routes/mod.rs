pub mod auth;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::feedback::handlers as feedback;
use crate::interview::handlers as interview;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Candidate record
        .route(
            "/api/v1/candidate/extract",
            post(extraction::handle_extract),
        )
        .route(
            "/api/v1/candidate",
            get(session::handle_get_candidate).put(session::handle_replace_candidate),
        )
        // Interview agents
        .route("/api/v1/prompt", post(interview::handle_compose_prompt))
        .route(
            "/api/v1/agents",
            get(session::handle_list_agents).post(interview::handle_create_agent),
        )
        .route(
            "/api/v1/agents/:roll_no/select",
            post(session::handle_select_agent),
        )
        // Session marker
        .route("/api/v1/session", get(session::handle_get_session))
        .route("/api/v1/session/launch", post(session::handle_launch_session))
        .route("/api/v1/session/status", post(session::handle_update_status))
        .route("/api/v1/session/reset", post(session::handle_reset_session))
        // Feedback
        .route("/api/v1/feedback", get(feedback::handle_get_feedback))
        .route(
            "/api/v1/feedback/transcript",
            get(feedback::handle_download_transcript),
        )
        .route(
            "/api/v1/feedback/report",
            get(feedback::handle_download_report),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_password,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state)
}
