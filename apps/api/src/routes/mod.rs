pub mod health;
pub mod resumes;
pub mod sections;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sections", get(sections::handle_list_sections))
        .route("/api/v1/resumes", post(resumes::handle_create_resume))
        .route("/api/v1/resumes/:id", get(resumes::handle_get_resume))
        .route("/api/v1/resumes/:id/value", get(resumes::handle_get_value))
        .route("/api/v1/resumes/:id/edits", post(resumes::handle_edit))
        .route("/api/v1/resumes/:id/drag", post(resumes::handle_drag))
        .route(
            "/api/v1/resumes/:id/session",
            delete(resumes::handle_close_session),
        )
        .route("/api/v1/resumes/:id/palette", get(sections::handle_palette))
        .route("/api/v1/resumes/:id/history", get(resumes::handle_history))
        .route(
            "/api/v1/resumes/:id/export.md",
            get(resumes::handle_export_markdown),
        )
        .with_state(state)
}
