use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::sections::registry::PaletteEntry;
use crate::sections::{palette, SectionSpec, REGISTRY};
use crate::state::AppState;

/// GET /api/v1/sections
pub async fn handle_list_sections() -> Json<&'static [SectionSpec]> {
    Json(REGISTRY.as_slice())
}

/// GET /api/v1/resumes/:id/palette
pub async fn handle_palette(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaletteEntry>>, AppError> {
    let session = state.sessions.open(id).await?;
    let document = session.context.document();
    Ok(Json(palette(&document.dynamic_sections)))
}
