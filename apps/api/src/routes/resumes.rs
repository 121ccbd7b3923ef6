use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::editing::EditScope;
use crate::errors::AppError;
use crate::models::resume::ResumeVersionRow;
use crate::models::sanitize::load_document;
use crate::models::{Document, SectionType};
use crate::path::Path as DocPath;
use crate::render::render_markdown;
use crate::sections::drag::{DragSource, DropOutcome, DropZone, Point};
use crate::sections::{self, SectionError};
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct CreateResumeRequest {
    pub document: Option<Value>,
}

#[derive(Serialize)]
pub struct ResumeResponse {
    pub id: Uuid,
    pub revision: u64,
    pub document: Arc<Document>,
}

#[derive(Deserialize)]
pub struct ValueQuery {
    pub path: String,
}

#[derive(Serialize)]
pub struct ValueResponse {
    pub path: String,
    pub value: Value,
}

/// One edit. Paths use the document path grammar (`experience[0].company`).
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditRequest {
    UpdateField {
        path: String,
        value: Value,
    },
    AddItem {
        path: String,
        item: Value,
    },
    RemoveItem {
        path: String,
        index: usize,
    },
    MoveItem {
        path: String,
        from: usize,
        to: usize,
    },
    AddSection {
        #[serde(rename = "type")]
        tag: SectionType,
    },
    /// Appends `item`, or the registry default when absent.
    AddSectionItem {
        index: usize,
        item: Option<Value>,
    },
    MoveSection {
        from: usize,
        to: usize,
    },
    RemoveSection {
        index: usize,
    },
    SetSectionEnabled {
        index: usize,
        enabled: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DragRequest {
    Begin { source: DragSource },
    Cancel,
    Drop { pointer: Point, zone: DropZone },
}

#[derive(Serialize)]
pub struct DragResponse {
    pub revision: u64,
    pub active: Option<DragSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DropOutcome>,
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    body: Option<Json<CreateResumeRequest>>,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let document = match request.document {
        Some(raw) => load_document(raw).map_err(|e| AppError::Validation(e.to_string()))?,
        None => Document::default(),
    };
    let session = state.sessions.create(document).await?;
    Ok((
        StatusCode::CREATED,
        Json(ResumeResponse {
            id: session.id,
            revision: session.context.revision(),
            document: session.context.document(),
        }),
    ))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeResponse>, AppError> {
    let session = state.sessions.open(id).await?;
    Ok(Json(ResumeResponse {
        id,
        revision: session.context.revision(),
        document: session.context.document(),
    }))
}

/// GET /api/v1/resumes/:id/value?path=...
pub async fn handle_get_value(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ValueQuery>,
) -> Result<Json<ValueResponse>, AppError> {
    let path = DocPath::parse(&query.path)?;
    let session = state.sessions.open(id).await?;
    let value = session
        .context
        .resolve(&path)
        .ok_or_else(|| AppError::NotFound(format!("nothing at '{}'", query.path)))?;
    Ok(Json(ValueResponse {
        path: query.path,
        value,
    }))
}

/// POST /api/v1/resumes/:id/edits
pub async fn handle_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let session = state.sessions.open(id).await?;
    let ctx = &session.context;
    let mut section_id = None;

    let revision = match request {
        EditRequest::UpdateField { path, value } => {
            ctx.update_field(&DocPath::parse(&path)?, value)?
        }
        EditRequest::AddItem { path, item } => ctx.add_array_item(&DocPath::parse(&path)?, item)?,
        EditRequest::RemoveItem { path, index } => {
            ctx.remove_array_item(&DocPath::parse(&path)?, index)?
        }
        EditRequest::MoveItem { path, from, to } => {
            ctx.move_array_item(&DocPath::parse(&path)?, from, to)?
        }
        EditRequest::AddSection { tag } => ctx.apply("add_section", |doc| {
            let (next, id) = sections::add_section(doc, tag)?;
            section_id = Some(id);
            Ok::<_, SectionError>(next)
        })?,
        EditRequest::AddSectionItem { index, item } => ctx.apply("add_section_item", |doc| {
            match &item {
                Some(item) => sections::add_section_item_value(doc, index, item.clone()),
                None => sections::add_section_item(doc, index),
            }
        })?,
        EditRequest::MoveSection { from, to } => {
            ctx.apply("move_section", |doc| sections::move_section(doc, from, to))?
        }
        EditRequest::RemoveSection { index } => {
            ctx.apply("remove_section", |doc| sections::remove_section(doc, index))?
        }
        EditRequest::SetSectionEnabled { index, enabled } => {
            ctx.apply("set_section_enabled", |doc| {
                sections::set_section_enabled(doc, index, enabled)
            })?
        }
    };

    Ok(Json(EditResponse {
        revision,
        section_id,
    }))
}

/// POST /api/v1/resumes/:id/drag
pub async fn handle_drag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragRequest>,
) -> Result<Json<DragResponse>, AppError> {
    let session = state.sessions.open(id).await?;
    let mut drag = session
        .drag
        .lock()
        .map_err(|_| AppError::Internal(anyhow!("drag state for resume {id} is poisoned")))?;

    let outcome = match request {
        DragRequest::Begin { source } => {
            drag.begin(&session.context, source)?;
            None
        }
        DragRequest::Cancel => {
            drag.cancel();
            None
        }
        DragRequest::Drop { pointer, zone } => Some(drag.release(&session.context, pointer, &zone)?),
    };

    Ok(Json(DragResponse {
        revision: session.context.revision(),
        active: drag.active().cloned(),
        outcome,
    }))
}

/// DELETE /api/v1/resumes/:id/session
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let closed = state.sessions.close(id).await?;
    Ok(Json(serde_json::json!({ "closed": closed })))
}

/// GET /api/v1/resumes/:id/history
pub async fn handle_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ResumeVersionRow>>, AppError> {
    let history = state.sessions.store().history(id).await?;
    Ok(Json(history))
}

/// GET /api/v1/resumes/:id/export.md
pub async fn handle_export_markdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.open(id).await?;
    let markdown = render_markdown(&EditScope::read_only(session.context.document()));
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    ))
}
