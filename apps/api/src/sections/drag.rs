//! Drag-Reorder Engine.
//!
//! Models the section canvas gesture: pick up a palette card or a placed
//! section, move the pointer, drop. At most one drag is active at a time.
//!
//! Algorithm on drop:
//!   1. Pointer outside the canvas → nothing happens.
//!   2. Palette source → add a section of that tag at the end.
//!   3. Canvas source → find the drop target whose center is closest to the
//!      pointer; if it is a different section, move the dragged section to
//!      the target's index. The move reindexes every `order` in the same edit.
//!   4. Dropping a section onto itself, or cancelling, changes nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::editing::EditContext;
use crate::models::SectionType;
use crate::sections::{add_section, move_section, spec, SectionError};

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// A placed section as laid out on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub section_id: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub canvas: Rect,
    pub targets: Vec<DropTarget>,
}

/// Target whose center is nearest to `pointer`. Ties go to the earlier target.
pub fn closest_center(pointer: Point, targets: &[DropTarget]) -> Option<&DropTarget> {
    let distance = |t: &DropTarget| {
        let c = t.rect.center();
        (c.x - pointer.x).powi(2) + (c.y - pointer.y).powi(2)
    };
    targets.iter().fold(None, |best, target| match best {
        Some(b) if distance(b) <= distance(target) => Some(b),
        _ => Some(target),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Gesture
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DragSource {
    /// A palette card for a section type not yet placed (or `custom`).
    Library {
        #[serde(rename = "type")]
        tag: SectionType,
    },
    /// A section already on the canvas.
    Canvas {
        #[serde(rename = "sectionId")]
        section_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DropOutcome {
    Added {
        #[serde(rename = "sectionId")]
        section_id: String,
    },
    Moved { from: usize, to: usize },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("another drag is already in progress")]
    AlreadyActive,

    #[error("a '{0}' section is already on the resume")]
    AlreadyAdded(SectionType),

    #[error("no section with id '{0}'")]
    UnknownSection(String),

    #[error(transparent)]
    Section(#[from] SectionError),
}

/// Drag state for one canvas.
#[derive(Debug, Default)]
pub struct DragEngine {
    active: Option<DragSource>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&DragSource> {
        self.active.as_ref()
    }

    /// Picks up `source`. Palette cards for tags already placed cannot be
    /// picked up, and neither can sections that no longer exist.
    pub fn begin(&mut self, ctx: &EditContext, source: DragSource) -> Result<(), DragError> {
        if self.active.is_some() {
            return Err(DragError::AlreadyActive);
        }
        let doc = ctx.document();
        match &source {
            DragSource::Library { tag } => {
                if !spec(*tag).repeatable && doc.dynamic_sections.contains_type(*tag) {
                    return Err(DragError::AlreadyAdded(*tag));
                }
            }
            DragSource::Canvas { section_id } => {
                if doc.dynamic_sections.position_of(section_id).is_none() {
                    return Err(DragError::UnknownSection(section_id.clone()));
                }
            }
        }
        debug!(?source, "Drag started");
        self.active = Some(source);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(source) = self.active.take() {
            debug!(?source, "Drag cancelled");
        }
    }

    /// Ends the active drag at `pointer`. Without an active drag this is a no-op.
    pub fn release(
        &mut self,
        ctx: &EditContext,
        pointer: Point,
        zone: &DropZone,
    ) -> Result<DropOutcome, DragError> {
        let Some(source) = self.active.take() else {
            return Ok(DropOutcome::Ignored);
        };
        if !zone.canvas.contains(pointer) {
            debug!(?source, "Dropped outside the canvas");
            return Ok(DropOutcome::Ignored);
        }

        match source {
            DragSource::Library { tag } => {
                let mut added = None;
                ctx.apply("add_section", |doc| {
                    let (next, id) = add_section(doc, tag)?;
                    added = Some(id);
                    Ok::<_, SectionError>(next)
                })
                .map_err(|e| match e {
                    SectionError::AlreadyAdded(tag) => DragError::AlreadyAdded(tag),
                    other => DragError::Section(other),
                })?;
                let section_id = added.unwrap_or_default();
                info!(%section_id, section_type = %tag, "Section dropped from library");
                Ok(DropOutcome::Added { section_id })
            }
            DragSource::Canvas { section_id } => {
                let Some(target) = closest_center(pointer, &zone.targets) else {
                    return Ok(DropOutcome::Ignored);
                };
                if target.section_id == section_id {
                    return Ok(DropOutcome::Ignored);
                }
                let doc = ctx.document();
                let from = doc
                    .dynamic_sections
                    .position_of(&section_id)
                    .ok_or_else(|| DragError::UnknownSection(section_id.clone()))?;
                let to = doc
                    .dynamic_sections
                    .position_of(&target.section_id)
                    .ok_or_else(|| DragError::UnknownSection(target.section_id.clone()))?;
                ctx.apply("move_section", |doc| move_section(doc, from, to))?;
                info!(%section_id, from, to, "Section reordered");
                Ok(DropOutcome::Moved { from, to })
            }
        }
    }
}
