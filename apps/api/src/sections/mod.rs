//! Section gestures on `dynamicSections`: add from the palette, add an item,
//! reorder, toggle, remove. Each one is a pure document transform built on the
//! mutation engine and the registry.

pub mod drag;
pub mod registry;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::engine::{self, MutationError};
use crate::models::{Document, SectionType};
use crate::path::Path;

pub use registry::{dispatch, palette, spec, SectionSpec, SectionVisitor, REGISTRY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("a '{0}' section is already on the resume")]
    AlreadyAdded(SectionType),

    #[error("no section at index {index} (there are {len})")]
    NoSuchSection { index: usize, len: usize },

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

pub fn sections_path() -> Path {
    Path::root().field("dynamicSections")
}

pub fn section_path(index: usize) -> Path {
    sections_path().index(index)
}

/// Appends a new, empty section of `tag`. Returns the new document and the
/// section's id.
pub fn add_section(doc: &Document, tag: SectionType) -> Result<(Document, String), SectionError> {
    let spec = spec(tag);
    if !spec.repeatable && doc.dynamic_sections.contains_type(tag) {
        return Err(SectionError::AlreadyAdded(tag));
    }
    let section = spec.new_section(doc.dynamic_sections.len() as u32);
    let id = section.id.clone();
    let value = serde_json::to_value(&section)
        .map_err(|e| MutationError::InvalidValue {
            path: sections_path().to_string(),
            reason: e.to_string(),
        })?;
    let next = engine::add_array_item(doc, &sections_path(), value)?;
    info!(section_id = %id, section_type = %tag, "Added section");
    Ok((next, id))
}

/// Appends the registry's default item to the section at `index`.
pub fn add_section_item(doc: &Document, index: usize) -> Result<Document, SectionError> {
    let section = doc
        .dynamic_sections
        .get(index)
        .ok_or(SectionError::NoSuchSection {
            index,
            len: doc.dynamic_sections.len(),
        })?;
    let item = spec(section.section_type).default_item();
    add_section_item_value(doc, index, item)
}

/// Appends `item` to the section at `index`.
pub fn add_section_item_value(
    doc: &Document,
    index: usize,
    item: Value,
) -> Result<Document, SectionError> {
    let path = section_path(index).field("data").field("items");
    Ok(engine::add_array_item(doc, &path, item)?)
}

pub fn remove_section(doc: &Document, index: usize) -> Result<Document, SectionError> {
    Ok(engine::remove_array_item(doc, &sections_path(), index)?)
}

pub fn move_section(doc: &Document, from: usize, to: usize) -> Result<Document, SectionError> {
    Ok(engine::move_array_item(doc, &sections_path(), from, to)?)
}

pub fn set_section_enabled(
    doc: &Document,
    index: usize,
    enabled: bool,
) -> Result<Document, SectionError> {
    let path = section_path(index).field("enabled");
    Ok(engine::update_field(doc, &path, Value::Bool(enabled))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::resolve;
    use serde_json::json;

    fn with_sections(tags: &[SectionType]) -> Document {
        tags.iter().fold(Document::default(), |doc, tag| {
            add_section(&doc, *tag).unwrap().0
        })
    }

    #[test]
    fn test_certification_lifecycle() {
        let (doc, _) = add_section(&Document::default(), SectionType::Certifications).unwrap();
        assert_eq!(doc.dynamic_sections[0].item_count(), 0);

        let doc = add_section_item_value(&doc, 0, json!({ "id": "c1", "name": "AWS SA" })).unwrap();
        let doc = add_section_item_value(&doc, 0, json!({ "id": "c2", "name": "PMP" })).unwrap();
        let items = section_path(0).field("data").field("items");
        let doc = engine::remove_array_item(&doc, &items, 0).unwrap();

        let names = resolve(&doc, &items).unwrap();
        assert_eq!(names[0]["name"], json!("PMP"));
        assert_eq!(names.as_array().map(Vec::len), Some(1));
        assert_eq!(doc.dynamic_sections[0].order, 0);
    }

    #[test]
    fn test_single_instance_tags_rejected_twice() {
        let doc = with_sections(&[SectionType::Languages]);
        assert_eq!(
            add_section(&doc, SectionType::Languages).unwrap_err(),
            SectionError::AlreadyAdded(SectionType::Languages)
        );
        let doc = with_sections(&[SectionType::Custom, SectionType::Custom]);
        assert_eq!(doc.dynamic_sections.len(), 2);
    }

    #[test]
    fn test_add_section_item_uses_registry_default() {
        let doc = with_sections(&[SectionType::Patents]);
        let doc = add_section_item(&doc, 0).unwrap();
        let status = resolve(&doc, &Path::parse("dynamicSections[0].data.items[0].status").unwrap());
        assert_eq!(status, Some(json!("Pending")));
    }

    #[test]
    fn test_add_item_to_missing_section() {
        assert_eq!(
            add_section_item(&Document::default(), 2).unwrap_err(),
            SectionError::NoSuchSection { index: 2, len: 0 }
        );
    }

    #[test]
    fn test_move_section_reindexes() {
        use SectionType::*;
        let doc = with_sections(&[Awards, Patents, Speaking, Portfolio]);
        let ids: Vec<String> = doc.dynamic_sections.iter().map(|s| s.id.clone()).collect();
        let moved = move_section(&doc, 0, 2).unwrap();
        let after: Vec<&str> = moved.dynamic_sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(after, [&ids[1], &ids[2], &ids[0], &ids[3]].map(String::as_str));
        assert_eq!(moved.dynamic_sections.orders(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_remove_then_toggle() {
        let doc = with_sections(&[SectionType::Awards, SectionType::Custom]);
        let doc = remove_section(&doc, 0).unwrap();
        assert_eq!(doc.dynamic_sections.orders(), vec![0]);
        let doc = set_section_enabled(&doc, 0, false).unwrap();
        assert!(!doc.dynamic_sections[0].enabled);
    }
}
