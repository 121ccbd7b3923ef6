//! Load normalization for stored snapshots.
//!
//! Documents saved by older clients may still carry free-text experience
//! descriptions, skills without a level or category, or sections whose
//! `order` drifted. Everything here runs once, when a snapshot is loaded, and
//! is idempotent.
//!
//! Algorithm:
//!   1. Experience: when no bullet point has visible text, split `description`
//!      into trimmed non-empty lines and use those as bullet points. The
//!      description is always cleared afterwards.
//!   2. Skills: missing `level` becomes 10, missing `category` becomes "core".
//!   3. Dynamic sections: stable-sorted by `order`, then reindexed `0..len`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::models::document::{Document, Experience, Skill};
use crate::models::section::SectionList;
use crate::models::List;

pub const DEFAULT_SKILL_LEVEL: u8 = 10;
pub const DEFAULT_SKILL_CATEGORY: &str = "core";

/// Parses a stored snapshot and normalizes it.
pub fn load_document(value: Value) -> Result<Document, serde_json::Error> {
    let document: Document = serde_json::from_value(value)?;
    Ok(sanitize(document))
}

pub fn sanitize(mut document: Document) -> Document {
    document.experience = map_changed(&document.experience, migrate_experience);
    document.skills = map_changed(&document.skills, fill_skill_defaults);

    let sorted = SectionList::from_sections(
        document
            .dynamic_sections
            .sorted_by_order()
            .into_iter()
            .map(|s| (*s).clone()),
    );
    if sorted.iter().map(|s| &s.id).ne(document.dynamic_sections.iter().map(|s| &s.id))
        || !document.dynamic_sections.is_dense()
    {
        debug!(
            sections = sorted.len(),
            "Reordered dynamic sections on load"
        );
        document.dynamic_sections = sorted;
    }

    document
}

/// Applies `f` to every element, reusing the original `Arc` wherever `f`
/// returns `None` (nothing to change).
fn map_changed<T>(items: &List<T>, f: impl Fn(&T) -> Option<T>) -> List<T> {
    let mut changed = false;
    let next: Vec<Arc<T>> = items
        .iter()
        .map(|item| match f(&**item) {
            Some(fixed) => {
                changed = true;
                Arc::new(fixed)
            }
            None => Arc::clone(item),
        })
        .collect();
    if changed {
        Arc::new(next)
    } else {
        Arc::clone(items)
    }
}

fn migrate_experience(exp: &Experience) -> Option<Experience> {
    if exp.description.is_empty() {
        return None;
    }
    let mut next = exp.clone();
    let has_bullets = exp.bullet_points.iter().any(|b| !b.trim().is_empty());
    if !has_bullets && !exp.description.trim().is_empty() {
        next.bullet_points = exp
            .description
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!(
            id = %exp.id,
            bullets = next.bullet_points.len(),
            "Migrated experience description to bullet points"
        );
    }
    next.description.clear();
    Some(next)
}

fn fill_skill_defaults(skill: &Skill) -> Option<Skill> {
    if skill.level.is_some() && skill.category.is_some() {
        return None;
    }
    let mut next = skill.clone();
    next.level.get_or_insert(DEFAULT_SKILL_LEVEL);
    next.category
        .get_or_insert_with(|| DEFAULT_SKILL_CATEGORY.to_string());
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_description_becomes_bullet_points() {
        let doc = load_document(json!({
            "experience": [{
                "id": "e1",
                "description": "  Led the team \n\n Cut costs by 30%  \n",
                "bulletPoints": ["", "  "]
            }]
        }))
        .unwrap();
        let exp = &doc.experience[0];
        assert_eq!(exp.bullet_points, vec!["Led the team", "Cut costs by 30%"]);
        assert_eq!(exp.description, "");
    }

    #[test]
    fn test_existing_bullets_win_over_description() {
        let doc = load_document(json!({
            "experience": [{
                "id": "e1",
                "description": "old text",
                "bulletPoints": ["Shipped v2", ""]
            }]
        }))
        .unwrap();
        let exp = &doc.experience[0];
        assert_eq!(exp.bullet_points, vec!["Shipped v2", ""]);
        assert_eq!(exp.description, "");
    }

    #[test]
    fn test_skill_defaults_filled() {
        let doc = load_document(json!({
            "skills": [
                { "id": "s1", "name": "Go" },
                { "id": "s2", "name": "SQL", "level": 6, "category": "toolbox" }
            ]
        }))
        .unwrap();
        assert_eq!(doc.skills[0].level, Some(10));
        assert_eq!(doc.skills[0].category.as_deref(), Some("core"));
        assert_eq!(doc.skills[1].level, Some(6));
        assert_eq!(doc.skills[1].category.as_deref(), Some("toolbox"));
    }

    #[test]
    fn test_sections_sorted_and_reindexed() {
        let doc = load_document(json!({
            "dynamicSections": [
                { "id": "b", "type": "awards", "order": 7, "enabled": true, "title": "Awards",
                  "data": { "type": "awards", "items": [] } },
                { "id": "a", "type": "patents", "order": 2, "enabled": true, "title": "Patents",
                  "data": { "type": "patents", "items": [] } }
            ]
        }))
        .unwrap();
        let ids: Vec<&str> = doc.dynamic_sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(doc.dynamic_sections.orders(), vec![0, 1]);
    }

    #[test]
    fn test_clean_document_is_shared() {
        let doc = load_document(json!({
            "skills": [{ "id": "s1", "name": "Go", "level": 3, "category": "core" }]
        }))
        .unwrap();
        let again = sanitize(doc.clone());
        assert!(doc.shares_all(&again));
    }

    #[test]
    fn test_corrupt_section_rejected() {
        let result = load_document(json!({
            "dynamicSections": [
                { "id": "x", "type": "awards", "data": { "type": "custom", "content": "" } }
            ]
        }));
        assert!(result.is_err());
    }
}
