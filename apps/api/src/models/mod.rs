pub mod document;
pub mod resume;
pub mod sanitize;
pub mod section;

use std::sync::Arc;

pub use document::{
    Achievement, CustomSection, Document, Education, Experience, PersonalInfo, Skill, Strength,
};
pub use section::{Section, SectionData, SectionList, SectionType};

/// A persistent list: cloning or editing one element shares every other element.
pub type List<T> = Arc<Vec<Arc<T>>>;

pub fn list<T>(items: impl IntoIterator<Item = T>) -> List<T> {
    Arc::new(items.into_iter().map(Arc::new).collect())
}

/// Opaque handle for a new list item or section.
pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
