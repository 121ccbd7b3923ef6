//! Leaf editing widgets.
//!
//! A widget holds the value it renders and, when the surrounding scope is
//! editable, a [`Binding`] to the location it writes. Widgets built from a
//! read-only scope have no binding: every edit call on them returns `false`
//! without touching anything.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::warn;

use crate::editing::EditContext;
use crate::models::new_item_id;
use crate::models::section::SectionType;
use crate::path::Path;
use crate::sections::spec;

pub const PRESENT: &str = "Present";
pub const NEW_TAG_NAME: &str = "New Skill";

/// Write handle for one document location.
#[derive(Clone)]
pub struct Binding {
    context: Arc<EditContext>,
    path: Path,
}

impl Binding {
    pub fn new(context: Arc<EditContext>, path: Path) -> Self {
        Self { context, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn set(&self, path: &Path, value: Value) -> bool {
        self.changed(|ctx| ctx.update_field(path, value))
    }

    fn append(&self, item: Value) -> bool {
        self.changed(|ctx| ctx.add_array_item(&self.path, item))
    }

    fn remove(&self, index: usize) -> bool {
        self.changed(|ctx| ctx.remove_array_item(&self.path, index))
    }

    /// True only when `edit` produced a new revision. Rejected edits and
    /// no-ops (e.g. appending to a scalar) both report `false`.
    fn changed<E>(&self, edit: impl FnOnce(&EditContext) -> Result<u64, E>) -> bool {
        let before = self.context.revision();
        matches!(edit(&self.context), Ok(after) if after != before)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text
// ────────────────────────────────────────────────────────────────────────────

pub struct TextField {
    value: String,
    binding: Option<Binding>,
}

impl TextField {
    pub fn new(value: Option<Value>, binding: Option<Binding>) -> Self {
        let value = match value {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self { value, binding }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value, or `placeholder` when empty.
    pub fn display<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if self.value.is_empty() {
            placeholder
        } else {
            &self.value
        }
    }

    pub fn is_editable(&self) -> bool {
        self.binding.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.binding.as_ref().map(Binding::path)
    }

    /// Writes `text` if it differs from the current value.
    pub fn commit(&mut self, text: &str) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        if text == self.value {
            return false;
        }
        let applied = binding.set(&binding.path, Value::String(text.to_string()));
        if applied {
            self.value = text.to_string();
        }
        applied
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Month dates
// ────────────────────────────────────────────────────────────────────────────

/// Parses a `YYYY-MM` month.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 7 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

/// `2020-01` → `Jan 2020`. Anything that is not a month is shown as is.
pub fn format_month(raw: &str) -> String {
    match parse_month(raw) {
        Some(date) => date.format("%b %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

pub struct DateField {
    value: String,
    present: bool,
    binding: Option<Binding>,
}

impl DateField {
    /// `present` marks an end date of an ongoing entry.
    pub fn new(value: Option<Value>, present: bool, binding: Option<Binding>) -> Self {
        let value = value
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            value,
            present,
            binding,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn display(&self) -> String {
        if self.present {
            PRESENT.to_string()
        } else {
            format_month(&self.value)
        }
    }

    pub fn is_editable(&self) -> bool {
        self.binding.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.binding.as_ref().map(Binding::path)
    }

    /// Writes a `YYYY-MM` month, or clears the date when `month` is empty.
    pub fn commit(&mut self, month: &str) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        let month = month.trim();
        if !month.is_empty() && parse_month(month).is_none() {
            warn!(path = %binding.path, month, "Ignoring date that is not YYYY-MM");
            return false;
        }
        if month == self.value {
            return false;
        }
        let applied = binding.set(&binding.path, Value::String(month.to_string()));
        if applied {
            self.value = month.to_string();
        }
        applied
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lists
// ────────────────────────────────────────────────────────────────────────────

/// A list of records or strings with add/remove affordances.
pub struct ItemList {
    items: Vec<Value>,
    binding: Option<Binding>,
}

impl ItemList {
    pub fn new(value: Option<Value>, binding: Option<Binding>) -> Self {
        let items = match value {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Self { items, binding }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_editable(&self) -> bool {
        self.binding.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.binding.as_ref().map(Binding::path)
    }

    pub fn add(&mut self, item: Value) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        let applied = binding.append(item.clone());
        if applied {
            self.items.push(item);
        }
        applied
    }

    /// Appends the registry's default item for a section of type `tag`.
    pub fn add_default(&mut self, tag: SectionType) -> bool {
        self.add(spec(tag).default_item())
    }

    pub fn remove(&mut self, index: usize) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        let applied = binding.remove(index);
        if applied && index < self.items.len() {
            self.items.remove(index);
        }
        applied
    }
}

/// Skill tags: `{id, name}` records edited by name only.
pub struct TagList {
    tags: Vec<(String, String)>,
    binding: Option<Binding>,
}

impl TagList {
    pub fn new(value: Option<Value>, binding: Option<Binding>) -> Self {
        let tags = match value {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let field = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or_default();
                    (field("id").to_string(), field("name").to_string())
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { tags, binding }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_editable(&self) -> bool {
        self.binding.is_some()
    }

    /// Adds a tag; a blank name becomes "New Skill".
    pub fn add(&mut self, name: &str) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        let name = match name.trim() {
            "" => NEW_TAG_NAME,
            trimmed => trimmed,
        };
        let id = new_item_id();
        let applied = binding.append(json!({ "id": id, "name": name }));
        if applied {
            self.tags.push((id, name.to_string()));
        }
        applied
    }

    /// Renames tag `index`. Blank names are ignored.
    pub fn rename(&mut self, index: usize, name: &str) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let path = binding.path.index(index).field("name");
        let applied = binding.set(&path, Value::String(name.to_string()));
        if applied {
            if let Some(tag) = self.tags.get_mut(index) {
                tag.1 = name.to_string();
            }
        }
        applied
    }

    pub fn remove(&mut self, index: usize) -> bool {
        let Some(binding) = &self.binding else {
            return false;
        };
        let applied = binding.remove(index);
        if applied && index < self.tags.len() {
            self.tags.remove(index);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn bound(raw: &str) -> (Arc<EditContext>, Binding) {
        let ctx = Arc::new(EditContext::new(Document::default()));
        let binding = Binding::new(Arc::clone(&ctx), Path::parse(raw).unwrap());
        (ctx, binding)
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month("2020-01"), "Jan 2020");
        assert_eq!(format_month("2023-12"), "Dec 2023");
        assert_eq!(format_month(""), "");
        assert_eq!(format_month("Summer 2019"), "Summer 2019");
        assert_eq!(format_month("2020-13"), "2020-13");
    }

    #[test]
    fn test_date_field_shows_present() {
        let field = DateField::new(Some(json!("2021-04")), true, None);
        assert_eq!(field.display(), "Present");
        let field = DateField::new(Some(json!("2021-04")), false, None);
        assert_eq!(field.display(), "Apr 2021");
    }

    #[test]
    fn test_date_field_rejects_bad_month() {
        let (ctx, binding) = bound("personalInfo.title");
        let mut field = DateField::new(None, false, Some(binding));
        assert!(!field.commit("04/2021"));
        assert!(field.commit("2021-04"));
        assert_eq!(ctx.document().personal_info.title, "2021-04");
    }

    #[test]
    fn test_text_field_commit() {
        let (ctx, binding) = bound("personalInfo.fullName");
        let mut field = TextField::new(None, Some(binding));
        assert_eq!(field.display("Your Name"), "Your Name");
        assert!(field.commit("Jane Doe"));
        assert!(!field.commit("Jane Doe"));
        assert_eq!(ctx.document().personal_info.full_name, "Jane Doe");
        assert_eq!(ctx.revision(), 1);
    }

    #[test]
    fn test_unbound_widgets_are_inert() {
        let mut text = TextField::new(Some(json!("Ada")), None);
        assert!(!text.is_editable());
        assert!(text.path().is_none());
        assert!(!text.commit("Grace"));
        assert_eq!(text.value(), "Ada");

        let mut list = ItemList::new(Some(json!(["a"])), None);
        assert!(!list.add(json!("b")));
        assert!(!list.remove(0));
        assert_eq!(list.len(), 1);

        let mut tags = TagList::new(Some(json!([{ "id": "1", "name": "Go" }])), None);
        assert!(!tags.rename(0, "Rust"));
        assert_eq!(tags.names().collect::<Vec<_>>(), ["Go"]);
    }

    #[test]
    fn test_tag_list_add_rename_remove() {
        let (ctx, binding) = bound("skills");
        let mut tags = TagList::new(Some(json!([])), Some(binding));
        assert!(tags.add("  "));
        assert!(tags.add("Rust"));
        assert!(tags.rename(0, " Go "));
        assert!(!tags.rename(1, "   "));
        let doc = ctx.document();
        assert_eq!(doc.skills[0].name, "Go");
        assert_eq!(doc.skills[1].name, "Rust");
        assert!(tags.remove(0));
        assert_eq!(ctx.document().skills.len(), 1);
        assert_eq!(tags.names().collect::<Vec<_>>(), ["Rust"]);
    }

    #[test]
    fn test_list_bound_to_scalar_stays_in_sync() {
        let (ctx, binding) = bound("personalInfo.fullName");
        let mut list = ItemList::new(None, Some(binding));
        assert!(!list.add(json!("x")));
        assert!(list.is_empty());
        assert_eq!(ctx.revision(), 0);
        assert_eq!(ctx.document().personal_info.full_name, "");

        let (_, binding) = bound("personalInfo.email");
        let mut tags = TagList::new(None, Some(binding));
        assert!(!tags.add("Rust"));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_item_list_remove_out_of_range_is_refused() {
        let (ctx, binding) = bound("skills");
        let mut list = ItemList::new(None, Some(binding));
        assert!(!list.remove(0));
        assert_eq!(ctx.revision(), 0);
    }
}
