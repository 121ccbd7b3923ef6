use std::sync::Arc;

use serde_json::Value;

use crate::editing::widgets::{Binding, DateField, ItemList, TagList, TextField};
use crate::editing::EditContext;
use crate::models::Document;
use crate::path::{resolve, Path};
use crate::sections::section_path;

/// What a component receives from its parent: a document snapshot, the path
/// it was placed at, and (when editable) the context to write through.
#[derive(Clone)]
pub struct EditScope {
    context: Option<Arc<EditContext>>,
    document: Arc<Document>,
    base: Path,
}

impl EditScope {
    /// Root scope over the live document of `context`.
    pub fn editable(context: Arc<EditContext>) -> Self {
        Self {
            document: context.document(),
            context: Some(context),
            base: Path::root(),
        }
    }

    /// Root scope for export and preview. Widgets created from it have no path.
    pub fn read_only(document: Arc<Document>) -> Self {
        Self {
            context: None,
            document,
            base: Path::root(),
        }
    }

    pub fn is_editable(&self) -> bool {
        self.context.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.base
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn field(&self, name: &str) -> Self {
        self.at(self.base.field(name))
    }

    pub fn index(&self, index: usize) -> Self {
        self.at(self.base.index(index))
    }

    /// Scope of `dynamicSections[index]`, independent of where `self` sits.
    pub fn section(&self, index: usize) -> Self {
        self.at(section_path(index))
    }

    /// Value at this scope's path in the snapshot.
    pub fn value(&self) -> Option<Value> {
        resolve(self.document.as_ref(), &self.base)
    }

    pub fn text(&self, name: &str) -> TextField {
        let child = self.field(name);
        TextField::new(child.value(), child.binding())
    }

    /// Month field `name`.
    pub fn date(&self, name: &str) -> DateField {
        let child = self.field(name);
        DateField::new(child.value(), false, child.binding())
    }

    /// End-date field `name`. Displays as "Present" while the sibling
    /// `current` flag is set.
    pub fn end_date(&self, name: &str) -> DateField {
        let child = self.field(name);
        let present = self
            .field("current")
            .value()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        DateField::new(child.value(), present, child.binding())
    }

    pub fn list(&self, name: &str) -> ItemList {
        let child = self.field(name);
        ItemList::new(child.value(), child.binding())
    }

    pub fn tags(&self, name: &str) -> TagList {
        let child = self.field(name);
        TagList::new(child.value(), child.binding())
    }

    fn at(&self, base: Path) -> Self {
        Self {
            context: self.context.clone(),
            document: Arc::clone(&self.document),
            base,
        }
    }

    fn binding(&self) -> Option<Binding> {
        self.context
            .as_ref()
            .map(|context| Binding::new(Arc::clone(context), self.base.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionType;
    use crate::sections::add_section;
    use serde_json::json;

    fn context() -> Arc<EditContext> {
        let doc: Document = serde_json::from_value(json!({
            "personalInfo": { "fullName": "Ada" },
            "experience": [
                { "id": "e1", "company": "Acme", "startDate": "2019-02", "endDate": "", "current": true }
            ]
        }))
        .unwrap();
        let (doc, _) = add_section(&doc, SectionType::Languages).unwrap();
        Arc::new(EditContext::new(doc))
    }

    #[test]
    fn test_child_scopes_build_paths() {
        let scope = EditScope::editable(context());
        let bullet = scope.field("experience").index(0).field("bulletPoints").index(2);
        assert_eq!(bullet.path().to_string(), "experience[0].bulletPoints[2]");
        let items = scope.field("experience").section(0).field("data").field("items");
        assert_eq!(items.path().to_string(), "dynamicSections[0].data.items");
    }

    #[test]
    fn test_text_widget_edits_through_context() {
        let ctx = context();
        let scope = EditScope::editable(Arc::clone(&ctx));
        let mut name = scope.field("personalInfo").text("fullName");
        assert_eq!(name.value(), "Ada");
        assert_eq!(name.path().map(Path::to_string).as_deref(), Some("personalInfo.fullName"));
        assert!(name.commit("Ada Lovelace"));
        assert_eq!(ctx.document().personal_info.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_date_widget_reads_current_flag() {
        let scope = EditScope::editable(context());
        let job = scope.field("experience").index(0);
        assert_eq!(job.date("startDate").display(), "Feb 2019");
        assert_eq!(job.end_date("endDate").display(), "Present");
        assert_eq!(job.date("endDate").display(), "");
    }

    #[test]
    fn test_section_item_list_adds_default() {
        let ctx = context();
        let scope = EditScope::editable(Arc::clone(&ctx));
        let mut items = scope.section(0).field("data").list("items");
        assert!(items.is_empty());
        assert!(items.add_default(SectionType::Languages));
        let doc = ctx.document();
        assert_eq!(doc.dynamic_sections[0].item_count(), 1);
    }

    #[test]
    fn test_read_only_scope_has_no_paths() {
        let doc = context().document();
        let scope = EditScope::read_only(doc);
        assert!(!scope.is_editable());
        let mut name = scope.field("personalInfo").text("fullName");
        assert_eq!(name.value(), "Ada");
        assert!(name.path().is_none());
        assert!(!name.commit("Grace"));
        let mut tags = scope.tags("skills");
        assert!(!tags.add("Go"));
    }
}
