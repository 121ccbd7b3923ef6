//! The live document of one editing session.
//!
//! `EditContext` owns exactly one [`Document`] behind an [`ArcSwap`]. Readers
//! take a snapshot and keep it as long as they like; writers hand a pure
//! transform to [`EditContext::apply`], which swaps the whole document in one
//! step. A monotonically increasing revision is published on a
//! `tokio::sync::watch` channel so background tasks (autosave) can follow
//! changes without polling.
//!
//! Mutation entry points never panic and never leave a half-applied edit:
//! a rejected edit is logged, the document stays as it was, and the error is
//! returned for callers that want it.

use std::fmt::Display;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::engine::{self, MutationError};
use crate::models::Document;
use crate::path::{resolve, Path};

pub struct EditContext {
    document: ArcSwap<Document>,
    revision: watch::Sender<u64>,
}

impl EditContext {
    pub fn new(document: Document) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            document: ArcSwap::from_pointee(document),
            revision,
        }
    }

    /// Current snapshot. Never observes a partially applied edit.
    pub fn document(&self) -> Arc<Document> {
        self.document.load_full()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that is notified whenever an edit changes the document.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn resolve(&self, path: &Path) -> Option<Value> {
        resolve(&**self.document.load(), path)
    }

    pub fn update_field(&self, path: &Path, value: Value) -> Result<u64, MutationError> {
        self.apply("update_field", |doc| {
            engine::update_field(doc, path, value.clone())
        })
    }

    pub fn add_array_item(&self, path: &Path, item: Value) -> Result<u64, MutationError> {
        self.apply("add_array_item", |doc| {
            engine::add_array_item(doc, path, item.clone())
        })
    }

    pub fn remove_array_item(&self, path: &Path, index: usize) -> Result<u64, MutationError> {
        self.apply("remove_array_item", |doc| {
            engine::remove_array_item(doc, path, index)
        })
    }

    pub fn move_array_item(
        &self,
        path: &Path,
        from: usize,
        to: usize,
    ) -> Result<u64, MutationError> {
        self.apply("move_array_item", |doc| {
            engine::move_array_item(doc, path, from, to)
        })
    }

    /// Runs `edit` against the current document and publishes the result.
    ///
    /// `edit` must not have effects beyond the document it returns: under
    /// contention it may run more than once. The revision only advances when
    /// the result differs from the input.
    pub fn apply<E, F>(&self, label: &'static str, mut edit: F) -> Result<u64, E>
    where
        E: Display,
        F: FnMut(&Document) -> Result<Document, E>,
    {
        let mut outcome: Result<bool, E> = Ok(false);
        self.document.rcu(|current| match edit(&**current) {
            Ok(next) if next.shares_all(&**current) => {
                outcome = Ok(false);
                Arc::clone(current)
            }
            Ok(next) => {
                outcome = Ok(true);
                Arc::new(next)
            }
            Err(error) => {
                outcome = Err(error);
                Arc::clone(current)
            }
        });

        match outcome {
            Ok(true) => {
                self.revision.send_modify(|revision| *revision += 1);
                let revision = self.revision();
                debug!(edit = label, revision, "Document updated");
                Ok(revision)
            }
            Ok(false) => Ok(self.revision()),
            Err(error) => {
                warn!(edit = label, %error, "Edit rejected; document unchanged");
                Err(error)
            }
        }
    }

    /// Replaces the whole document, e.g. after loading a stored version.
    pub fn replace(&self, document: Document) -> u64 {
        self.document.store(Arc::new(document));
        self.revision.send_modify(|revision| *revision += 1);
        self.revision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    #[test]
    fn test_edit_bumps_revision_and_swaps_snapshot() {
        let ctx = EditContext::new(Document::default());
        let before = ctx.document();
        let revision = ctx
            .update_field(&p("personalInfo.fullName"), json!("Jane Doe"))
            .unwrap();
        assert_eq!(revision, 1);
        assert_eq!(before.personal_info.full_name, "");
        assert_eq!(ctx.resolve(&p("personalInfo.fullName")), Some(json!("Jane Doe")));
    }

    #[test]
    fn test_rejected_edit_leaves_document_alone() {
        let ctx = EditContext::new(Document::default());
        let before = ctx.document();
        let err = ctx.remove_array_item(&p("skills"), 0).unwrap_err();
        assert!(matches!(err, MutationError::IndexOutOfRange { .. }));
        assert_eq!(ctx.revision(), 0);
        assert!(Arc::ptr_eq(&before, &ctx.document()));
    }

    #[test]
    fn test_noop_edit_keeps_revision() {
        let ctx = EditContext::new(Document::default());
        let revision = ctx
            .add_array_item(&p("personalInfo.email"), json!("x"))
            .unwrap();
        assert_eq!(revision, 0);
    }

    #[test]
    fn test_add_then_remove_skill_from_empty() {
        let ctx = EditContext::new(Document::default());
        ctx.add_array_item(&p("skills"), json!({ "id": "x", "name": "Go" }))
            .unwrap();
        ctx.remove_array_item(&p("skills"), 0).unwrap();
        assert!(ctx.document().skills.is_empty());
        assert_eq!(ctx.revision(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_new_revisions() {
        let ctx = EditContext::new(Document::default());
        let mut rx = ctx.subscribe();
        ctx.update_field(&p("personalInfo.title"), json!("Engineer"))
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn test_replace_publishes_revision() {
        let ctx = EditContext::new(Document::default());
        let mut next = Document::default();
        next.include_social_links = false;
        assert_eq!(ctx.replace(next), 1);
        assert!(!ctx.document().include_social_links);
    }
}
