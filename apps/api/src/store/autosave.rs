//! Debounced background save.
//!
//! One task per session follows the context's revision channel. After the
//! first change it waits until no further change has arrived for the debounce
//! window, then saves the snapshot current at that moment. A failed save is
//! logged and retried on the next change; it never touches the document.
//!
//! [`Autosave::flush`] saves whatever the task has not saved yet, for closing
//! a session without losing the edits of the last debounce window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editing::EditContext;
use crate::store::{ResumeStore, StoreError};

/// Handle to a running autosave task. Dropping it stops the task.
pub struct Autosave {
    id: Uuid,
    saved: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl Autosave {
    /// Last revision known to be in the store.
    pub fn saved_revision(&self) -> u64 {
        self.saved.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Saves the current document now if it is ahead of the store. Returns the
    /// new version, or `None` when there was nothing to save.
    pub async fn flush(
        &self,
        context: &EditContext,
        store: &dyn ResumeStore,
    ) -> Result<Option<i32>, StoreError> {
        let revision = context.revision();
        if revision == self.saved_revision() {
            return Ok(None);
        }
        let version = store.save(self.id, &context.document(), revision).await?;
        self.saved.fetch_max(revision, Ordering::AcqRel);
        info!(resume_id = %self.id, version, revision, "Flushed resume");
        Ok(Some(version))
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_autosave(
    id: Uuid,
    context: &Arc<EditContext>,
    store: Arc<dyn ResumeStore>,
    debounce: Duration,
) -> Autosave {
    let mut changes = context.subscribe();
    let context: Weak<EditContext> = Arc::downgrade(context);
    let saved = Arc::new(AtomicU64::new(*changes.borrow_and_update()));
    let last_saved = Arc::clone(&saved);

    let task = tokio::spawn(async move {
        loop {
            if changes.changed().await.is_err() {
                break;
            }
            loop {
                match tokio::time::timeout(debounce, changes.changed()).await {
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) => return,
                    Err(_) => break,
                }
            }

            let revision = *changes.borrow_and_update();
            if revision <= last_saved.load(Ordering::Acquire) {
                continue;
            }
            let Some(context) = context.upgrade() else {
                break;
            };
            let document = context.document();
            drop(context);

            match store.save(id, &document, revision).await {
                Ok(version) => {
                    info!(resume_id = %id, version, revision, "Autosaved resume");
                    last_saved.fetch_max(revision, Ordering::AcqRel);
                }
                Err(e) => warn!(resume_id = %id, revision, error = %e, "Autosave failed"),
            }
        }
        debug!(resume_id = %id, "Autosave stopped");
    });

    Autosave { id, saved, task }
}
