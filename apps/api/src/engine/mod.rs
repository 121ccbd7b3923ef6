//! Mutation engine: pure edits that turn one document into the next.
//!
//! Every operation takes the current document by reference and returns a new
//! one. Only the nodes on the root-to-target path are reallocated; every
//! untouched subtree stays pointer-identical to the input.
//!
//! Failure policy:
//!   - append/remove/move aimed at something that is not a list: no-op, the
//!     input is returned as is and a warning is logged
//!   - a segment naming something that does not exist: `Unresolved`
//!   - an index past the end of a list on any write: `IndexOutOfRange`
//!   - a value that does not deserialize into the target type: `InvalidValue`
//!   - a write to a section tag: `TagLocked`

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Document;
use crate::path::{Edit, Node, NodeFault, Path};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("'{path}' does not resolve: no '{segment}'")]
    Unresolved { path: String, segment: String },

    #[error("index {index} is out of range for '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("value for '{path}' does not fit: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("'{path}' writes the section tag '{field}'")]
    TagLocked { path: String, field: String },
}

impl MutationError {
    fn from_fault(path: &Path, fault: NodeFault) -> Self {
        let path = path.to_string();
        match fault {
            NodeFault::Missing(segment) => MutationError::Unresolved { path, segment },
            NodeFault::OutOfRange { index, len } => {
                MutationError::IndexOutOfRange { path, index, len }
            }
            NodeFault::Invalid(reason) => MutationError::InvalidValue { path, reason },
            NodeFault::TagLocked(field) => MutationError::TagLocked { path, field },
            // Handled as a no-op before conversion.
            NodeFault::WrongKind { edit, found } => MutationError::InvalidValue {
                path,
                reason: format!("{edit} needs a list, found {found}"),
            },
        }
    }
}

/// Replaces the value at `path` with `value`.
pub fn update_field(doc: &Document, path: &Path, value: Value) -> Result<Document, MutationError> {
    apply(doc, path, Edit::Set(&value))
}

/// Appends `item` to the list at `path`. Appending to `dynamicSections` sets
/// the new section's `order` to its index.
pub fn add_array_item(doc: &Document, path: &Path, item: Value) -> Result<Document, MutationError> {
    apply(doc, path, Edit::Append(&item))
}

/// Removes the element at `index` of the list at `path`. Removing from
/// `dynamicSections` reassigns every remaining `order`.
pub fn remove_array_item(
    doc: &Document,
    path: &Path,
    index: usize,
) -> Result<Document, MutationError> {
    apply(doc, path, Edit::Remove(index))
}

/// Moves the element at `from` to `to` in the list at `path`, shifting the
/// elements in between.
pub fn move_array_item(
    doc: &Document,
    path: &Path,
    from: usize,
    to: usize,
) -> Result<Document, MutationError> {
    if from == to {
        return Ok(doc.clone());
    }
    apply(doc, path, Edit::Move { from, to })
}

fn apply(doc: &Document, path: &Path, edit: Edit<'_>) -> Result<Document, MutationError> {
    match doc.rebuild(path.segments(), &edit) {
        Ok(next) => {
            debug!(%path, edit = edit.name(), "Applied edit");
            Ok(next)
        }
        Err(NodeFault::WrongKind { edit, found }) => {
            warn!(%path, edit, found, "Ignoring edit aimed at a non-list target");
            Ok(doc.clone())
        }
        Err(fault) => Err(MutationError::from_fault(path, fault)),
    }
}
