//! Typed accessor pairs behind path reads and writes.
//!
//! Every schema type implements [`Node`]: `lookup` walks a segment slice for
//! reading, `rebuild` walks it with write intent and returns a new value in
//! which only the nodes on the walked path are fresh. Containers are held in
//! `Arc`, so rebuilding a list clones pointers, not the siblings themselves.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::Segment;

/// The write applied at the end of a walk.
#[derive(Debug, Clone, Copy)]
pub enum Edit<'a> {
    /// Replace the target with this value.
    Set(&'a Value),
    /// Append this value to the target list.
    Append(&'a Value),
    /// Remove the element at this index of the target list.
    Remove(usize),
    /// Move an element of the target list from one index to another.
    Move { from: usize, to: usize },
}

impl Edit<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Edit::Set(_) => "set",
            Edit::Append(_) => "append",
            Edit::Remove(_) => "remove",
            Edit::Move { .. } => "move",
        }
    }

    /// True for edits that change the shape of a list rather than a value.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Edit::Set(_))
    }
}

/// Why a walk with write intent stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeFault {
    /// A segment names something that does not exist.
    #[error("no '{0}' at this point of the document")]
    Missing(String),

    #[error("index {index} is out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// The target exists but cannot take this kind of edit.
    #[error("{edit} needs a list, found {found}")]
    WrongKind { edit: &'static str, found: &'static str },

    #[error("value does not fit: {0}")]
    Invalid(String),

    /// The segment is a section type tag, which is fixed at creation.
    #[error("'{0}' is a section tag and cannot be written")]
    TagLocked(String),
}

impl NodeFault {
    pub fn missing(segment: &Segment) -> Self {
        NodeFault::Missing(segment.to_string())
    }
}

pub trait Node: Clone + Serialize + DeserializeOwned {
    /// Short name of the node's shape, used in diagnostics.
    const KIND: &'static str;

    fn lookup(&self, path: &[Segment]) -> Option<Value>;

    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault>;
}

pub(crate) fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Terminal write for nodes that are not lists: only `Set` applies.
pub(crate) fn replace_with<T: DeserializeOwned>(
    edit: &Edit<'_>,
    found: &'static str,
) -> Result<T, NodeFault> {
    match edit {
        Edit::Set(value) => decode(value),
        other => Err(NodeFault::WrongKind {
            edit: other.name(),
            found,
        }),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, NodeFault> {
    T::deserialize(value).map_err(|e| NodeFault::Invalid(e.to_string()))
}

fn check_index(index: usize, len: usize) -> Result<(), NodeFault> {
    if index < len {
        Ok(())
    } else {
        Err(NodeFault::OutOfRange { index, len })
    }
}

macro_rules! leaf_node {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl Node for $ty {
                const KIND: &'static str = $kind;

                fn lookup(&self, path: &[Segment]) -> Option<Value> {
                    if path.is_empty() {
                        snapshot(self)
                    } else {
                        None
                    }
                }

                fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
                    match path.first() {
                        None => replace_with(edit, Self::KIND),
                        Some(segment) => Err(NodeFault::missing(segment)),
                    }
                }
            }
        )+
    };
}

leaf_node! {
    String => "text",
    bool => "boolean",
    u8 => "number",
    u32 => "number",
    f64 => "number",
}

impl<T: Node> Node for Option<T> {
    const KIND: &'static str = T::KIND;

    fn lookup(&self, path: &[Segment]) -> Option<Value> {
        self.as_ref().and_then(|inner| inner.lookup(path))
    }

    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
        match (self, path.first()) {
            (_, None) if !edit.is_structural() => replace_with(edit, Self::KIND),
            (Some(inner), _) => inner.rebuild(path, edit).map(Some),
            (None, None) => replace_with(edit, Self::KIND),
            (None, Some(segment)) => Err(NodeFault::missing(segment)),
        }
    }
}

impl<T: Node> Node for Arc<T> {
    const KIND: &'static str = T::KIND;

    fn lookup(&self, path: &[Segment]) -> Option<Value> {
        (**self).lookup(path)
    }

    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
        (**self).rebuild(path, edit).map(Arc::new)
    }
}

impl<T: Node> Node for Vec<T> {
    const KIND: &'static str = "list";

    fn lookup(&self, path: &[Segment]) -> Option<Value> {
        match path.split_first() {
            None => snapshot(self),
            Some((Segment::Index(index), rest)) => self.get(*index)?.lookup(rest),
            Some((Segment::Field(_), _)) => None,
        }
    }

    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
        let Some((head, rest)) = path.split_first() else {
            return edit_list(self, edit);
        };
        match head {
            Segment::Index(index) => {
                check_index(*index, self.len())?;
                let mut next = self.clone();
                next[*index] = self[*index].rebuild(rest, edit)?;
                Ok(next)
            }
            Segment::Field(_) => Err(NodeFault::missing(head)),
        }
    }
}

fn edit_list<T: Node>(items: &[T], edit: &Edit<'_>) -> Result<Vec<T>, NodeFault> {
    let mut next = items.to_vec();
    match *edit {
        Edit::Set(value) => return decode(value),
        Edit::Append(value) => next.push(decode(value)?),
        Edit::Remove(index) => {
            check_index(index, next.len())?;
            next.remove(index);
        }
        Edit::Move { from, to } => {
            check_index(from, next.len())?;
            check_index(to, next.len())?;
            let moved = next.remove(from);
            next.insert(to, moved);
        }
    }
    Ok(next)
}

/// Implements [`Node`] for a plain record by mapping wire field names to struct fields.
///
/// Unknown field names are `Missing`; nothing is ever created on the fly.
#[macro_export]
macro_rules! record_node {
    ($ty:ty { $($key:literal => $field:ident),+ $(,)? }) => {
        impl $crate::path::Node for $ty {
            const KIND: &'static str = "record";

            fn lookup(&self, path: &[$crate::path::Segment]) -> Option<serde_json::Value> {
                let Some((head, rest)) = path.split_first() else {
                    return serde_json::to_value(self).ok();
                };
                match head {
                    $crate::path::Segment::Field(name) => match name.as_ref() {
                        $($key => $crate::path::Node::lookup(&self.$field, rest),)+
                        _ => None,
                    },
                    $crate::path::Segment::Index(_) => None,
                }
            }

            fn rebuild(
                &self,
                path: &[$crate::path::Segment],
                edit: &$crate::path::Edit<'_>,
            ) -> Result<Self, $crate::path::NodeFault> {
                let Some((head, rest)) = path.split_first() else {
                    return match edit {
                        $crate::path::Edit::Set(value) => <Self as serde::Deserialize>::deserialize(*value)
                            .map_err(|e| $crate::path::NodeFault::Invalid(e.to_string())),
                        other => Err($crate::path::NodeFault::WrongKind {
                            edit: other.name(),
                            found: "record",
                        }),
                    };
                };
                match head {
                    $crate::path::Segment::Field(name) => match name.as_ref() {
                        $($key => {
                            let mut next = self.clone();
                            next.$field = $crate::path::Node::rebuild(&self.$field, rest, edit)?;
                            Ok(next)
                        })+
                        _ => Err($crate::path::NodeFault::missing(head)),
                    },
                    $crate::path::Segment::Index(_) => Err($crate::path::NodeFault::missing(head)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn idx(i: usize) -> Segment {
        Segment::Index(i)
    }

    #[test]
    fn test_leaf_set_decodes_value() {
        let next = "old".to_string().rebuild(&[], &Edit::Set(&json!("new"))).unwrap();
        assert_eq!(next, "new");
    }

    #[test]
    fn test_leaf_rejects_wrong_value_type() {
        let fault = true.rebuild(&[], &Edit::Set(&json!("yes"))).unwrap_err();
        assert!(matches!(fault, NodeFault::Invalid(_)));
    }

    #[test]
    fn test_leaf_append_is_wrong_kind() {
        let fault = "x".to_string().rebuild(&[], &Edit::Append(&json!("y"))).unwrap_err();
        assert_eq!(
            fault,
            NodeFault::WrongKind {
                edit: "append",
                found: "text"
            }
        );
    }

    #[test]
    fn test_walking_into_leaf_is_missing() {
        let fault = "x"
            .to_string()
            .rebuild(&[Segment::Field(Arc::from("len"))], &Edit::Set(&json!(1)))
            .unwrap_err();
        assert_eq!(fault, NodeFault::Missing("len".to_string()));
    }

    #[test]
    fn test_vec_append_remove_move() {
        let list = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let appended = list.rebuild(&[], &Edit::Append(&json!("d"))).unwrap();
        assert_eq!(appended, ["a", "b", "c", "d"]);
        let removed = list.rebuild(&[], &Edit::Remove(1)).unwrap();
        assert_eq!(removed, ["a", "c"]);
        let moved = list.rebuild(&[], &Edit::Move { from: 0, to: 2 }).unwrap();
        assert_eq!(moved, ["b", "c", "a"]);
        assert_eq!(list, ["a", "b", "c"]);
    }

    #[test]
    fn test_vec_out_of_range_is_rejected() {
        let list = vec!["a".to_string()];
        assert_eq!(
            list.rebuild(&[idx(3)], &Edit::Set(&json!("z"))).unwrap_err(),
            NodeFault::OutOfRange { index: 3, len: 1 }
        );
        assert_eq!(
            list.rebuild(&[], &Edit::Remove(1)).unwrap_err(),
            NodeFault::OutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn test_vec_lookup_past_end_is_none() {
        let list = vec![1u32, 2];
        assert_eq!(list.lookup(&[idx(1)]), Some(json!(2)));
        assert_eq!(list.lookup(&[idx(2)]), None);
    }

    #[test]
    fn test_shared_elements_survive_rebuild() {
        let list = vec![Arc::new("keep".to_string()), Arc::new("edit".to_string())];
        let next = list.rebuild(&[idx(1)], &Edit::Set(&json!("done"))).unwrap();
        assert!(Arc::ptr_eq(&list[0], &next[0]));
        assert!(!Arc::ptr_eq(&list[1], &next[1]));
        assert_eq!(*next[1], "done");
    }

    #[test]
    fn test_option_set_and_clear() {
        let absent: Option<String> = None;
        let present = absent.rebuild(&[], &Edit::Set(&json!("x"))).unwrap();
        assert_eq!(present.as_deref(), Some("x"));
        let cleared = present.rebuild(&[], &Edit::Set(&Value::Null)).unwrap();
        assert_eq!(cleared, None);
    }

    #[test]
    fn test_option_none_blocks_deeper_walk() {
        let absent: Option<Vec<String>> = None;
        let fault = absent
            .rebuild(&[idx(0)], &Edit::Set(&json!("x")))
            .unwrap_err();
        assert_eq!(fault, NodeFault::Missing("[0]".to_string()));
    }

    #[test]
    fn test_option_some_list_takes_structural_edits() {
        let present = Some(vec!["a".to_string()]);
        let next = present.rebuild(&[], &Edit::Append(&json!("b"))).unwrap();
        assert_eq!(next, Some(vec!["a".to_string(), "b".to_string()]));
    }
}
