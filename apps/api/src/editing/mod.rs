//! Ambient Editing-State Provider.
//!
//! A session owns one [`EditContext`]. Rendering code never reaches for it
//! directly: it receives an [`EditScope`] and derives child scopes and leaf
//! widgets from it, so a component only ever knows paths relative to where it
//! was placed.

pub mod context;
pub mod scope;
pub mod widgets;

pub use context::EditContext;
pub use scope::EditScope;
pub use widgets::{Binding, DateField, ItemList, TagList, TextField};
