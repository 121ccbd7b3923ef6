//! Read-only renderers. They take an [`EditScope`](crate::editing::EditScope)
//! so the same code can drive preview and export; export passes a read-only
//! scope and no edit affordances are produced.

pub mod markdown;

pub use markdown::render_markdown;
