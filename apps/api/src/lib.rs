//! Resume editing core: a typed resume document, a path-addressable mutation
//! engine over it, the editing context and widgets, the section registry and
//! drag-reorder gestures, persistence, and the HTTP service built on them.

pub mod config;
pub mod db;
pub mod editing;
pub mod engine;
pub mod errors;
pub mod models;
pub mod path;
pub mod render;
pub mod routes;
pub mod sections;
pub mod sessions;
pub mod state;
pub mod store;
