//! Persistence collaborator.
//!
//! The payload that crosses this boundary is exactly the serialized
//! [`Document`]; nothing engine-internal is stored. Loading runs the snapshot
//! through [`load_document`](crate::models::sanitize::load_document), so
//! legacy shapes are normalized before an editing session ever sees them.

pub mod autosave;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::ResumeVersionRow;
use crate::models::Document;

pub use autosave::{spawn_autosave, Autosave};
pub use memory::MemoryResumeStore;
pub use postgres::PgResumeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resume {0} not found")]
    NotFound(Uuid),

    #[error("stored document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores `document` as version 1 of a new resume.
    async fn create(&self, document: &Document) -> Result<Uuid, StoreError>;

    /// Latest saved snapshot, normalized.
    async fn load(&self, id: Uuid) -> Result<Document, StoreError>;

    /// Appends a new version. Returns its version number.
    async fn save(&self, id: Uuid, document: &Document, revision: u64) -> Result<i32, StoreError>;

    /// Saved versions, newest first.
    async fn history(&self, id: Uuid) -> Result<Vec<ResumeVersionRow>, StoreError>;
}
