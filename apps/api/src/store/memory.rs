use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::ResumeVersionRow;
use crate::models::sanitize::load_document;
use crate::models::Document;
use crate::store::{ResumeStore, StoreError};

struct StoredResume {
    latest: Value,
    versions: Vec<ResumeVersionRow>,
}

/// In-process store for tests and for running without a database.
#[derive(Default)]
pub struct MemoryResumeStore {
    resumes: RwLock<HashMap<Uuid, StoredResume>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn create(&self, document: &Document) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let stored = StoredResume {
            latest: serde_json::to_value(document)?,
            versions: vec![ResumeVersionRow {
                resume_id: id,
                version: 1,
                revision: 0,
                saved_at: Utc::now(),
            }],
        };
        self.resumes.write().await.insert(id, stored);
        Ok(id)
    }

    async fn load(&self, id: Uuid) -> Result<Document, StoreError> {
        let resumes = self.resumes.read().await;
        let stored = resumes.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(load_document(stored.latest.clone())?)
    }

    async fn save(&self, id: Uuid, document: &Document, revision: u64) -> Result<i32, StoreError> {
        let latest = serde_json::to_value(document)?;
        let mut resumes = self.resumes.write().await;
        let stored = resumes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let version = stored.versions.last().map_or(0, |v| v.version) + 1;
        stored.latest = latest;
        stored.versions.push(ResumeVersionRow {
            resume_id: id,
            version,
            revision: revision as i64,
            saved_at: Utc::now(),
        });
        Ok(version)
    }

    async fn history(&self, id: Uuid) -> Result<Vec<ResumeVersionRow>, StoreError> {
        let resumes = self.resumes.read().await;
        let stored = resumes.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(stored.versions.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::update_field;
    use crate::path::Path;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip_preserves_document() {
        let store = MemoryResumeStore::new();
        let doc: Document = serde_json::from_value(json!({
            "personalInfo": { "fullName": "Ada" },
            "skills": [{ "id": "s1", "name": "Go", "level": 7, "category": "core" }],
            "dynamicSections": [
                { "id": "d1", "type": "custom", "order": 0, "enabled": false, "title": "Notes",
                  "data": { "type": "custom", "content": "Hi", "items": [] } }
            ]
        }))
        .unwrap();
        let id = store.create(&doc).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_save_appends_versions() {
        let store = MemoryResumeStore::new();
        let id = store.create(&Document::default()).await.unwrap();
        let path = Path::parse("personalInfo.fullName").unwrap();
        let edited = update_field(&Document::default(), &path, json!("Jane")).unwrap();

        assert_eq!(store.save(id, &edited, 4).await.unwrap(), 2);
        assert_eq!(store.load(id).await.unwrap().personal_info.full_name, "Jane");

        let history = store.history(id).await.unwrap();
        let versions: Vec<(i32, i64)> = history.iter().map(|v| (v.version, v.revision)).collect();
        assert_eq!(versions, vec![(2, 4), (1, 0)]);
    }

    #[tokio::test]
    async fn test_unknown_resume() {
        let store = MemoryResumeStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.load(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.save(id, &Document::default(), 1).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
