use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeVersionRow};
use crate::models::sanitize::load_document;
use crate::models::Document;
use crate::store::{ResumeStore, StoreError};

/// Postgres-backed store. `resumes` holds the latest snapshot;
/// `resume_versions` is append-only and never updated.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create(&self, document: &Document) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let snapshot = serde_json::to_value(document)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO resumes (id, document, version) VALUES ($1, $2, 1)")
            .bind(id)
            .bind(&snapshot)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO resume_versions (resume_id, version, revision, document) VALUES ($1, 1, 0, $2)",
        )
        .bind(id)
        .bind(&snapshot)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Created resume {id}");
        Ok(id)
    }

    async fn load(&self, id: Uuid) -> Result<Document, StoreError> {
        let row: ResumeRow = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        Ok(load_document(row.document)?)
    }

    async fn save(&self, id: Uuid, document: &Document, revision: u64) -> Result<i32, StoreError> {
        let snapshot = serde_json::to_value(document)?;
        let mut tx = self.pool.begin().await?;

        // 1. Determine next version
        let current_max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(version) FROM resume_versions WHERE resume_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let version = current_max.ok_or(StoreError::NotFound(id))? + 1;

        // 2. Append-only INSERT of the version
        sqlx::query(
            r#"
            INSERT INTO resume_versions (resume_id, version, revision, document)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(revision as i64)
        .bind(&snapshot)
        .execute(&mut *tx)
        .await?;

        // 3. Point the resume at it
        sqlx::query(
            "UPDATE resumes SET document = $2, version = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&snapshot)
        .bind(version)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Saved resume {id} version {version} (revision {revision})");
        Ok(version)
    }

    async fn history(&self, id: Uuid) -> Result<Vec<ResumeVersionRow>, StoreError> {
        let rows = sqlx::query_as::<_, ResumeVersionRow>(
            r#"
            SELECT resume_id, version, revision, saved_at
            FROM resume_versions
            WHERE resume_id = $1
            ORDER BY version DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(rows)
    }
}
