use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Insert-only persistence surface for view records.
///
/// The pipeline never reads back what it writes, so a single insert
/// operation is the whole contract.
#[async_trait]
pub trait ViewStore: Send + Sync {
    async fn insert_record(
        &self,
        video_id: &str,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// Postgres-backed view store owned by this service.
pub struct PgViewStore {
    pool: PgPool,
}

impl PgViewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewStore for PgViewStore {
    async fn insert_record(
        &self,
        video_id: &str,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // No uniqueness constraint: a redelivered event inserts a second
        // row and that is the intended at-least-once behavior.
        sqlx::query("INSERT INTO video_views (id, video_id, viewed_at) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(video_id)
            .bind(viewed_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
