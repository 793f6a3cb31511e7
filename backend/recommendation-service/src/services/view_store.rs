use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Insert-only store for the raw view signal the recommender feeds on.
/// Reads happen in a separate ranking path, never in this pipeline.
#[async_trait]
pub trait ViewStore: Send + Sync {
    async fn insert_record(
        &self,
        video_id: &str,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// Postgres-backed view store owned by this service. Independent of the
/// history service's store: each consumer keeps its own copy of the
/// signal.
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
        // Duplicate rows from redelivery are fine; the ranking path
        // aggregates anyway.
        sqlx::query("INSERT INTO video_views (id, video_id, viewed_at) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(video_id)
            .bind(viewed_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
