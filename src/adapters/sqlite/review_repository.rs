//! SQLite implementations of the review and acknowledgment repositories.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Acknowledgment, FollowThrough, Review};
use crate::domain::ports::{AcknowledgmentRepository, ReviewRepository};

#[derive(Clone)]
pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn create(&self, review: &Review) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO reviews (id, will_id, user_id, follow_through, reflection, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(review.id.to_string())
        .bind(review.will_id.to_string())
        .bind(review.user_id.to_string())
        .bind(review.follow_through.as_str())
        .bind(&review.reflection)
        .bind(review.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Review>> {
        let row: Option<ReviewRow> =
            sqlx::query_as("SELECT * FROM reviews WHERE will_id = ? AND user_id = ?")
                .bind(will_id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<Review>> {
        let rows: Vec<ReviewRow> =
            sqlx::query_as("SELECT * FROM reviews WHERE will_id = ? ORDER BY created_at")
                .bind(will_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE will_id = ?")
            .bind(will_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(result.0).unwrap_or(0))
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: String,
    will_id: String,
    user_id: String,
    follow_through: String,
    reflection: Option<String>,
    created_at: String,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DomainError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let follow_through = FollowThrough::from_str(&row.follow_through).ok_or_else(|| {
            DomainError::Serialization(format!("Invalid follow-through: {}", row.follow_through))
        })?;

        Ok(Review {
            id: Uuid::parse_str(&row.id).map_err(|e| DomainError::Serialization(e.to_string()))?,
            will_id: Uuid::parse_str(&row.will_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            follow_through,
            reflection: row.reflection,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqliteAcknowledgmentRepository {
    pool: SqlitePool,
}

impl SqliteAcknowledgmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AcknowledgmentRepository for SqliteAcknowledgmentRepository {
    async fn create(&self, acknowledgment: &Acknowledgment) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO acknowledgments (id, will_id, user_id, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(acknowledgment.id.to_string())
        .bind(acknowledgment.will_id.to_string())
        .bind(acknowledgment.user_id.to_string())
        .bind(acknowledgment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Acknowledgment>> {
        let row: Option<AcknowledgmentRow> =
            sqlx::query_as("SELECT * FROM acknowledgments WHERE will_id = ? AND user_id = ?")
                .bind(will_id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM acknowledgments WHERE will_id = ?")
                .bind(will_id.to_string())
                .fetch_one(&self.pool)
                .await?;

        Ok(u64::try_from(result.0).unwrap_or(0))
    }
}

#[derive(sqlx::FromRow)]
struct AcknowledgmentRow {
    id: String,
    will_id: String,
    user_id: String,
    created_at: String,
}

impl TryFrom<AcknowledgmentRow> for Acknowledgment {
    type Error = DomainError;

    fn try_from(row: AcknowledgmentRow) -> Result<Self, Self::Error> {
        Ok(Acknowledgment {
            id: Uuid::parse_str(&row.id).map_err(|e| DomainError::Serialization(e.to_string()))?,
            will_id: Uuid::parse_str(&row.will_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, DomainError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| DomainError::Serialization(e.to_string()))
}
