//! SQLite implementation of the CommitmentRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Commitment;
use crate::domain::ports::CommitmentRepository;

#[derive(Clone)]
pub struct SqliteCommitmentRepository {
    pool: SqlitePool,
}

impl SqliteCommitmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommitmentRepository for SqliteCommitmentRepository {
    async fn create(&self, commitment: &Commitment) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO commitments (id, will_id, user_id, what, why, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(commitment.id.to_string())
        .bind(commitment.will_id.to_string())
        .bind(commitment.user_id.to_string())
        .bind(&commitment.what)
        .bind(&commitment.why)
        .bind(commitment.created_at.to_rfc3339())
        .bind(commitment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Commitment>> {
        let row: Option<CommitmentRow> =
            sqlx::query_as("SELECT * FROM commitments WHERE will_id = ? AND user_id = ?")
                .bind(will_id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<Commitment>> {
        let rows: Vec<CommitmentRow> =
            sqlx::query_as("SELECT * FROM commitments WHERE will_id = ? ORDER BY created_at")
                .bind(will_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commitments WHERE will_id = ?")
            .bind(will_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(result.0).unwrap_or(0))
    }

    async fn update(&self, commitment: &Commitment) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE commitments SET what = ?, why = ?, updated_at = ? WHERE will_id = ? AND user_id = ?",
        )
        .bind(&commitment.what)
        .bind(&commitment.why)
        .bind(commitment.updated_at.to_rfc3339())
        .bind(commitment.will_id.to_string())
        .bind(commitment.user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Validation(
                "no commitment to update for this member".into(),
            ));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CommitmentRow {
    id: String,
    will_id: String,
    user_id: String,
    what: String,
    why: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CommitmentRow> for Commitment {
    type Error = DomainError;

    fn try_from(row: CommitmentRow) -> Result<Self, Self::Error> {
        Ok(Commitment {
            id: Uuid::parse_str(&row.id).map_err(|e| DomainError::Serialization(e.to_string()))?,
            will_id: Uuid::parse_str(&row.will_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            what: row.what,
            why: row.why,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, DomainError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| DomainError::Serialization(e.to_string()))
}
