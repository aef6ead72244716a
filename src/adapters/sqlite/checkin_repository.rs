//! SQLite implementation of the CheckInRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{date_key, parse_date_key, CheckIn, CheckInStatus};
use crate::domain::ports::CheckInRepository;

#[derive(Clone)]
pub struct SqliteCheckInRepository {
    pool: SqlitePool,
}

impl SqliteCheckInRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository for SqliteCheckInRepository {
    async fn upsert(&self, check_in: &CheckIn) -> DomainResult<CheckIn> {
        // The UNIQUE(will_id, date) constraint turns a resubmission
        // into an overwrite; id and created_at keep their first values.
        sqlx::query(
            r#"INSERT INTO check_ins (id, will_id, user_id, date, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(will_id, date) DO UPDATE SET
                   user_id = excluded.user_id,
                   status = excluded.status,
                   updated_at = excluded.updated_at"#,
        )
        .bind(check_in.id.to_string())
        .bind(check_in.will_id.to_string())
        .bind(check_in.user_id.to_string())
        .bind(date_key(check_in.date))
        .bind(check_in.status.as_str())
        .bind(check_in.created_at.to_rfc3339())
        .bind(check_in.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.get(check_in.will_id, check_in.date)
            .await?
            .ok_or_else(|| DomainError::StoreUnavailable("upserted check-in vanished".into()))
    }

    async fn get(&self, will_id: Uuid, date: NaiveDate) -> DomainResult<Option<CheckIn>> {
        let row: Option<CheckInRow> =
            sqlx::query_as("SELECT * FROM check_ins WHERE will_id = ? AND date = ?")
                .bind(will_id.to_string())
                .bind(date_key(date))
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<CheckIn>> {
        let rows: Vec<CheckInRow> =
            sqlx::query_as("SELECT * FROM check_ins WHERE will_id = ? ORDER BY date")
                .bind(will_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM check_ins WHERE will_id = ?")
            .bind(will_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(result.0).unwrap_or(0))
    }
}

#[derive(sqlx::FromRow)]
struct CheckInRow {
    id: String,
    will_id: String,
    user_id: String,
    date: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CheckInRow> for CheckIn {
    type Error = DomainError;

    fn try_from(row: CheckInRow) -> Result<Self, Self::Error> {
        let status = CheckInStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", row.status)))?;

        Ok(CheckIn {
            id: Uuid::parse_str(&row.id).map_err(|e| DomainError::Serialization(e.to_string()))?,
            will_id: Uuid::parse_str(&row.will_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| DomainError::Serialization(e.to_string()))?,
            date: parse_date_key(&row.date)
                .ok_or_else(|| DomainError::Serialization(format!("Invalid date: {}", row.date)))?,
            status,
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
