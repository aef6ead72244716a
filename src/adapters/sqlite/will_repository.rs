//! SQLite implementation of the WillRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ActiveDays, CheckInType, EndRoomStatus, Visibility, Will, WillMode, WillStatus,
};
use crate::domain::ports::{WillFilter, WillRepository};

#[derive(Clone)]
pub struct SqliteWillRepository {
    pool: SqlitePool,
}

impl SqliteWillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WillRepository for SqliteWillRepository {
    async fn create(&self, will: &Will) -> DomainResult<()> {
        let active_days_json = serde_json::to_string(&will.active_days)?;
        let member_ids_json = serde_json::to_string(&will.member_ids)?;

        sqlx::query(
            r#"INSERT INTO wills (id, title, mode, visibility, status, paused_from,
               start_date, end_date, is_indefinite, active_days, check_in_type,
               end_room_scheduled_at, end_room_status, member_ids, created_by,
               timezone_offset_minutes, created_at, updated_at, version)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(will.id.to_string())
        .bind(&will.title)
        .bind(will.mode.as_str())
        .bind(will.visibility.as_str())
        .bind(will.status.as_str())
        .bind(will.paused_from.map(|s| s.as_str()))
        .bind(will.start_date.to_string())
        .bind(will.end_date.map(|d| d.to_string()))
        .bind(i32::from(will.is_indefinite))
        .bind(&active_days_json)
        .bind(will.check_in_type.as_str())
        .bind(will.end_room_scheduled_at.map(|t| t.to_rfc3339()))
        .bind(will.end_room_status.map(|s| s.as_str()))
        .bind(&member_ids_json)
        .bind(will.created_by.to_string())
        .bind(will.timezone_offset_minutes)
        .bind(will.created_at.to_rfc3339())
        .bind(will.updated_at.to_rfc3339())
        .bind(i64::try_from(will.version).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Will>> {
        let row: Option<WillRow> = sqlx::query_as("SELECT * FROM wills WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, will: &Will) -> DomainResult<()> {
        let active_days_json = serde_json::to_string(&will.active_days)?;
        let member_ids_json = serde_json::to_string(&will.member_ids)?;

        let result = sqlx::query(
            r#"UPDATE wills SET title = ?, mode = ?, visibility = ?, status = ?,
               paused_from = ?, start_date = ?, end_date = ?, is_indefinite = ?,
               active_days = ?, check_in_type = ?, end_room_scheduled_at = ?,
               end_room_status = ?, member_ids = ?, timezone_offset_minutes = ?,
               updated_at = ?, version = ?
               WHERE id = ? AND version = ?"#,
        )
        .bind(&will.title)
        .bind(will.mode.as_str())
        .bind(will.visibility.as_str())
        .bind(will.status.as_str())
        .bind(will.paused_from.map(|s| s.as_str()))
        .bind(will.start_date.to_string())
        .bind(will.end_date.map(|d| d.to_string()))
        .bind(i32::from(will.is_indefinite))
        .bind(&active_days_json)
        .bind(will.check_in_type.as_str())
        .bind(will.end_room_scheduled_at.map(|t| t.to_rfc3339()))
        .bind(will.end_room_status.map(|s| s.as_str()))
        .bind(&member_ids_json)
        .bind(will.timezone_offset_minutes)
        .bind(will.updated_at.to_rfc3339())
        .bind(i64::try_from(will.version).unwrap_or(i64::MAX))
        .bind(will.id.to_string())
        .bind(i64::try_from(will.version.saturating_sub(1)).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a vanished row from a lost race: a stale
            // snapshot must never clobber a concurrent status write.
            return match self.get(will.id).await? {
                Some(_) => Err(DomainError::Conflict(format!(
                    "will {} was modified concurrently",
                    will.id
                ))),
                None => Err(DomainError::WillNotFound(will.id)),
            };
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM wills WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::WillNotFound(id));
        }

        Ok(())
    }

    async fn list(&self, filter: WillFilter) -> DomainResult<Vec<Will>> {
        let mut query = String::from("SELECT * FROM wills WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(member_id) = &filter.member_id {
            // member_ids is a JSON array of UUID strings
            query.push_str(" AND member_ids LIKE ?");
            bindings.push(format!("%\"{member_id}\"%"));
        }
        if let Some(mode) = &filter.mode {
            query.push_str(" AND mode = ?");
            bindings.push(mode.as_str().to_string());
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, WillRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<WillRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_non_terminal(&self) -> DomainResult<Vec<Will>> {
        let rows: Vec<WillRow> = sqlx::query_as(
            "SELECT * FROM wills WHERE status NOT IN ('terminated', 'archived')
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: WillStatus,
        next: WillStatus,
    ) -> DomainResult<bool> {
        let result = sqlx::query(
            r#"UPDATE wills
               SET status = ?, updated_at = ?, version = version + 1
               WHERE id = ? AND status = ?"#,
        )
        .bind(next.as_str())
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_end_room_status(&self, id: Uuid, status: EndRoomStatus) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE wills SET end_room_status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::WillNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct WillRow {
    id: String,
    title: String,
    mode: String,
    visibility: String,
    status: String,
    paused_from: Option<String>,
    start_date: String,
    end_date: Option<String>,
    is_indefinite: i32,
    active_days: String,
    check_in_type: String,
    end_room_scheduled_at: Option<String>,
    end_room_status: Option<String>,
    member_ids: String,
    created_by: String,
    timezone_offset_minutes: i32,
    created_at: String,
    updated_at: String,
    version: i64,
}

fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    s.parse()
        .map_err(|_| DomainError::Serialization(format!("Invalid date: {s}")))
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, DomainError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| DomainError::Serialization(e.to_string()))
}

impl TryFrom<WillRow> for Will {
    type Error = DomainError;

    fn try_from(row: WillRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let mode = WillMode::from_str(&row.mode)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid mode: {}", row.mode)))?;

        let visibility = Visibility::from_str(&row.visibility).ok_or_else(|| {
            DomainError::Serialization(format!("Invalid visibility: {}", row.visibility))
        })?;

        // from_str also remaps status strings written by earlier releases
        let status = WillStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {}", row.status)))?;

        let paused_from = row
            .paused_from
            .map(|s| {
                WillStatus::from_str(&s)
                    .ok_or_else(|| DomainError::Serialization(format!("Invalid status: {s}")))
            })
            .transpose()?;

        let check_in_type = CheckInType::from_str(&row.check_in_type).ok_or_else(|| {
            DomainError::Serialization(format!("Invalid check-in type: {}", row.check_in_type))
        })?;

        let end_room_status = row
            .end_room_status
            .map(|s| {
                EndRoomStatus::from_str(&s).ok_or_else(|| {
                    DomainError::Serialization(format!("Invalid end room status: {s}"))
                })
            })
            .transpose()?;

        let active_days: ActiveDays = serde_json::from_str(&row.active_days)?;
        let member_ids: Vec<Uuid> = serde_json::from_str(&row.member_ids)?;

        let created_by = Uuid::parse_str(&row.created_by)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        Ok(Will {
            id,
            title: row.title,
            mode,
            visibility,
            status,
            paused_from,
            start_date: parse_date(&row.start_date)?,
            end_date: row.end_date.as_deref().map(parse_date).transpose()?,
            is_indefinite: row.is_indefinite != 0,
            active_days,
            check_in_type,
            end_room_scheduled_at: row
                .end_room_scheduled_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            end_room_status,
            member_ids,
            created_by,
            timezone_offset_minutes: row.timezone_offset_minutes,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            version: u64::try_from(row.version).unwrap_or(0),
        })
    }
}
