use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::db::error::StoreError;
use crate::db::models::ReminderRow;

/// Repository for Reminder database operations
///
/// Reminders are append-only; they disappear only through the cascade when
/// their job is deleted.
pub struct ReminderRepository;

impl ReminderRepository {
    /// Record that a reminder was sent for `job_id`
    pub async fn create(pool: &Pool<Postgres>, job_id: i32) -> Result<ReminderRow, StoreError> {
        debug!("Creating reminder for job {}", job_id);

        let row = sqlx::query_as::<_, ReminderRow>(
            r#"
            INSERT INTO reminders (job_id)
            VALUES ($1)
            RETURNING id, job_id, sent_at
            "#,
        )
        .bind(job_id)
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::from_reminder_insert(e, job_id))?;

        debug!("Reminder created with id={}", row.id);
        Ok(row)
    }

    /// All reminders sent for a job, most recent first
    pub async fn list_for_job(
        pool: &Pool<Postgres>,
        job_id: i32,
    ) -> Result<Vec<ReminderRow>, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM jobs WHERE id = $1)")
            .bind(job_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(StoreError::JobNotFound(job_id));
        }

        let rows = sqlx::query_as::<_, ReminderRow>(
            r#"
            SELECT id, job_id, sent_at
            FROM reminders WHERE job_id = $1
            ORDER BY sent_at DESC, id DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_for_job(pool: &Pool<Postgres>, job_id: i32) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reminders WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
