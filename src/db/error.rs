use crate::db::models::InvalidStatus;

/// Errors surfaced by the job store
///
/// Every variant is recoverable; the store never retries on the caller's behalf.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A job with this link is already stored
    #[error("a job with link {0} already exists")]
    DuplicateLink(String),

    /// The referenced job id does not exist
    #[error("job {0} not found")]
    JobNotFound(i32),

    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    /// The job payload broke a field rule (empty title, link or category)
    #[error("invalid job: {0}")]
    InvalidJob(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a failed reminder insert, turning the foreign key violation into `JobNotFound`
    pub(crate) fn from_reminder_insert(err: sqlx::Error, job_id: i32) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::JobNotFound(job_id)
            }
            other => StoreError::Database(other),
        }
    }
}
