use futures_util::{StreamExt, TryStreamExt, stream::BoxStream};
use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::debug;
use validator::Validate;

use crate::api::job::NewJob;
use crate::db::error::StoreError;
use crate::db::models::{ApplicationStatus, JobFilter, JobRow};

/// Rows per INSERT statement in a bulk load; five binds per row keeps us far
/// below the PostgreSQL limit of 65535 parameters.
const BULK_CHUNK_SIZE: usize = 1000;

const SELECT_JOBS: &str = r#"
    SELECT id, title, link, published, author, category, fetched_at, application_status, reason
    FROM jobs
    WHERE ($1::text IS NULL OR category = $1)
      AND ($2::text IS NULL OR application_status = $2)
      AND ($3::timestamptz IS NULL OR fetched_at >= $3)
      AND ($4::timestamptz IS NULL OR fetched_at < $4)
    ORDER BY fetched_at DESC, id DESC
    LIMIT $5
"#;

/// Repository for Job database operations
pub struct JobRepository;

impl JobRepository {
    /// Insert a job unless its link is already stored
    ///
    /// The conflict is resolved inside PostgreSQL, so concurrent inserts of
    /// one link yield exactly one row and `DuplicateLink` for the others.
    pub async fn create(pool: &Pool<Postgres>, job: &NewJob) -> Result<JobRow, StoreError> {
        debug!("Creating job: link={}, category={}", job.link, job.category);
        check(job)?;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (title, link, published, author, category)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (link) DO NOTHING
            RETURNING id, title, link, published, author, category, fetched_at, application_status, reason
            "#,
        )
        .bind(&job.title)
        .bind(&job.link)
        .bind(job.published)
        .bind(&job.author)
        .bind(&job.category)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => {
                debug!("Job created with id={}", row.id);
                Ok(row)
            }
            None => {
                debug!("Job link already stored: {}", job.link);
                Err(StoreError::DuplicateLink(job.link.clone()))
            }
        }
    }

    /// Bulk insert jobs in a single transaction, skipping links already stored
    ///
    /// Returns the links that were actually inserted.
    pub async fn bulk_create(
        pool: &Pool<Postgres>,
        jobs: &[NewJob],
    ) -> Result<Vec<String>, StoreError> {
        if jobs.is_empty() {
            debug!("Bulk create called with empty job list");
            return Ok(Vec::new());
        }
        for job in jobs {
            check(job)?;
        }

        debug!("Starting bulk insert of {} jobs", jobs.len());

        let mut tx = pool.begin().await?;
        let mut inserted = Vec::with_capacity(jobs.len());

        for chunk in jobs.chunks(BULK_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO jobs (title, link, published, author, category) ",
            );
            builder.push_values(chunk, |mut row, job| {
                row.push_bind(job.title.clone())
                    .push_bind(job.link.clone())
                    .push_bind(job.published)
                    .push_bind(job.author.clone())
                    .push_bind(job.category.clone());
            });
            builder.push(" ON CONFLICT (link) DO NOTHING RETURNING link");

            let links: Vec<String> = builder
                .build_query_scalar()
                .fetch_all(&mut *tx)
                .await?;
            inserted.extend(links);
        }

        tx.commit().await?;
        debug!("Bulk insert completed: {} rows inserted", inserted.len());

        Ok(inserted)
    }

    pub async fn find_by_id(pool: &Pool<Postgres>, id: i32) -> Result<Option<JobRow>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, title, link, published, author, category, fetched_at, application_status, reason
            FROM jobs WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Set the application status and replace the reason
    pub async fn update_status(
        pool: &Pool<Postgres>,
        id: i32,
        status: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<JobRow, StoreError> {
        debug!("Updating job {}: status={}", id, status);

        sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET application_status = $2, reason = $3
            WHERE id = $1
            RETURNING id, title, link, published, author, category, fetched_at, application_status, reason
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(reason)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::JobNotFound(id))
    }

    /// Delete a job together with its reminders and return how many reminders went with it
    ///
    /// The job row is locked first so a reminder inserted concurrently either
    /// lands before the count or fails on the missing job.
    pub async fn delete(pool: &Pool<Postgres>, id: i32) -> Result<i64, StoreError> {
        debug!("Deleting job {}", id);

        let mut tx = pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::JobNotFound(id));
        }

        let reminders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reminders WHERE job_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Job {} deleted along with {} reminders", id, reminders);

        Ok(reminders)
    }

    /// Stream the jobs matching `filter`, newest fetch first
    pub fn stream<'a>(
        pool: &'a Pool<Postgres>,
        filter: &JobFilter,
    ) -> BoxStream<'a, Result<JobRow, StoreError>> {
        sqlx::query_as::<_, JobRow>(SELECT_JOBS)
            .bind(filter.category.clone())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.fetched_after)
            .bind(filter.fetched_before)
            .bind(filter.limit)
            .fetch(pool)
            .map_err(StoreError::from)
            .boxed()
    }
}

/// A job query that can be run any number of times
///
/// Each call to [`JobQuery::stream`] issues the query afresh, so the
/// sequence can be restarted after being partially consumed.
pub struct JobQuery<'a> {
    pool: &'a Pool<Postgres>,
    filter: JobFilter,
}

impl<'a> JobQuery<'a> {
    pub fn new(pool: &'a Pool<Postgres>, filter: JobFilter) -> Self {
        Self { pool, filter }
    }

    pub fn stream(&self) -> BoxStream<'a, Result<JobRow, StoreError>> {
        JobRepository::stream(self.pool, &self.filter)
    }
}

fn check(job: &NewJob) -> Result<(), StoreError> {
    job.validate()
        .map_err(|e| StoreError::InvalidJob(e.to_string()))
}
