use std::collections::HashSet;

use futures_util::TryStreamExt;
use sqlx::{Pool, Postgres};
use tracing::{info, warn};
use validator::Validate;

use crate::db::error::StoreError;
use crate::db::job_repository::{JobQuery, JobRepository};
use crate::db::models::{ApplicationStatus, JobFilter, JobRow, ReminderRow};
use crate::db::reminder_repository::ReminderRepository;
use super::dto::{BulkJobResponse, DeleteJobResponse, JobError, JobResponse};
use super::models::{NewJob, RawJob};

/// A decoded batch entry with any problems found while decoding it, or the
/// report for an entry that could not be decoded at all
type Candidate = Result<(NewJob, Vec<String>), JobError>;

/// Job store service: the operations ingestion, the user workflow and the
/// notifier call
#[derive(Clone)]
pub struct JobService {
    pool: Pool<Postgres>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a single job
    ///
    /// # Returns
    /// - `Ok(JobResponse)` - Job created with status `pending`
    /// - `Err(StoreError::DuplicateLink)` - The link is already stored; nothing changed
    pub async fn create_job(&self, job: &NewJob) -> Result<JobResponse, StoreError> {
        info!("Service: Creating job with link={}", job.link);

        let job_row = JobRepository::create(&self.pool, job).await?;

        info!("Service: Job created successfully with id={}", job_row.id);

        Ok(JobResponse {
            message: "Job created successfully".to_string(),
            job: job_row,
        })
    }

    /// Bulk create jobs that were already decoded
    pub async fn bulk_create_jobs(&self, jobs: Vec<NewJob>) -> Result<BulkJobResponse, StoreError> {
        let candidates: Vec<Candidate> = jobs
            .into_iter()
            .map(|job| Ok((job, Vec::new())))
            .collect();
        self.insert_batch(candidates).await
    }

    /// Bulk create jobs from loosely typed ingestion entries
    ///
    /// Each entry is decoded on its own: an entry that is not an object of
    /// text fields, or whose `published` cannot be read, is reported under
    /// its link while the rest of the batch is stored.
    pub async fn bulk_create_entries(
        &self,
        entries: Vec<serde_json::Value>,
        default_category: Option<&str>,
    ) -> Result<BulkJobResponse, StoreError> {
        let candidates: Vec<Candidate> = entries
            .into_iter()
            .map(|value| {
                let link = value
                    .get("link")
                    .and_then(|l| l.as_str())
                    .unwrap_or_default()
                    .to_string();
                match serde_json::from_value::<RawJob>(value) {
                    Ok(raw) => {
                        let (job, problem) = raw.into_new_job(default_category);
                        Ok((job, problem.into_iter().collect()))
                    }
                    Err(e) => Err(JobError {
                        link,
                        errors: vec![format!("Invalid entry: {}", e)],
                    }),
                }
            })
            .collect();
        self.insert_batch(candidates).await
    }

    /// Insert a batch, reporting every rejected entry
    ///
    /// # Business Logic
    /// - Validates each job individually and collects errors by link
    /// - Keeps the first occurrence of a link repeated within the batch
    /// - Inserts valid jobs in one transaction, skipping stored links
    /// - Returns created count, skipped links and validation errors
    async fn insert_batch(
        &self,
        candidates: Vec<Candidate>,
    ) -> Result<BulkJobResponse, StoreError> {
        info!("Service: Processing bulk job creation for {} jobs", candidates.len());

        let mut valid_jobs = Vec::new();
        let mut errors = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for candidate in candidates {
            let (job, mut error_messages) = match candidate {
                Ok(candidate) => candidate,
                Err(error) => {
                    warn!("Service: Undecodable entry: {}", error.link);
                    errors.push(error);
                    continue;
                }
            };

            if let Err(validation_errors) = job.validate() {
                error_messages.extend(validation_errors.field_errors().values().flat_map(|errors| {
                    errors.iter().map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation error".to_string())
                    })
                }));
            }

            if !error_messages.is_empty() {
                warn!("Service: Validation failed for job: {}", job.link);
                errors.push(JobError {
                    link: job.link,
                    errors: error_messages,
                });
            } else if !seen.insert(job.link.clone()) {
                skipped.push(job.link);
            } else {
                valid_jobs.push(job);
            }
        }

        let inserted = if !valid_jobs.is_empty() {
            info!("Service: Bulk inserting {} valid jobs", valid_jobs.len());
            JobRepository::bulk_create(&self.pool, &valid_jobs).await?
        } else {
            warn!("Service: No valid jobs to insert");
            Vec::new()
        };

        let inserted: HashSet<String> = inserted.into_iter().collect();
        skipped.extend(
            valid_jobs
                .into_iter()
                .map(|job| job.link)
                .filter(|link| !inserted.contains(link)),
        );

        let created_count = inserted.len();
        let error_count = errors.len();

        if error_count == 0 {
            info!(
                "Service: Bulk job creation completed: {} created, {} skipped",
                created_count,
                skipped.len()
            );
        } else {
            warn!("Service: Bulk job creation completed with {} validation errors", error_count);
        }

        Ok(BulkJobResponse {
            message: format!(
                "Bulk job creation completed. {} created, {} skipped, {} failed",
                created_count,
                skipped.len(),
                error_count
            ),
            created: created_count,
            skipped,
            errors,
        })
    }

    pub async fn get_job(&self, id: i32) -> Result<JobRow, StoreError> {
        JobRepository::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::JobNotFound(id))
    }

    /// Change a job's application status
    ///
    /// The status text is checked before the database is touched, so an
    /// unknown value leaves the row as it was.
    pub async fn update_status(
        &self,
        id: i32,
        status: &str,
        reason: Option<&str>,
    ) -> Result<JobRow, StoreError> {
        let status: ApplicationStatus = status.parse()?;
        info!("Service: Setting job {} status to {}", id, status);

        JobRepository::update_status(&self.pool, id, status, reason).await
    }

    pub async fn delete_job(&self, id: i32) -> Result<DeleteJobResponse, StoreError> {
        info!("Service: Deleting job {}", id);

        let reminders_removed = JobRepository::delete(&self.pool, id).await?;

        info!("Service: Job {} deleted, {} reminders removed", id, reminders_removed);
        Ok(DeleteJobResponse {
            message: "Job deleted successfully".to_string(),
            id,
            reminders_removed,
        })
    }

    /// Build a restartable query over the stored jobs
    pub fn query_jobs(&self, filter: JobFilter) -> JobQuery<'_> {
        JobQuery::new(&self.pool, filter)
    }

    pub async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<JobRow>, StoreError> {
        self.query_jobs(filter).stream().try_collect().await
    }

    pub async fn create_reminder(&self, job_id: i32) -> Result<ReminderRow, StoreError> {
        info!("Service: Recording reminder for job {}", job_id);
        ReminderRepository::create(&self.pool, job_id).await
    }

    pub async fn list_reminders(&self, job_id: i32) -> Result<Vec<ReminderRow>, StoreError> {
        ReminderRepository::list_for_job(&self.pool, job_id).await
    }
}
