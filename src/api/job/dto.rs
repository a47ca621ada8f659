use serde::Serialize;
use crate::db::models::JobRow;

/// Response for single job creation, lookup and status change
#[derive(Serialize)]
pub struct JobResponse {
    pub message: String,
    pub job: JobRow,
}

/// Error details for a job that failed validation in a bulk load
#[derive(Serialize, Debug)]
pub struct JobError {
    pub link: String,
    pub errors: Vec<String>,
}

/// Response for bulk job creation
#[derive(Serialize, Debug)]
pub struct BulkJobResponse {
    pub message: String,
    pub created: usize,
    /// Links that were already stored, or repeated within the batch
    pub skipped: Vec<String>,
    pub errors: Vec<JobError>,
}

#[derive(Serialize, Debug)]
pub struct JobListResponse {
    pub count: usize,
    pub jobs: Vec<JobRow>,
}

#[derive(Serialize, Debug)]
pub struct DeleteJobResponse {
    pub message: String,
    pub id: i32,
    pub reminders_removed: i64,
}
