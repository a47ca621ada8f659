use actix_multipart::form::{MultipartForm, bytes::Bytes};
use actix_web::{
    HttpResponse, delete, get, http::StatusCode, patch, post,
    web::{Data, Json as RawJson, Path, ServiceConfig, scope},
};
use actix_web_validator::{Json, Query};
use tracing::warn;

use crate::api::validation::error_response;
use crate::db::error::StoreError;
use crate::db::models::{ApplicationStatus, JobFilter};
use super::dto::{JobListResponse, JobResponse};
use super::models::{JobListParams, NewJob, StatusUpdate};
use super::service::JobService;

const DEFAULT_LIST_LIMIT: i64 = 100;

/// Multipart upload carrying a JSON array of jobs in its `file` part
#[derive(MultipartForm)]
pub struct JobUploadForm {
    pub file: Bytes,
}

#[post("")]
async fn create_job(
    service: Data<JobService>,
    job: Json<NewJob>,
) -> Result<HttpResponse, StoreError> {
    let response = service.create_job(&job).await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/bulk")]
async fn bulk_create_jobs(
    service: Data<JobService>,
    entries: RawJson<Vec<serde_json::Value>>,
) -> Result<HttpResponse, StoreError> {
    let response = service.bulk_create_entries(entries.into_inner(), None).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/upload")]
async fn upload_jobs(
    service: Data<JobService>,
    MultipartForm(form): MultipartForm<JobUploadForm>,
) -> Result<HttpResponse, StoreError> {
    let entries: Vec<serde_json::Value> = match serde_json::from_slice(&form.file.data) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Rejected job upload: {}", e);
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                "Invalid upload",
                format!("Expected a JSON array of jobs: {}", e),
            ));
        }
    };

    let response = service.bulk_create_entries(entries, None).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    params: Query<JobListParams>,
) -> Result<HttpResponse, StoreError> {
    let params = params.into_inner();
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ApplicationStatus>)
        .transpose()?;

    let filter = JobFilter {
        category: params.category,
        status,
        fetched_after: params.from,
        fetched_before: params.to,
        limit: Some(params.limit.unwrap_or(DEFAULT_LIST_LIMIT)),
    };

    let jobs = service.list_jobs(filter).await?;
    Ok(HttpResponse::Ok().json(JobListResponse {
        count: jobs.len(),
        jobs,
    }))
}

#[get("/{id}")]
async fn get_job(service: Data<JobService>, id: Path<i32>) -> Result<HttpResponse, StoreError> {
    let job = service.get_job(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobResponse {
        message: "Job found".to_string(),
        job,
    }))
}

#[patch("/{id}/status")]
async fn update_status(
    service: Data<JobService>,
    id: Path<i32>,
    update: Json<StatusUpdate>,
) -> Result<HttpResponse, StoreError> {
    let job = service
        .update_status(id.into_inner(), &update.status, update.reason.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(JobResponse {
        message: "Job status updated".to_string(),
        job,
    }))
}

#[delete("/{id}")]
async fn delete_job(service: Data<JobService>, id: Path<i32>) -> Result<HttpResponse, StoreError> {
    let response = service.delete_job(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/{id}/reminders")]
async fn create_reminder(
    service: Data<JobService>,
    id: Path<i32>,
) -> Result<HttpResponse, StoreError> {
    let reminder = service.create_reminder(id.into_inner()).await?;
    Ok(HttpResponse::Created().json(reminder))
}

#[get("/{id}/reminders")]
async fn list_reminders(
    service: Data<JobService>,
    id: Path<i32>,
) -> Result<HttpResponse, StoreError> {
    let reminders = service.list_reminders(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reminders))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("/jobs")
            .service(create_job)
            .service(bulk_create_jobs)
            .service(upload_jobs)
            .service(list_jobs)
            .service(get_job)
            .service(update_status)
            .service(delete_job)
            .service(create_reminder)
            .service(list_reminders),
    );
}
