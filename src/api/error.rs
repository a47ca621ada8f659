use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;
use crate::db::error::StoreError;

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::DuplicateLink(_) => StatusCode::CONFLICT,
            StoreError::JobNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidStatus(_) | StoreError::InvalidJob(_) => StatusCode::BAD_REQUEST,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error, message) = match self {
            StoreError::DuplicateLink(link) => {
                warn!("Duplicate job link: {}", link);
                ("Duplicate link", self.to_string())
            }
            StoreError::JobNotFound(id) => {
                warn!("Job not found: {}", id);
                ("Not found", format!("Job with id {} not found", id))
            }
            StoreError::InvalidStatus(e) => {
                warn!("Invalid status: {}", e);
                ("Invalid status", e.to_string())
            }
            StoreError::InvalidJob(msg) => {
                warn!("Invalid job: {}", msg);
                ("Validation failed", msg.clone())
            }
            StoreError::Database(e) => {
                error!("Database error: {}", e);
                ("Failed to process request", "Database error occurred".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error.to_string(),
            fields: serde_json::json!({ "message": message }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::InvalidStatus;

    #[test]
    fn store_errors_map_to_http_statuses() {
        let cases = [
            (StoreError::DuplicateLink("https://x/1".into()), StatusCode::CONFLICT),
            (StoreError::JobNotFound(7), StatusCode::NOT_FOUND),
            (StoreError::InvalidStatus(InvalidStatus("bogus".into())), StatusCode::BAD_REQUEST),
            (StoreError::InvalidJob("title".into()), StatusCode::BAD_REQUEST),
            (StoreError::Database(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected);
            assert_eq!(err.error_response().status(), expected);
        }
    }
}
