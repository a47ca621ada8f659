pub mod error;
pub mod health;
pub mod job;
pub mod validation;

use actix_web::web;
use sqlx::{Pool, Postgres};

use crate::api::job::{JobService, handlers::job_config};

/// Register shared state and every route on an app
///
/// Used by the server and by the HTTP tests so both see the same surface.
/// `max_payload_size` bounds every body extractor: raw payloads, JSON
/// (validated or not) and multipart uploads.
pub fn configure(
    pool: Pool<Postgres>,
    max_payload_size: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(JobService::new(pool.clone())))
            .app_data(web::Data::new(pool))
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .app_data(validation::raw_json_config(max_payload_size))
            .app_data(validation::multipart_config(max_payload_size))
            .app_data(validation::query_config())
            .app_data(validation::path_config());
        health::health_config(cfg);
        job_config(cfg);
    }
}
