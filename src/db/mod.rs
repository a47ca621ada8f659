pub mod connection;
pub mod error;
pub mod job_repository;
pub mod migrations;
pub mod models;
pub mod reminder_repository;

pub use error::StoreError;
