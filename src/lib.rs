//! Storage for scraped job postings and the reminders sent about them.
//!
//! PostgreSQL enforces the invariants: unique links, the closed set of
//! application statuses, and reminders cascading away with their job.

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod shutdown;

pub use api::job::{JobService, NewJob};
pub use db::StoreError;
pub use db::models::{ApplicationStatus, JobFilter, JobRow, ReminderRow};
