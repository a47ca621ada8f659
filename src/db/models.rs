use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where the user stands on a job posting
///
/// Persisted as lowercase text; the `jobs` table carries a CHECK constraint
/// over the same three values.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Applied,
    Skipped,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Applied,
        ApplicationStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status string is outside the recognized set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid application status '{0}', expected one of: pending, applied, skipped")]
pub struct InvalidStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "applied" => Ok(ApplicationStatus::Applied),
            "skipped" => Ok(ApplicationStatus::Skipped),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Database representation of a job posting with all fields
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct JobRow {
    pub id: i32,
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub category: String,
    pub fetched_at: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub application_status: ApplicationStatus,
    pub reason: Option<String>,
}

/// A notification sent about a job
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct ReminderRow {
    pub id: i32,
    pub job_id: i32,
    pub sent_at: DateTime<Utc>,
}

/// Filter for job queries; every field left as `None` matches everything
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub category: Option<String>,
    pub status: Option<ApplicationStatus>,
    /// Inclusive lower bound on `fetched_at`
    pub fetched_after: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `fetched_at`
    pub fetched_before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}
