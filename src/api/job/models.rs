use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use validator::{Validate, ValidationError};

/// A scraped posting as handed over by the ingestion side
#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct NewJob {
    #[validate(custom(function = "not_blank", message = "Title must not be empty"))]
    pub title: String,

    #[validate(
        custom(function = "not_blank", message = "Link must not be empty"),
        length(max = 2048, message = "Link must be at most 2048 characters")
    )]
    pub link: String,

    #[serde(default, deserialize_with = "deserialize_published")]
    pub published: Option<DateTime<Utc>>,

    #[serde(default)]
    pub author: Option<String>,

    #[validate(custom(function = "not_blank", message = "Category must not be empty"))]
    pub category: String,
}

/// Body for a status change
#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct StatusUpdate {
    /// Kept as text so an unknown value surfaces as an invalid status rather than a JSON error
    pub status: String,

    #[validate(length(max = 2000, message = "Reason must be at most 2000 characters"))]
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query string accepted by the job listing
#[derive(Deserialize, Debug, Default, Validate)]
pub struct JobListParams {
    pub category: Option<String>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 500, message = "Limit must be between 1 and 500"))]
    pub limit: Option<i64>,
}

/// One entry of an ingestion batch as a scraper dumps it; any field may be missing
///
/// Bulk loads decode entries this loosely so one malformed entry is reported
/// on its own instead of failing the whole batch.
#[derive(Deserialize, Debug, Default)]
pub struct RawJob {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl RawJob {
    /// Build the job, with missing text fields left empty so validation reports them
    ///
    /// The second value carries a problem with `published`, which is left
    /// unset in the returned job when it cannot be read.
    pub fn into_new_job(self, default_category: Option<&str>) -> (NewJob, Option<String>) {
        let mut problem = None;
        let published = match self.published.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_published(raw);
                if parsed.is_none() {
                    problem = Some(format!(
                        "Published must be an RFC 3339 or RFC 2822 timestamp, got '{}'",
                        raw
                    ));
                }
                parsed
            }
        };

        let job = NewJob {
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            published,
            author: self.author.filter(|a| !a.trim().is_empty()),
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .or_else(|| default_category.map(str::to_string))
                .unwrap_or_default(),
        };

        (job, problem)
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Parse a feed timestamp, either RFC 3339 or the RFC 2822 form RSS uses
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn deserialize_published<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_published(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp '{}'", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job(title: &str, link: &str, category: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            link: link.to_string(),
            published: None,
            author: None,
            category: category.to_string(),
        }
    }

    #[test]
    fn accepts_rss_and_iso_timestamps() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 13, 9, 30, 0).unwrap();
        assert_eq!(parse_published("Mon, 13 Oct 2025 09:30:00 +0000"), Some(expected));
        assert_eq!(parse_published("2025-10-13T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_published("last tuesday"), None);
    }

    #[test]
    fn published_is_optional_in_payload() {
        let parsed: NewJob = serde_json::from_value(serde_json::json!({
            "title": "Data Engineer",
            "link": "https://reliefweb.int/job/1",
            "category": "Information and Communications Technology"
        }))
        .unwrap();
        assert_eq!(parsed.published, None);
        assert_eq!(parsed.author, None);

        let blank: NewJob = serde_json::from_value(serde_json::json!({
            "title": "Data Engineer",
            "link": "https://reliefweb.int/job/1",
            "published": "",
            "category": "eng"
        }))
        .unwrap();
        assert_eq!(blank.published, None);
    }

    #[test]
    fn malformed_published_is_a_deserialize_error() {
        let result: Result<NewJob, _> = serde_json::from_value(serde_json::json!({
            "title": "A",
            "link": "https://x/1",
            "published": "yesterday",
            "category": "eng"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn blank_fields_fail_validation() {
        assert!(job("A", "https://x/1", "eng").validate().is_ok());

        let errors = job("  ", "", "eng").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("link"));
        assert!(!fields.contains_key("category"));
    }

    #[test]
    fn raw_entry_falls_back_to_default_category() {
        let entry: RawJob = serde_json::from_value(serde_json::json!({
            "title": "GIS Officer",
            "link": "https://reliefweb.int/job/42",
            "published": "Tue, 14 Oct 2025 08:00:00 +0000",
            "author": ""
        }))
        .unwrap();

        let (job, problem) = entry.into_new_job(Some("ICT"));
        assert_eq!(job.category, "ICT");
        assert!(job.published.is_some());
        assert_eq!(job.author, None);
        assert_eq!(problem, None);
    }

    #[test]
    fn raw_entry_reports_unreadable_published() {
        let entry = RawJob {
            title: Some("A".into()),
            link: Some("https://x/1".into()),
            published: Some("yesterday".into()),
            author: Some("UNDP".into()),
            category: Some("eng".into()),
        };

        let (job, problem) = entry.into_new_job(Some("ICT"));
        assert_eq!(job.category, "eng");
        assert_eq!(job.published, None);
        assert_eq!(job.author.as_deref(), Some("UNDP"));
        assert!(problem.unwrap().contains("yesterday"));
    }

    #[test]
    fn raw_entry_missing_fields_become_empty() {
        let (job, problem) = RawJob::default().into_new_job(None);
        assert!(job.link.is_empty());
        assert!(job.category.is_empty());
        assert_eq!(problem, None);
        assert!(job.validate().is_err());
    }

    #[test]
    fn oversized_link_fails_validation() {
        let link = format!("https://x/{}", "a".repeat(2048));
        assert!(job("A", &link, "eng").validate().is_err());
    }
}
