mod common;

use std::path::PathBuf;

use futures_util::TryStreamExt;
use serde_json::json;

use common::{lazy_pool, test_pool, unique, unique_link};
use job_store::cli::{self, ImportError};
use job_store::{JobFilter, JobService};

/// File under the temp dir holding `content`, removed on drop
struct ImportFile(PathBuf);

impl ImportFile {
    fn new(content: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}.json", unique("import")));
        std::fs::write(&path, content).expect("write import file");
        Self(path)
    }
}

impl Drop for ImportFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[actix_web::test]
async fn missing_file_is_a_read_error() {
    let service = JobService::new(lazy_pool());
    let path = std::env::temp_dir().join(format!("{}.json", unique("missing")));

    let err = cli::import(&service, &path, None).await.unwrap_err();
    assert!(matches!(err, ImportError::Read { path: ref p, .. } if *p == path));
}

#[actix_web::test]
async fn file_that_is_not_an_array_is_a_parse_error() {
    let service = JobService::new(lazy_pool());

    for content in ["{}", "not json", ""] {
        let file = ImportFile::new(content);
        let err = cli::import(&service, &file.0, None).await.unwrap_err();
        assert!(matches!(err, ImportError::Parse { .. }), "{:?}", err);
    }
}

#[actix_web::test]
async fn unreadable_entries_are_reported_not_fatal() {
    let service = JobService::new(lazy_pool());
    let file = ImportFile::new(
        &json!([
            {"title": "A", "link": "https://x/1", "published": "yesterday"},
            {"link": "https://x/2"},
            "https://x/3"
        ])
        .to_string(),
    );

    let summary = cli::import(&service, &file.0, Some("ICT")).await.unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.errors.len(), 3);
    assert_eq!(summary.errors[0].link, "https://x/1");
    assert!(summary.errors[0].errors[0].contains("yesterday"));
    assert_eq!(summary.errors[1].errors, vec!["Title must not be empty"]);
    assert!(summary.errors[2].errors[0].starts_with("Invalid entry"));
}

#[actix_web::test]
#[ignore = "requires DATABASE_URL"]
async fn importing_the_same_file_twice_skips_every_link() {
    let pool = test_pool().await;
    let service = JobService::new(pool);
    let category = unique("import");
    let links = [unique_link("import"), unique_link("import"), unique_link("import")];

    let file = ImportFile::new(
        &json!([
            {"title": "A", "link": links[0], "published": "Mon, 13 Oct 2025 09:30:00 +0000", "author": "UNHCR"},
            {"title": "B", "link": links[1], "published": ""},
            {"title": "C", "link": links[2], "category": "Logistics"}
        ])
        .to_string(),
    );

    let first = cli::import(&service, &file.0, Some(&category)).await.unwrap();
    assert_eq!(first.created, 3);
    assert!(first.skipped.is_empty());
    assert!(first.errors.is_empty());

    let second = cli::import(&service, &file.0, Some(&category)).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, links.to_vec());
    assert!(second.errors.is_empty());

    let stored: Vec<_> = service
        .query_jobs(JobFilter {
            category: Some(category.clone()),
            ..JobFilter::default()
        })
        .stream()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|job| job.link != links[2]));
}
