use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::job::JobService;
use crate::api::job::dto::BulkJobResponse;
use crate::db::error::StoreError;

#[derive(Parser, Debug)]
#[command(
    name = "job-store",
    version,
    about = "Storage service for scraped job postings and their reminders"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Load scraped postings from a JSON array file
    Import {
        path: PathBuf,
        /// Category for entries that carry none
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Bulk insert the entries in `path`, skipping links already stored
///
/// The file must hold a JSON array. Entries are decoded one at a time, so a
/// malformed entry is reported in the summary instead of aborting the import.
pub async fn import(
    service: &JobService,
    path: &Path,
    default_category: Option<&str>,
) -> Result<BulkJobResponse, ImportError> {
    let raw = std::fs::read(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<serde_json::Value> =
        serde_json::from_slice(&raw).map_err(|source| ImportError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Importing {} entries from {}", entries.len(), path.display());

    Ok(service.bulk_create_entries(entries, default_category).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["job-store"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn parses_import_with_category() {
        let cli = Cli::try_parse_from([
            "job-store",
            "import",
            "jobs.json",
            "--category",
            "Information and Communications Technology",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Import {
                path: PathBuf::from("jobs.json"),
                category: Some("Information and Communications Technology".to_string()),
            })
        );
    }
}
