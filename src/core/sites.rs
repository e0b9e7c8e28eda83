//! Domain list loading.
//!
//! The list is a JSON array of strings, processed in file order.

use std::path::{Path, PathBuf};

use crate::state::{Domain, DomainError};

/// Why the domain list could not be loaded. Always fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum SitesError {
    #[error("cannot read domain list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("domain list {path} is not a JSON array of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("domain list {path}, entry {index}: {source}")]
    Entry {
        path: PathBuf,
        index: usize,
        #[source]
        source: DomainError,
    },
}

/// Reads and validates the domain list at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing, is not a JSON array of strings,
/// or contains an empty entry.
pub fn load_domains(path: &Path) -> Result<Vec<Domain>, SitesError> {
    let content = std::fs::read_to_string(path).map_err(|source| SitesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_domains(&content).map_err(|e| match e {
        ParseFailure::Json(source) => SitesError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Entry(index, source) => SitesError::Entry {
            path: path.to_path_buf(),
            index,
            source,
        },
    })
}

enum ParseFailure {
    Json(serde_json::Error),
    Entry(usize, DomainError),
}

fn parse_domains(content: &str) -> Result<Vec<Domain>, ParseFailure> {
    let entries: Vec<String> = serde_json::from_str(content).map_err(ParseFailure::Json)?;
    entries
        .iter()
        .enumerate()
        .map(|(i, raw)| Domain::parse(raw).map_err(|e| ParseFailure::Entry(i, e)))
        .collect()
}
