//! Error types for distcat-core
//!
//! Two layers, both built with thiserror:
//! - [`CoreError`] for file-level work (index files, catalogs, split output, config)
//! - [`LoaderError`] for the lazy loader, wrapping [`SourceError`] for payload fetches

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for index, catalog and configuration handling
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {origin}: {message}")]
    JsonParse {
        origin: String,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Data Integrity
    // ===================
    #[error("Invalid distribution index: {message}")]
    InvalidIndex { message: String },

    #[error("Invalid distribution catalog: {message}")]
    InvalidCatalog { message: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CoreError::FileNotFound { path }
        } else {
            CoreError::FileRead { path, source }
        }
    }

    pub(crate) fn json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        CoreError::JsonParse {
            origin: origin.into(),
            message: source.to_string(),
            source,
        }
    }
}

/// Failure while fetching or decoding a single group payload
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Group payload not found: {location}")]
    NotFound { location: String },

    #[error("Failed to read group payload: {location}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed group payload in {location}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Distribution {id} declares group {found} but was served as group {expected}")]
    GroupMismatch { expected: u32, found: u32, id: u32 },

    #[error("Distribution {id} appears more than once in the group payload")]
    DuplicateId { id: u32 },
}

/// Where a distribution lookup came up empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    /// The id is not present in the index table
    Index,
    /// The index points at this group but its payload lacks the id
    Group(u32),
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStage::Index => write!(f, "index"),
            LookupStage::Group(group) => write!(f, "group {}", group),
        }
    }
}

/// Errors returned by [`crate::DistributionLoader`]
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Index and payloads disagree. A packaging bug, never retried.
    #[error("Distribution with ID {id} not found in {stage}")]
    NotFound { stage: LookupStage, id: u32 },

    /// Fetching or decoding a group failed. Transient, safe to retry.
    #[error("Failed to load distribution group {group}")]
    GroupLoad {
        group: u32,
        #[source]
        source: SourceError,
    },

    /// A spawned load panicked or was cancelled. Not retried.
    #[error("Background load task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl LoaderError {
    /// Returns true when repeating the call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoaderError::GroupLoad { .. })
    }

    /// Short message suitable for end users
    pub fn user_message(&self) -> &'static str {
        match self {
            LoaderError::NotFound { .. } => "Content unavailable",
            LoaderError::GroupLoad { .. } => "Content could not be loaded, please retry",
            LoaderError::Task(_) => "Content could not be loaded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_is_not_retryable() {
        let err = LoaderError::NotFound {
            stage: LookupStage::Index,
            id: 42,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Content unavailable");
        assert_eq!(err.to_string(), "Distribution with ID 42 not found in index");
    }

    #[test]
    fn test_group_stage_display() {
        let err = LoaderError::NotFound {
            stage: LookupStage::Group(3),
            id: 7,
        };
        assert_eq!(err.to_string(), "Distribution with ID 7 not found in group 3");
    }

    #[test]
    fn test_group_load_keeps_cause() {
        let err = LoaderError::GroupLoad {
            group: 2,
            source: SourceError::NotFound {
                location: "group-2.json".to_string(),
            },
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Failed to load distribution group 2");

        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "Group payload not found: group-2.json");
    }

    #[tokio::test]
    async fn test_task_failure_does_not_ask_for_retry() {
        let join_err = tokio::spawn(async { panic!("load task panicked") })
            .await
            .unwrap_err();
        let err = LoaderError::from(join_err);

        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Content could not be loaded");
        assert!(!err.user_message().contains("retry"));
    }

    #[test]
    fn test_read_maps_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = CoreError::read("/tmp/index.json", io);
        assert!(matches!(err, CoreError::FileNotFound { .. }));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CoreError::read("/tmp/index.json", io);
        assert!(matches!(err, CoreError::FileRead { .. }));
    }
}
