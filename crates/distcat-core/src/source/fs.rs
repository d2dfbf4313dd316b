//! Group payloads read from a directory on disk

use super::{group_file_name, GroupSource};
use crate::error::SourceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads `group-<N>.json` from a data directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn group_path(&self, group: u32) -> PathBuf {
        self.root.join(group_file_name(group))
    }
}

#[async_trait]
impl GroupSource for DirectorySource {
    async fn fetch_group(&self, group: u32) -> Result<Vec<u8>, SourceError> {
        let path = self.group_path(group);

        tokio::fs::read(&path).await.map_err(|e| {
            let location = path.display().to_string();
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound { location }
            } else {
                SourceError::Io {
                    location,
                    source: e,
                }
            }
        })
    }

    fn location(&self, group: u32) -> String {
        self.group_path(group).display().to_string()
    }
}
