//! Group payloads fetched over HTTP from a static asset host

use super::{group_file_name, GroupSource};
use crate::config::HttpSourceConfig;
use crate::error::{CoreError, SourceError};
use async_trait::async_trait;
use tracing::debug;

/// GETs `<base_url>/group-<N>.json`
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, CoreError> {
        if config.base_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "HTTP source requires a base URL".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::InvalidConfig {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn group_url(&self, group: u32) -> String {
        format!("{}/{}", self.base_url, group_file_name(group))
    }
}

#[async_trait]
impl GroupSource for HttpSource {
    async fn fetch_group(&self, group: u32) -> Result<Vec<u8>, SourceError> {
        let url = self.group_url(group);
        debug!(%url, "Fetching group payload");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound { location: url });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        Ok(body.to_vec())
    }

    fn location(&self, group: u32) -> String {
        self.group_url(group)
    }
}
