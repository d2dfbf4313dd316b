//! Group payload sources
//!
//! A [`GroupSource`] fetches the raw JSON payload for one group number.
//! Payloads are content-addressed as `group-<N>.json`; decoding and
//! validation happen in the loader so every source behaves the same.

pub mod embedded;
pub mod fs;
pub mod http;
pub mod memory;

use crate::error::SourceError;
use async_trait::async_trait;

pub use embedded::EmbeddedSource;
pub use fs::DirectorySource;
pub use http::HttpSource;
pub use memory::MemorySource;

/// File name of the payload for a group
pub fn group_file_name(group: u32) -> String {
    format!("group-{}.json", group)
}

/// Async fetch of one group payload
#[async_trait]
pub trait GroupSource: Send + Sync {
    /// Raw JSON bytes for `group`
    async fn fetch_group(&self, group: u32) -> Result<Vec<u8>, SourceError>;

    /// Human-readable location of the payload (path, URL, ...)
    fn location(&self, group: u32) -> String;
}
