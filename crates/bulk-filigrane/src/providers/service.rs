//! Watermarking service trait and the values exchanged with it

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::InputFile;

/// Opaque identifier of an in-flight request on the remote service.
///
/// Deliberately not `Clone`: the job that obtained a token is its only owner.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadToken(String);

impl UploadToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UploadToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Answer to a single status poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    NotReady,
    Ready { url: String },
}

/// Trait for the remote document-watermarking service
///
/// Implementations:
/// - `FiligraneClient`: the public Filigrane HTTP API
#[async_trait]
pub trait WatermarkService: Send + Sync {
    /// Upload one or more files with the watermark text; returns the request token
    async fn submit(&self, files: &[InputFile], watermark: &str) -> Result<UploadToken>;

    /// Check whether the request is done. Never fails: any error means "not ready yet".
    async fn poll_status(&self, token: &UploadToken) -> RemoteStatus;

    /// Download the watermarked document
    async fn fetch_result(&self, token: &UploadToken) -> Result<Bytes>;

    /// Get service name for logging
    fn name(&self) -> &str;
}
