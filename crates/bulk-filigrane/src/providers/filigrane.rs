//! HTTP client for the Filigrane document API
//!
//! Endpoints (relative to the configured base URL):
//! - `POST /files` multipart upload, answers `{ "token": ... }`
//! - `GET /url/{token}` answers `{ "url": ... }` once the document is ready
//! - `GET /{token}` raw watermarked document

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::service::{RemoteStatus, UploadToken, WatermarkService};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::types::InputFile;

/// Filigrane API client
pub struct FiligraneClient {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
    poll_timeout: Duration,
    download_timeout: Duration,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    url: Option<String>,
}

impl FiligraneClient {
    /// Create a new client. Timeouts are applied per request.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
            poll_timeout: Duration::from_secs(config.poll_request_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Build the upload body. Each file handle is moved into its part, so the
    /// handles are closed whenever the form is dropped, sent or not.
    async fn build_form(files: &[InputFile], watermark: &str) -> Result<Form> {
        let mut form = Form::new().text("watermark", watermark.to_string());

        for input in files {
            let file = tokio::fs::File::open(&input.path).await.map_err(|e| {
                Error::upload(format!("cannot open {}: {}", input.path.display(), e))
            })?;
            let len = file
                .metadata()
                .await
                .map_err(|e| Error::upload(format!("cannot stat {}: {}", input.path.display(), e)))?
                .len();

            let part = Part::stream_with_length(file, len)
                .file_name(input.file_name())
                .mime_str(input.kind.content_type())
                .map_err(|e| Error::upload(e.to_string()))?;

            form = form.part("files[]", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl WatermarkService for FiligraneClient {
    async fn submit(&self, files: &[InputFile], watermark: &str) -> Result<UploadToken> {
        let form = Self::build_form(files, watermark).await?;

        let response = self
            .client
            .post(self.endpoint("files"))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::upload(format!("HTTP {}", response.status())));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::upload(format!("invalid response: {}", e)))?;

        match body.token {
            Some(token) if !token.is_empty() => Ok(UploadToken::new(token)),
            _ => Err(Error::upload("response has no token")),
        }
    }

    async fn poll_status(&self, token: &UploadToken) -> RemoteStatus {
        let response = match self
            .client
            .get(self.endpoint(&format!("url/{}", token)))
            .timeout(self.poll_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!("[{}] Status poll returned HTTP {}", token, response.status());
                return RemoteStatus::NotReady;
            }
            Err(e) => {
                tracing::debug!("[{}] Status poll failed: {}", token, e);
                return RemoteStatus::NotReady;
            }
        };

        match response.json::<StatusResponse>().await {
            Ok(StatusResponse { url: Some(url) }) => RemoteStatus::Ready { url },
            Ok(_) => RemoteStatus::NotReady,
            Err(e) => {
                tracing::debug!("[{}] Unreadable status response: {}", token, e);
                RemoteStatus::NotReady
            }
        }
    }

    async fn fetch_result(&self, token: &UploadToken) -> Result<Bytes> {
        let response = self
            .client
            .get(self.endpoint(token.as_str()))
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| Error::download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::download(format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::download(e.to_string()))
    }

    fn name(&self) -> &str {
        "filigrane"
    }
}
