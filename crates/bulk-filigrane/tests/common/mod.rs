//! In-memory watermarking service and instant clock for pipeline tests

#![allow(dead_code)]

pub mod http_stub;

use async_trait::async_trait;
use bulk_filigrane::processing::Clock;
use bulk_filigrane::{Error, InputFile, RemoteStatus, Result, UploadToken, WatermarkService};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scriptable fake of the remote service
#[derive(Default)]
pub struct FakeService {
    /// Polls needed before a token is ready; `None` means never
    ready_after: Option<u32>,
    fail_upload_for: HashSet<String>,
    fail_all_uploads: bool,
    fail_fetch: bool,
    panic_on: Option<String>,
    latency: Duration,

    next_token: AtomicUsize,
    tokens: Mutex<HashMap<String, Vec<String>>>,
    poll_counts: Mutex<HashMap<String, u32>>,
    submitted: Mutex<Vec<(Vec<String>, String)>>,

    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
    pub fetches: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeService {
    /// Service that is ready on the first poll
    pub fn ready() -> Self {
        Self {
            ready_after: Some(1),
            ..Self::default()
        }
    }

    pub fn never_ready() -> Self {
        Self {
            ready_after: None,
            ..Self::default()
        }
    }

    pub fn ready_after(mut self, polls: u32) -> Self {
        self.ready_after = Some(polls);
        self
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_all_uploads = true;
        self
    }

    pub fn failing_upload_for(mut self, name: &str) -> Self {
        self.fail_upload_for.insert(name.to_string());
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panic_on = Some(name.to_string());
        self
    }

    /// Real delay added to submit and fetch, to make jobs overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Highest number of jobs seen between submit and the end of fetch at once
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// File names and watermark of every submit call, in call order
    pub fn submitted(&self) -> Vec<(Vec<String>, String)> {
        self.submitted.lock().clone()
    }

    /// Content the fake serves for a given set of file names
    pub fn document_for(names: &[String]) -> Vec<u8> {
        format!("watermarked:{}", names.join(",")).into_bytes()
    }
}

#[async_trait]
impl WatermarkService for FakeService {
    async fn submit(&self, files: &[InputFile], watermark: &str) -> Result<UploadToken> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        let names: Vec<String> = files.iter().map(InputFile::file_name).collect();
        self.submitted.lock().push((names.clone(), watermark.to_string()));

        if let Some(target) = &self.panic_on {
            if names.contains(target) {
                panic!("fake service exploded on {}", target);
            }
        }

        if self.fail_all_uploads || names.iter().any(|n| self.fail_upload_for.contains(n)) {
            return Err(Error::upload("HTTP 503 Service Unavailable"));
        }

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let id = self.next_token.fetch_add(1, Ordering::SeqCst);
        let token = format!("tok-{}", id);
        self.tokens.lock().insert(token.clone(), names);
        Ok(UploadToken::new(token))
    }

    async fn poll_status(&self, token: &UploadToken) -> RemoteStatus {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let count = {
            let mut counts = self.poll_counts.lock();
            let count = counts.entry(token.as_str().to_string()).or_insert(0);
            *count += 1;
            *count
        };

        match self.ready_after {
            Some(needed) if count >= needed => RemoteStatus::Ready {
                url: format!("https://fake.invalid/{}", token),
            },
            _ => RemoteStatus::NotReady,
        }
    }

    async fn fetch_result(&self, token: &UploadToken) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_fetch {
            return Err(Error::download("HTTP 500 Internal Server Error"));
        }

        let names = self
            .tokens
            .lock()
            .get(token.as_str())
            .cloned()
            .unwrap_or_default();
        Ok(Bytes::from(Self::document_for(&names)))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Clock that records requested pauses and returns at once
#[derive(Default)]
pub struct InstantClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Input files for the given names under `dir`. The fake never reads them.
pub fn inputs(dir: &Path, names: &[&str]) -> Vec<InputFile> {
    names
        .iter()
        .map(|name| InputFile::from_path(dir.join(name)).unwrap())
        .collect()
}
