//! bulk-filigrane: batch document watermarking against the Filigrane service
//!
//! Files are uploaded to the remote service (one request per file, or all files in a single
//! request), polled until the watermarked document is ready, then downloaded next to the
//! other outputs. Per-file batches run on a bounded worker pool and every job ends with
//! exactly one [`JobOutcome`], whatever went wrong.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod report;
pub mod types;

pub use config::BulkConfig;
pub use error::{Error, Result};
pub use processing::{DispatchMode, PollPolicy, Progress, Scheduler};
pub use providers::{FiligraneClient, RemoteStatus, UploadToken, WatermarkService};
pub use report::BatchReport;
pub use types::{InputFile, JobOutcome, MediaKind};
