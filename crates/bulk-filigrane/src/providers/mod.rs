//! Remote service abstraction
//!
//! Jobs talk to the watermarking service through the [`WatermarkService`] trait so the
//! pipeline can run against the real HTTP API or an in-memory fake.

pub mod filigrane;
pub mod service;

pub use filigrane::FiligraneClient;
pub use service::{RemoteStatus, UploadToken, WatermarkService};
