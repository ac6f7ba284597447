//! Core types for the watermarking pipeline

pub mod media;
pub mod outcome;

pub use media::{InputFile, MediaKind};
pub use outcome::JobOutcome;
