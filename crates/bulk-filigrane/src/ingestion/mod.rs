//! Input discovery

mod scanner;

pub use scanner::{scan_folder, ScanResult};
