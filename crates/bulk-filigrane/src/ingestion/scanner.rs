//! Folder scanning: pick the files the service accepts

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{InputFile, MediaKind};

/// Files found in a folder, split by support
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Supported files, sorted by name
    pub supported: Vec<InputFile>,
    /// Regular files with an unsupported extension
    pub skipped: Vec<PathBuf>,
}

/// List the regular files directly inside `folder` (no recursion)
pub fn scan_folder(folder: &Path) -> Result<ScanResult> {
    if !folder.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", folder.display()),
        )));
    }

    let mut result = ScanResult::default();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        match MediaKind::from_path(&path) {
            Some(kind) => result.supported.push(InputFile { path, kind }),
            None => {
                tracing::debug!("Skipping unsupported file: {}", path.display());
                result.skipped.push(path);
            }
        }
    }

    tracing::info!(
        "Scanned {}: {} supported, {} skipped",
        folder.display(),
        result.supported.len(),
        result.skipped.len()
    );

    Ok(result)
}
