//! Input files and the media kinds the watermarking service accepts

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Supported media kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// JPEG image (.jpg, .jpeg)
    Jpeg,
    /// PNG image
    Png,
    /// HEIC image (iPhone photos)
    Heic,
    /// PDF document
    Pdf,
}

impl MediaKind {
    /// Detect media kind from extension, case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "heic" => Some(Self::Heic),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect media kind from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Content type sent with the upload part
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Heic => "image/heic",
            Self::Pdf => "application/pdf",
        }
    }
}

/// A local file accepted for watermarking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl InputFile {
    /// Classify a path, rejecting unsupported extensions
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match MediaKind::from_path(&path) {
            Some(kind) => Ok(Self { path, kind }),
            None => Err(Error::UnsupportedMediaKind(path.display().to_string())),
        }
    }

    /// Final path component, used as the upload part name and the per-file output name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
