//! File export sinks.
//!
//! # Responsibility
//! - Hand a serialized project to the host as a named downloadable file.
//!
//! # Invariants
//! - A sink either delivers the complete file or returns an error; it never
//!   reports success for a partial write.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// MIME type attached to exported project files.
pub const PROJECT_MIME_TYPE: &str = "application/json";

/// A file offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

impl DownloadFile {
    pub fn json(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: PROJECT_MIME_TYPE,
            contents: contents.into(),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    /// File name would escape the download location.
    InvalidFileName(String),
    Io { path: PathBuf, source: io::Error },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFileName(name) => write!(f, "invalid download file name: `{name}`"),
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFileName(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Host capability to offer a file download.
pub trait DownloadSink {
    fn offer(&mut self, file: &DownloadFile) -> Result<(), ExportError>;
}

/// Writes downloads into a directory, replacing same-named files.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns where a file with `file_name` lands.
    pub fn target_path(&self, file_name: &str) -> Result<PathBuf, ExportError> {
        let trimmed = file_name.trim();
        let is_plain = !trimmed.is_empty()
            && Path::new(trimmed).file_name().and_then(|name| name.to_str()) == Some(trimmed);
        if !is_plain {
            return Err(ExportError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.dir.join(trimmed))
    }
}

impl DownloadSink for DirectoryDownloads {
    fn offer(&mut self, file: &DownloadFile) -> Result<(), ExportError> {
        let path = self.target_path(&file.file_name)?;
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Final name only ever holds a complete export.
        let staging = path.with_extension("part");
        fs::write(&staging, file.contents.as_bytes())
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|source| {
                let _ = fs::remove_file(&staging);
                ExportError::Io {
                    path: path.clone(),
                    source,
                }
            })?;

        info!(
            "event=download_offer module=repo status=ok mime={} bytes={}",
            file.mime_type,
            file.contents.len()
        );
        Ok(())
    }
}
