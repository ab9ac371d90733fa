use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;
use uuid::Uuid;

/// Longest filename accepted, in bytes.
const MAX_FILENAME_LEN: usize = 255;

/// URL prefix under which rendered plots are served.
pub const PLOT_URL_PREFIX: &str = "/static/plots";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid filename '{0}'")]
    InvalidFilename(String),

    #[error("File type not allowed: '{filename}' (allowed: {allowed})")]
    DisallowedExtension { filename: String, allowed: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Filename checks
// ---------------------------------------------------------------------------

/// Accept only a plain file name: no separators, no parent references, no
/// hidden files, no control characters.
pub fn validate_filename(name: &str) -> Result<&str, StorageError> {
    let invalid = name.is_empty()
        || name.len() > MAX_FILENAME_LEN
        || name.starts_with('.')
        || name.contains("..")
        || name.contains(['/', '\\', ':'])
        || name.chars().any(char::is_control);

    if invalid {
        return Err(StorageError::InvalidFilename(name.to_string()));
    }
    Ok(name)
}

/// Extension after the last `.`, compared case-insensitively against the
/// allow-list. A name without a dot never matches.
pub fn allowed_file(name: &str, allowed: &BTreeSet<String>) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| allowed.contains(&ext.to_ascii_lowercase()))
}

// ---------------------------------------------------------------------------
// Uploaded files
// ---------------------------------------------------------------------------

/// A file persisted in the upload directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Upload directory; files keep their original names.
#[derive(Debug)]
pub struct UploadStore {
    dir: PathBuf,
    allowed_extensions: BTreeSet<String>,
    allowed_label: String,
}

impl UploadStore {
    /// Creates `dir` if it does not exist yet.
    pub fn open(
        dir: impl Into<PathBuf>,
        allowed_extensions: BTreeSet<String>,
        allowed_label: String,
    ) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(StorageError::io(&dir))?;
        Ok(Self {
            dir,
            allowed_extensions,
            allowed_label,
        })
    }

    /// Check name and extension before any bytes are read.
    pub fn check_upload(&self, filename: &str) -> Result<(), StorageError> {
        validate_filename(filename)?;
        if !allowed_file(filename, &self.allowed_extensions) {
            return Err(StorageError::DisallowedExtension {
                filename: filename.to_string(),
                allowed: self.allowed_label.clone(),
            });
        }
        Ok(())
    }

    /// Storage path for a validated filename.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        Ok(self.dir.join(validate_filename(filename)?))
    }

    /// Write `bytes` under `filename`, replacing any earlier upload of the
    /// same name.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        self.check_upload(filename)?;
        let path = self.dir.join(filename);
        if path.exists() {
            info!("Replacing existing upload {}", path.display());
        }
        std::fs::write(&path, bytes).map_err(StorageError::io(&path))?;

        Ok(StoredFile {
            filename: filename.to_string(),
            path,
        })
    }
}

// ---------------------------------------------------------------------------
// Rendered plots
// ---------------------------------------------------------------------------

/// A plot written under a per-request token.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlot {
    /// `<uuid>.png`
    pub token: String,
    /// Public URL, `/static/plots/<token>`.
    pub url: String,
    pub path: PathBuf,
}

/// Directory of rendered plots. Every save gets a fresh name, so concurrent
/// requests never overwrite each other.
#[derive(Debug)]
pub struct PlotStore {
    dir: PathBuf,
}

impl PlotStore {
    /// Creates `dir` if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(StorageError::io(&dir))?;
        Ok(Self { dir })
    }

    pub fn save(&self, png: &[u8]) -> Result<RenderedPlot, StorageError> {
        let token = format!("{}.png", Uuid::new_v4());
        let path = self.dir.join(&token);
        std::fs::write(&path, png).map_err(StorageError::io(&path))?;

        Ok(RenderedPlot {
            url: format!("{PLOT_URL_PREFIX}/{token}"),
            token,
            path,
        })
    }

    /// Path of a previously saved plot; `None` unless `token` has the shape
    /// produced by [`PlotStore::save`].
    pub fn path_for_token(&self, token: &str) -> Option<PathBuf> {
        let stem = token.strip_suffix(".png")?;
        Uuid::parse_str(stem).ok()?;
        Some(self.dir.join(token))
    }
}
