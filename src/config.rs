use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "RUSTY_HISTOGRAM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("allowed_extensions must name at least one extension")]
    NoExtensions,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Process-wide settings, fixed at start-up.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Where uploaded files are stored under their original name.
    pub upload_dir: PathBuf,
    /// Root of the static assets; rendered plots go to `<static_dir>/plots`.
    pub static_dir: PathBuf,
    /// Lowercase, without the leading dot.
    pub allowed_extensions: BTreeSet<String>,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            allowed_extensions: BTreeSet::from(["csv".to_string()]),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Read the file named by [`CONFIG_ENV`], or fall back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Keys missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalized()
    }

    fn normalized(mut self) -> Result<Self, ConfigError> {
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        Ok(self)
    }

    pub fn plot_dir(&self) -> PathBuf {
        self.static_dir.join("plots")
    }

    /// Comma-separated list for messages, e.g. `.csv, .json`.
    pub fn allowed_extensions_label(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
