//! Plugin configuration
//!
//! Settings shared by the persistence layer and the Plex client. Defaults are
//! derived from the system's standard data directory; the binary overrides
//! them from command line flags and environment variables.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine the data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,
}

/// Default number of results requested per search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default timeout for a single request to the media server.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Runtime settings for the plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Directory holding the persisted tables
    pub data_dir: PathBuf,
    /// Maximum number of results requested from the server per search
    pub search_limit: usize,
    /// Identifier announced to the media server as `X-Plex-Client-Identifier`
    pub client_identifier: String,
    /// Timeout for a single HTTP request, in seconds
    pub request_timeout_secs: u64,
}

impl PluginConfig {
    /// Creates a configuration rooted at the given data directory
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            search_limit: DEFAULT_SEARCH_LIMIT,
            client_identifier: format!("plex_search-{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Creates a configuration using the system's standard data directory
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use plex_search::PluginConfig;
    ///
    /// let config = PluginConfig::from_project_dirs().unwrap();
    /// println!("Tables live in {}", config.data_dir.display());
    /// ```
    pub fn from_project_dirs() -> Result<Self, ConfigError> {
        let proj_dirs = directories::ProjectDirs::from("de", "westhoffswelt", "plexsearch")
            .ok_or(ConfigError::DataDirectoryNotFound)?;

        Ok(Self::with_data_dir(proj_dirs.data_dir().to_path_buf()))
    }
}
