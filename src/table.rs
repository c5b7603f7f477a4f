//! Table storage module
//!
//! This module provides a small key-value persistence layer. Each table is a
//! directory below the plugin's data directory, each row a JSON file named
//! after its (sanitized) key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the table holding per-guild server connection records
pub const SERVER_TABLE: &str = "plex_servers";

/// Errors that can occur during table operations
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to create or access the table directory
    #[error("Failed to create table directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a row
    #[error("Failed to read row file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a row
    #[error("Failed to write row file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to delete a row
    #[error("Failed to delete row file {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to deserialize a row
    #[error("Failed to deserialize row file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize a row
    #[error("Failed to serialize row: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Connection details of the media server configured for a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub server_url: String,
    pub token: String,
}

/// A keyed table of rows
pub trait Table<T>: Send + Sync {
    /// Returns the row stored under `key`, or `None` if there is none
    fn get_row(&self, key: &str) -> Result<Option<T>, TableError>;

    /// Stores `row` under `key`, replacing any previous row
    fn put_row(&self, key: &str, row: &T) -> Result<(), TableError>;

    /// Removes the row stored under `key`
    ///
    /// Returns whether a row existed.
    fn delete_row(&self, key: &str) -> Result<bool, TableError>;
}

/// A table of JSON rows stored on disk
pub struct JsonTable<T> {
    /// The directory where rows are stored
    table_dir: PathBuf,
    /// Phantom data for the row type
    _phantom: PhantomData<fn() -> T>,
}

impl<T> JsonTable<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    /// Opens or creates the table `name` below `data_dir`
    ///
    /// The name is sanitized (lowercased, non-alphanumeric characters
    /// replaced with underscores) before it is used as a directory name.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - The plugin's data directory
    /// * `name` - The name of the table
    ///
    /// # Returns
    ///
    /// A Result containing the JsonTable or a TableError if the table
    /// directory cannot be created
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let servers: JsonTable<ServerRecord> = JsonTable::open(&config.data_dir, SERVER_TABLE)?;
    /// ```
    pub fn open(data_dir: &Path, name: &str) -> Result<Self, TableError> {
        // Build the table directory path from the sanitized name
        let table_dir = data_dir.join(sanitize_name(name));

        // Create the directory if it doesn't exist
        fs::create_dir_all(&table_dir).map_err(|e| TableError::DirectoryCreationFailed {
            path: table_dir.clone(),
            source: e,
        })?;

        Ok(Self {
            table_dir,
            _phantom: PhantomData,
        })
    }

    /// Loads the row stored under `key`
    ///
    /// # Arguments
    ///
    /// * `key` - The key of the row, usually a guild id
    ///
    /// # Returns
    ///
    /// An Option containing the row if it exists, or None if it doesn't.
    /// Returns an error if the row exists but cannot be read or
    /// deserialized.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// if let Some(record) = servers.load("1234")? {
    ///     println!("Guild uses {}", record.server_url);
    /// }
    /// ```
    pub fn load(&self, key: &str) -> Result<Option<T>, TableError> {
        let file_path = self.row_path(key);

        // Read the file, a missing file is a missing row
        let content = match fs::read_to_string(&file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TableError::ReadFailed {
                    path: file_path,
                    source: e,
                });
            }
        };

        // Deserialize the JSON
        let row =
            serde_json::from_str(&content).map_err(|e| TableError::DeserializationFailed {
                path: file_path,
                source: e,
            })?;

        Ok(Some(row))
    }

    /// Returns the path to the table directory
    pub fn table_dir(&self) -> &Path {
        &self.table_dir
    }

    fn row_path(&self, key: &str) -> PathBuf {
        self.table_dir.join(format!("{}.json", sanitize_name(key)))
    }
}

impl<T> Table<T> for JsonTable<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    fn get_row(&self, key: &str) -> Result<Option<T>, TableError> {
        self.load(key)
    }

    fn put_row(&self, key: &str, row: &T) -> Result<(), TableError> {
        let file_path = self.row_path(key);

        // Serialize to JSON
        let content = serde_json::to_string_pretty(row)?;

        // Write to file
        fs::write(&file_path, content).map_err(|e| TableError::WriteFailed {
            path: file_path,
            source: e,
        })?;

        Ok(())
    }

    fn delete_row(&self, key: &str) -> Result<bool, TableError> {
        let file_path = self.row_path(key);

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TableError::DeleteFailed {
                path: file_path,
                source: e,
            }),
        }
    }
}

/// Sanitizes a name for use in file paths
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
fn sanitize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
