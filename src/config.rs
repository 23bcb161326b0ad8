//! Configuration for filedex
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a filedex store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all collections
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── .initCheck              (write permission marker)
    ///     └── {sha256(type name)}/    (one directory per collection)
    ///           ├── .info             (registered index keys)
    ///           └── {token}:{token}   (one file per record)
    pub data_dir: PathBuf,

    /// Create `data_dir` when it does not exist yet
    pub create_if_missing: bool,

    /// fsync every record file after writing it
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Payload Configuration
    // -------------------------------------------------------------------------
    /// On-disk encoding of record payloads
    pub payload_format: PayloadFormat,

    // -------------------------------------------------------------------------
    // Scan Configuration
    // -------------------------------------------------------------------------
    /// Worker threads used by bulk finds
    pub find_workers: usize,
}

/// Encoding of the bytes stored inside each record file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Compact JSON (default)
    Json,

    /// Indented JSON, handy when the files are read by humans
    JsonPretty,

    /// bincode, smallest and fastest but not self-describing
    Bincode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./filedex_data"),
            create_if_missing: true,
            sync_writes: false,
            payload_format: PayloadFormat::Json,
            find_workers: 8,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all collections)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Create the data directory if it is missing
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// fsync record files after every write
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the payload encoding
    pub fn payload_format(mut self, format: PayloadFormat) -> Self {
        self.config.payload_format = format;
        self
    }

    /// Set the number of bulk find workers
    pub fn find_workers(mut self, count: usize) -> Self {
        self.config.find_workers = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
