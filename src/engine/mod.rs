//! Engine Module
//!
//! The CRUD engine on top of the registry, index and storage layers.
//!
//! ## Responsibilities
//! - Open the store root and own the collection registry
//! - Save (upsert), find (point lookup / bulk scan) and delete records
//!
//! ## Concurrency Model
//!
//! - **Registration** takes `&mut self`: register every type before the
//!   engine is shared, the borrow checker enforces it
//! - **Save / find_one / delete** run synchronously on the calling thread
//! - **find_all** fans the directory listing out to a bounded pool of
//!   scoped worker threads
//!
//! Writers are not serialized against each other. Two saves of the same
//! record race (last writer wins or both files survive), and a find running
//! during a save can see the old file, the new one, or briefly neither.

mod delete;
mod find;
mod save;

use std::ops::ControlFlow;
use std::path::Path;

use crate::config::Config;
use crate::document::Document;
use crate::error::{FiledexError, Result};
use crate::index::{is_hidden, matches};
use crate::registry::{Collection, Registry};
use crate::storage::{CollectionDir, RootDir};

/// A document store handle
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Registered collections (mutated only during registration)
    registry: Registry,
}

impl Engine {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Open/create the data directory
    /// 3. Write the permission marker
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Validate config
        if config.find_workers == 0 {
            return Err(FiledexError::Config(
                "find_workers must be at least 1".to_string(),
            ));
        }

        // Step 2 + 3: Root directory and marker
        let root = RootDir::open(&config.data_dir, config.create_if_missing)?;
        tracing::debug!("Opened store at {}", root.path().display());

        let registry = Registry::new(root, config.sync_writes);

        Ok(Self { config, registry })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Make `T` storable and searchable by `keys`
    ///
    /// `meta.id` is always indexed and must not be listed. See
    /// [`Registry::register`] for the validation rules.
    pub fn register<T: Document>(&mut self, prototype: &T, keys: &[&str]) -> Result<()> {
        self.registry.register(prototype, keys)?;
        Ok(())
    }

    /// Number of records stored for `T`
    pub fn count<T: Document>(&self) -> Result<usize> {
        let collection = self.collection::<T>()?;
        let names = collection.dir().list()?;
        Ok(names.iter().filter(|name| !is_hidden(name)).count())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn collection<T: Document>(&self) -> Result<&Collection> {
        self.registry.resolve(&T::type_name())
    }
}

/// Visit every record whose name matches all tokens, in listing order
///
/// The visitor returns `ControlFlow::Break` to stop early. Stopping is not
/// an error; the number of visited entries is returned either way.
fn walk_matching<F>(dir: &CollectionDir, tokens: &[String], mut visit: F) -> Result<usize>
where
    F: FnMut(&str) -> Result<ControlFlow<()>>,
{
    let mut visited = 0;
    for name in dir.list()? {
        if !matches(&name, tokens) {
            continue;
        }
        visited += 1;
        if visit(&name)?.is_break() {
            break;
        }
    }
    Ok(visited)
}
