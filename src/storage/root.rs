//! Root directory of a store

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{FiledexError, Result};

use super::CollectionDir;

/// The directory holding every collection
#[derive(Debug, Clone)]
pub struct RootDir {
    path: PathBuf,
}

impl RootDir {
    const INIT_CHECK_FILENAME: &'static str = ".initCheck";
    const INIT_CHECK_CONTENT: &'static [u8] = b"This file is here to test permissions";

    /// Open the root, creating it when allowed, and prove it is writable
    pub fn open(path: &Path, create_if_missing: bool) -> Result<Self> {
        if !path.exists() {
            if !create_if_missing {
                return Err(FiledexError::Config(format!(
                    "data directory does not exist: {}",
                    path.display()
                )));
            }
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(FiledexError::Config(format!(
                "data directory is not a directory: {}",
                path.display()
            )));
        }

        fs::write(path.join(Self::INIT_CHECK_FILENAME), Self::INIT_CHECK_CONTENT)?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name for a collection: hex sha256 of the type name
    pub fn collection_dir_name(type_name: &str) -> String {
        hex::encode(Sha256::digest(type_name.as_bytes()))
    }

    /// Handle on a collection directory (not created yet)
    pub fn collection(&self, type_name: &str, sync_writes: bool) -> CollectionDir {
        CollectionDir::new(
            self.path.join(Self::collection_dir_name(type_name)),
            sync_writes,
        )
    }

    /// Every collection directory currently on disk
    pub fn collection_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}
