//! Collection directory
//!
//! File primitives over the entries of one collection.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{FiledexError, Result};

/// Longest entry name most filesystems accept (`NAME_MAX`)
pub const MAX_NAME_LEN: usize = 255;

/// One collection's directory
#[derive(Debug, Clone)]
pub struct CollectionDir {
    path: PathBuf,
    sync_writes: bool,
}

impl CollectionDir {
    const TEMP_PREFIX: &'static str = ".tmp-";

    pub fn new(path: PathBuf, sync_writes: bool) -> Self {
        Self { path, sync_writes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory if it does not exist
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.path)?;
        Ok(())
    }

    /// All entry names in listing order, hidden ones included
    ///
    /// A single directory read; there is no incremental walk. Names that are
    /// not valid UTF-8 were not written by this crate and are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            match entry?.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::debug!("Skipping non UTF-8 entry {:?}", raw),
            }
        }
        Ok(names)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.path.join(name))?)
    }

    /// Read an entry that may not exist
    pub fn read_optional(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write an entry through a hidden temp file and a rename
    ///
    /// Readers see either the old content or the new one, never a prefix.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.stage(name, bytes)?.commit()
    }

    /// Write `bytes` to a hidden temp file destined for `name`
    ///
    /// Nothing is visible under `name` until [`StagedEntry::commit`]. Dropping
    /// the staged entry discards the temp file. Fails up front with
    /// `FilenameTooLong` when `name` could never be created.
    pub fn stage(&self, name: &str, bytes: &[u8]) -> Result<StagedEntry<'_>> {
        if name.len() > MAX_NAME_LEN {
            return Err(FiledexError::FilenameTooLong {
                len: name.len(),
                max: MAX_NAME_LEN,
            });
        }

        let staged = StagedEntry {
            dir: self,
            name: name.to_string(),
            temp_path: self
                .path
                .join(format!("{}{}", Self::TEMP_PREFIX, Uuid::new_v4())),
            committed: false,
        };
        self.write_file(&staged.temp_path, bytes)?;
        Ok(staged)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        fs::remove_file(self.path.join(name))?;
        Ok(())
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file: File = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(bytes)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// A fully written temp file waiting to be renamed into place
#[derive(Debug)]
pub struct StagedEntry<'a> {
    dir: &'a CollectionDir,
    name: String,
    temp_path: PathBuf,
    committed: bool,
}

impl StagedEntry<'_> {
    /// Rename the temp file to its final name
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp_path, self.dir.path.join(&self.name))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedEntry<'_> {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
