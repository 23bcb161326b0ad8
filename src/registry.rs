//! Collection Registry
//!
//! Maps a record type to its index keys and directory.
//!
//! ## Responsibilities
//! - Validate a type's metadata block and requested index keys
//! - Create the collection directory
//! - Persist the key list as `.info` and warn when it changed since last run
//! - Resolve a type name for every CRUD call

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, ID_PATH, META_KEY};
use crate::error::{FiledexError, Result};
use crate::index::{FieldPath, ValueKind, FORBIDDEN_KEY_CHARS};
use crate::storage::{CollectionDir, RootDir};

/// Name of the metadata entry inside a collection directory
pub const INFO_FILENAME: &str = ".info";

/// Contents of `.info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub indexable_keys: Vec<String>,
}

/// A registered record type
#[derive(Debug, Clone)]
pub struct Collection {
    type_name: String,

    /// Requested keys in registration order, `meta.id` last
    index_paths: Vec<FieldPath>,

    dir: CollectionDir,
}

impl Collection {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn index_paths(&self) -> &[FieldPath] {
        &self.index_paths
    }

    pub fn dir(&self) -> &CollectionDir {
        &self.dir
    }

    fn info(&self) -> CollectionInfo {
        CollectionInfo {
            indexable_keys: self
                .index_paths
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        }
    }
}

/// All registered collections of one store
///
/// Mutated only through `&mut self`, so registration cannot overlap with
/// CRUD calls that hold `&self`.
#[derive(Debug)]
pub struct Registry {
    root: RootDir,
    sync_writes: bool,
    collections: HashMap<String, Collection>,
}

impl Registry {
    pub fn new(root: RootDir, sync_writes: bool) -> Self {
        Self {
            root,
            sync_writes,
            collections: HashMap::new(),
        }
    }

    /// Register `T` with the given index keys
    ///
    /// `prototype` is an instance used to check the shape of every key. Nested
    /// keys need their intermediate structs present (not `None`) on it.
    /// Registering a type again replaces its entry.
    pub fn register<T: Document>(&mut self, prototype: &T, keys: &[&str]) -> Result<&Collection> {
        let type_name = T::type_name();
        let shape = serde_json::to_value(prototype)?;

        // Step 1: Metadata block
        validate_metadata(&type_name, &shape)?;

        // Step 2: Requested keys
        let mut index_paths = Vec::with_capacity(keys.len() + 1);
        for key in keys {
            let path = FieldPath::parse(key)?;
            validate_key(&shape, &path)?;
            index_paths.push(path);
        }

        // Step 3 + 4: Directory
        let dir = self.root.collection(&type_name, self.sync_writes);
        dir.ensure()?;

        // Step 5: Implicit id key, always last
        index_paths.push(FieldPath::parse(ID_PATH)?);

        let collection = Collection {
            type_name: type_name.clone(),
            index_paths,
            dir,
        };

        // Step 6: Compare against what the last run registered
        let info = collection.info();
        check_previous_info(&collection, &info)?;

        // Step 7: Persist and record
        collection
            .dir
            .write(INFO_FILENAME, &serde_json::to_vec(&info)?)?;

        tracing::debug!(
            "Registered {} in {} with keys {:?}",
            type_name,
            collection.dir.path().display(),
            info.indexable_keys
        );

        self.collections.insert(type_name.clone(), collection);
        self.resolve(&type_name)
    }

    /// Look up a registered type
    pub fn resolve(&self, type_name: &str) -> Result<&Collection> {
        self.collections
            .get(type_name)
            .ok_or_else(|| FiledexError::NotRegistered(type_name.to_string()))
    }

    /// Registered collections, in no particular order
    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }
}

fn validate_metadata(type_name: &str, shape: &Value) -> Result<()> {
    let Value::Object(fields) = shape else {
        return Err(FiledexError::InvalidRecord(format!(
            "{} serializes to {}, only structs can be stored",
            type_name,
            ValueKind::of(shape)
        )));
    };

    let meta = fields
        .get(META_KEY)
        .ok_or_else(|| FiledexError::MissingMetadata(type_name.to_string()))?;

    let invalid = |reason: String| FiledexError::InvalidMetadataType {
        type_name: type_name.to_string(),
        reason,
    };

    let Value::Object(meta) = meta else {
        return Err(invalid(format!("expected an object, got {}", ValueKind::of(meta))));
    };

    match meta.get("id") {
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(invalid(format!("id must be a string, got {}", ValueKind::of(other))))
        }
        None => return Err(invalid("id is missing".to_string())),
    }

    for field in ["createdAt", "updatedAt"] {
        if !meta.contains_key(field) {
            return Err(invalid(format!("{} is missing", field)));
        }
    }

    Ok(())
}

fn validate_key(shape: &Value, path: &FieldPath) -> Result<()> {
    if path.as_str() == ID_PATH {
        return Err(FiledexError::ReservedKey(ID_PATH.to_string()));
    }

    if let Some(character) = path.as_str().chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(FiledexError::InvalidKeyCharacter {
            path: path.as_str().to_string(),
            character,
        });
    }

    let Some((leaf, parents)) = path.segments().split_last() else {
        return Err(FiledexError::EmptyKey);
    };

    let not_found = |segment: &str| FiledexError::FieldNotFound {
        path: path.as_str().to_string(),
        segment: segment.to_string(),
    };

    // Validation runs on the root object, which validate_metadata already checked
    let mut current = shape;
    for segment in parents {
        let Value::Object(fields) = current else {
            return Err(not_found(segment.as_str()));
        };
        current = fields
            .get(segment)
            .ok_or_else(|| not_found(segment.as_str()))?;
        if !matches!(current, Value::Object(_)) {
            return Err(FiledexError::InvalidNestedKey {
                path: path.as_str().to_string(),
                segment: segment.clone(),
            });
        }
    }

    let Value::Object(fields) = current else {
        return Err(not_found(leaf.as_str()));
    };
    let kind = ValueKind::of(fields.get(leaf).ok_or_else(|| not_found(leaf.as_str()))?);

    // null is an unset Option<scalar>; its real kind is checked by serde on save
    if kind != ValueKind::Null && !kind.is_indexable() {
        return Err(FiledexError::UnsupportedKeyType {
            path: path.as_str().to_string(),
            kind: kind.to_string(),
        });
    }

    Ok(())
}

fn check_previous_info(collection: &Collection, info: &CollectionInfo) -> Result<()> {
    let Some(bytes) = collection.dir.read_optional(INFO_FILENAME)? else {
        return Ok(());
    };

    match serde_json::from_slice::<CollectionInfo>(&bytes) {
        Ok(previous) if previous != *info => {
            tracing::warn!(
                "Index keys of {} changed from {:?} to {:?}, existing files keep their old names",
                collection.type_name,
                previous.indexable_keys,
                info.indexable_keys
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(
                "Unreadable {} for {}, overwriting: {}",
                INFO_FILENAME,
                collection.type_name,
                e
            );
        }
    }

    Ok(())
}
