//! Storage Module
//!
//! Thin file-system layer under the engine.
//!
//! ## Responsibilities
//! - Verify the root directory is writable on startup
//! - Map a collection name to its directory
//! - List, read, write and remove entries inside a collection directory
//!
//! ## Layout
//! ```text
//! {root}/
//! ├── .initCheck
//! └── 9f86d081884c7d65...            (sha256 of the type name, hex)
//!     ├── .info                      (JSON list of index keys)
//!     ├── .tmp-<uuid>                (in-flight write, renamed into place)
//!     └── username=726f6f74=username:meta.id=...=meta.id
//! ```

mod dir;
mod root;

pub use dir::{CollectionDir, StagedEntry, MAX_NAME_LEN};
pub use root::RootDir;
