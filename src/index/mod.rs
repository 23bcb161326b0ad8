//! Index Module
//!
//! Everything that turns a record into its filename.
//!
//! ## Responsibilities
//! - Resolve dotted field paths inside a record (`path`)
//! - Canonicalize scalar values into hex tokens (`key`)
//! - Compose tokens into filenames and match filenames against filters (`filename`)
//!
//! There is no separate index structure: the filename is the index.

pub mod filename;
pub mod key;
pub mod path;

pub use filename::{
    build_filename, build_token, decode_filename, is_hidden, matches, FORBIDDEN_KEY_CHARS,
};
pub use key::{encode_scalar, IndexKey, IndexValue};
pub use path::{FieldPath, FieldValue, ValueKind};
