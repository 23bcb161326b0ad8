//! Document Module
//!
//! The contract a record type fulfils to be stored.
//!
//! A record is any serde struct that embeds a [`Meta`] block under the key
//! `meta`:
//!
//! ```rust,ignore
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     meta: Meta,
//!     username: String,
//!     password: String,
//! }
//!
//! impl Document for User {}
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Key of the metadata block inside a serialized record
pub const META_KEY: &str = "meta";

/// Path of the record identifier, always the last index key
pub const ID_PATH: &str = "meta.id";

/// Path of the creation timestamp
pub const CREATED_AT_PATH: &str = "meta.createdAt";

/// Path of the last update timestamp
pub const UPDATED_AT_PATH: &str = "meta.updatedAt";

/// Metadata block every record carries
///
/// An empty `id` means the record was never saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meta {
    /// True once the record has been assigned an id by a save
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

/// A storable record type
pub trait Document: Serialize + DeserializeOwned + Send {
    /// Name of the collection this type is stored in
    ///
    /// Defaults to the bare type name (`User` for `my_app::models::User`).
    ///
    /// Module paths and generic arguments are dropped, so `a::User` and
    /// `b::User`, or `Page<Post>` and `Page<Comment>`, land in the same
    /// collection directory with no warning. Override this for any type whose
    /// bare name is not unique within one store.
    fn type_name() -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }
}
