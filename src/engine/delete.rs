//! Delete

use std::ops::ControlFlow;

use crate::document::{Document, ID_PATH};
use crate::error::Result;
use crate::index::{build_token, path, IndexValue};
use crate::storage::CollectionDir;

use super::{walk_matching, Engine};

impl Engine {
    /// Remove every record matching the non-zero index fields of `template`
    ///
    /// - A template with an id removes at most that one record, all other
    ///   fields are ignored
    /// - Otherwise all non-zero index fields must match (AND)
    /// - A template with only zero fields removes **every** record of the type
    ///
    /// Returns the number of files removed.
    pub fn delete<T: Document>(&self, template: &T) -> Result<usize> {
        let collection = self.collection::<T>()?;
        let value = serde_json::to_value(template)?;

        let mut tokens = Vec::new();
        let mut only_id = false;

        for key in collection.index_paths() {
            let field = path::get(&value, key)?;
            if field.is_zero {
                continue;
            }

            let scalar = field.value.and_then(IndexValue::from_json);
            let token = build_token(key.as_str(), scalar.as_ref());

            if key.as_str() == ID_PATH {
                tokens = vec![token];
                only_id = true;
                break;
            }
            tokens.push(token);
        }

        let removed = self.remove_matching(collection.dir(), &tokens, only_id)?;

        tracing::debug!(
            "Removed {} {} record(s) matching {} token(s)",
            removed,
            collection.type_name(),
            tokens.len()
        );

        Ok(removed)
    }

    /// Remove matching entries, stopping after the first when `first_only`
    pub(super) fn remove_matching(
        &self,
        dir: &CollectionDir,
        tokens: &[String],
        first_only: bool,
    ) -> Result<usize> {
        walk_matching(dir, tokens, |name| {
            dir.remove(name)?;
            tracing::trace!("Removed {}", name);
            if first_only {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        })
    }
}
