//! Save (upsert)

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::codec;
use crate::document::{Document, CREATED_AT_PATH, ID_PATH, UPDATED_AT_PATH};
use crate::error::Result;
use crate::index::{build_filename, build_token, path, FieldPath, IndexValue};

use super::Engine;

impl Engine {
    /// Insert or update a record
    ///
    /// Steps:
    /// 1. Resolve the collection
    /// 2. Assign a fresh id when the record has none
    /// 3. Stamp `updatedAt`, and `createdAt` for new records
    /// 4. Build the filename from every index key
    /// 5. Encode the payload and stage it in a temp file
    /// 6. For an existing record, remove its old file by id
    /// 7. Rename the staged file into place
    ///
    /// `record` is updated in place with its id and timestamps. Fields marked
    /// `#[serde(skip)]` come back as their default.
    ///
    /// Anything that can be known to fail (an over-long filename, a full disk
    /// on the payload write) fails before step 6 and leaves the old file in
    /// place. Steps 6 and 7 are still separate file operations: a crash
    /// between them loses the record.
    pub fn save<T: Document>(&self, record: &mut T) -> Result<()> {
        // Step 1: Resolve
        let collection = self.collection::<T>()?;
        let mut value = serde_json::to_value(&*record)?;

        // Step 2: Identity
        let id_path = FieldPath::parse(ID_PATH)?;
        let is_new = path::get(&value, &id_path)?.is_zero;
        if is_new {
            path::set(
                &mut value,
                &id_path,
                Value::String(Uuid::new_v4().to_string()),
            )?;
        }

        // Step 3: Timestamps
        let now = serde_json::to_value(Utc::now())?;
        if is_new {
            path::set(&mut value, &FieldPath::parse(CREATED_AT_PATH)?, now.clone())?;
        }
        path::set(&mut value, &FieldPath::parse(UPDATED_AT_PATH)?, now)?;

        // Step 4: Filename
        let mut tokens = Vec::with_capacity(collection.index_paths().len());
        for key in collection.index_paths() {
            let field = path::get(&value, key)?;
            let scalar = field.value.and_then(IndexValue::from_json);
            tokens.push(build_token(key.as_str(), scalar.as_ref()));
        }
        let filename = build_filename(&tokens);

        // Step 5: Payload
        // The id token is last, keep it for the delete below before `value` moves
        let id_token = tokens.pop().unwrap_or_default();
        *record = serde_json::from_value(value)?;
        let payload = codec::encode(self.config.payload_format, &*record)?;
        let staged = collection.dir().stage(&filename, &payload)?;

        // Step 6: Clear the previous file, its name may differ
        if !is_new {
            self.remove_matching(collection.dir(), &[id_token], true)?;
        }

        // Step 7: Publish
        staged.commit()?;

        tracing::debug!(
            "Saved {} record ({}) as {}",
            collection.type_name(),
            if is_new { "new" } else { "update" },
            filename
        );

        Ok(())
    }
}
