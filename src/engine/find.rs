//! Find
//!
//! Point lookups scan the listing on the calling thread. Bulk finds hand the
//! listing to a pool of scoped workers that match and read in parallel, then
//! merge the hits back into listing order.

use bytes::Bytes;
use crossbeam::channel;
use parking_lot::Mutex;

use crate::codec;
use crate::document::Document;
use crate::error::{FiledexError, Result};
use crate::index::{matches, IndexKey};
use crate::storage::CollectionDir;

use super::Engine;

impl Engine {
    /// Find the first record matching every filter
    ///
    /// Filters whose value is absent or zero (`""`, `false`, `0`) are
    /// ignored. Returns `NoDocumentFound` when nothing matches.
    pub fn find_one<T: Document>(&self, filters: &[IndexKey]) -> Result<T> {
        let collection = self.collection::<T>()?;
        let required = required_tokens(filters);

        for name in collection.dir().list()? {
            if !matches(&name, &required) {
                continue;
            }
            tracing::trace!("find_one matched {}", name);
            let bytes = collection.dir().read(&name)?;
            return codec::decode(self.config.payload_format, &bytes);
        }

        Err(FiledexError::NoDocumentFound)
    }

    /// Find every record matching every filter
    ///
    /// Same filter rules as [`Engine::find_one`]. Entries that disappear or
    /// fail to read mid-scan are skipped. Results come back in directory
    /// listing order.
    pub fn find_all<T: Document>(&self, filters: &[IndexKey]) -> Result<Vec<T>> {
        let collection = self.collection::<T>()?;
        let required = required_tokens(filters);

        let names = collection.dir().list()?;
        let hits = self.scan(collection.dir(), &names, &required)?;

        tracing::debug!(
            "find_all on {} matched {} of {} entries",
            collection.type_name(),
            hits.len(),
            names.len()
        );

        hits.iter()
            .map(|bytes| codec::decode(self.config.payload_format, bytes))
            .collect()
    }

    /// Match and read `names` on the worker pool
    fn scan(&self, dir: &CollectionDir, names: &[String], required: &[String]) -> Result<Vec<Bytes>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let (sender, receiver) = channel::unbounded::<(usize, &str)>();
        for job in names.iter().map(String::as_str).enumerate() {
            if sender.send(job).is_err() {
                break;
            }
        }
        drop(sender);

        let hits: Mutex<Vec<(usize, Bytes)>> = Mutex::new(Vec::new());
        let workers = self.config.find_workers.min(names.len());

        crossbeam::thread::scope(|scope| {
            for _ in 0..workers {
                let receiver = receiver.clone();
                let hits = &hits;
                scope.spawn(move |_| {
                    for (index, name) in receiver.iter() {
                        if !matches(name, required) {
                            continue;
                        }
                        // Read outside the lock, only the push is serialized
                        match dir.read(name) {
                            Ok(bytes) => hits.lock().push((index, Bytes::from(bytes))),
                            Err(e) => tracing::debug!("Skipping {}: {}", name, e),
                        }
                    }
                });
            }
        })
        .map_err(|e| FiledexError::WorkerPanicked(format!("{:?}", e)))?;

        let mut hits = hits.into_inner();
        hits.sort_by_key(|(index, _)| *index);
        Ok(hits.into_iter().map(|(_, bytes)| bytes).collect())
    }
}

/// Tokens for every filter that has a non-zero value
fn required_tokens(filters: &[IndexKey]) -> Vec<String> {
    filters
        .iter()
        .filter(|filter| !filter.is_unset())
        .map(IndexKey::token)
        .collect()
}
