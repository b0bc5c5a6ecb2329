//! Whole-collection persistence adapter.
//!
//! # Responsibility
//! - Serialize an ordered collection to one key as a JSON array.
//! - Decode stored payloads, recovering from malformed data instead of failing.
//!
//! # Invariants
//! - Writes always carry the full collection in canonical order.
//! - Decoded records are returned sorted by `(order_key, id)`.
//! - A payload with duplicate ids is malformed as a whole.

use crate::model::id::EntityId;
use crate::model::record::{compare_order, Record};
use crate::repo::kv_store::{KeyValueStore, StorageKey, StoreError, StoreResult};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stored payload could not be turned into a valid collection.
#[derive(Debug)]
pub enum DeserializationError {
    /// Payload is not a JSON array of records of the expected shape.
    Json(serde_json::Error),
    /// Payload repeats an id.
    DuplicateId(EntityId),
}

impl Display for DeserializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "stored collection is not valid: {err}"),
            Self::DuplicateId(id) => write!(f, "stored collection repeats id `{id}`"),
        }
    }
}

impl Error for DeserializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

/// Result of reading one collection key.
#[derive(Debug)]
pub struct LoadOutcome<R> {
    /// Records in canonical order; empty when nothing usable was stored.
    pub records: Vec<R>,
    /// Set when a stored payload was present but discarded.
    pub recovered: Option<DeserializationError>,
}

/// Persists one collection under one storage key.
pub struct CollectionStore<S: KeyValueStore> {
    store: S,
    key: StorageKey,
}

impl<S: KeyValueStore> CollectionStore<S> {
    pub fn new(store: S, key: StorageKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads and decodes the collection.
    ///
    /// A missing key yields an empty collection. A malformed payload yields an
    /// empty collection plus `recovered`. Only storage transport failures are
    /// returned as `Err`.
    pub fn load<R: Record>(&self) -> StoreResult<LoadOutcome<R>> {
        let Some(bytes) = self.store.get(&self.key)? else {
            return Ok(LoadOutcome {
                records: Vec::new(),
                recovered: None,
            });
        };

        Ok(match decode_records(&bytes) {
            Ok(records) => LoadOutcome {
                records,
                recovered: None,
            },
            Err(err) => LoadOutcome {
                records: Vec::new(),
                recovered: Some(err),
            },
        })
    }

    /// Replaces the stored collection with `records`.
    pub fn save<R: Record>(&self, records: &[R]) -> StoreResult<()> {
        let bytes = serde_json::to_vec(records).map_err(StoreError::Serialization)?;
        self.store.set(&self.key, &bytes)
    }
}

/// Decodes a stored JSON array into records in canonical order.
pub fn decode_records<R: Record>(bytes: &[u8]) -> Result<Vec<R>, DeserializationError> {
    let mut records: Vec<R> = serde_json::from_slice(bytes).map_err(DeserializationError::Json)?;

    {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(DeserializationError::DuplicateId(record.id().to_string()));
            }
        }
    }

    records.sort_by(compare_order);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{decode_records, CollectionStore, DeserializationError};
    use crate::model::task::Task;
    use crate::repo::kv_store::{KeyValueStore, MemoryKvStore, StorageKey};

    #[test]
    fn decode_sorts_by_order_then_id() {
        let payload = br#"[
            {"id":"b","text":"second","completed":false,"order":1},
            {"id":"z","text":"tie","completed":false,"order":0},
            {"id":"a","text":"first","completed":true,"order":0}
        ]"#;
        let tasks: Vec<Task> = decode_records(payload).unwrap();
        let ids: Vec<_> = tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, ["a", "z", "b"]);
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let payload = br#"[{"id":"a","text":"x"},{"id":"a","text":"y"}]"#;
        let err = decode_records::<Task>(payload).unwrap_err();
        assert!(matches!(err, DeserializationError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn load_of_missing_key_is_empty_without_error() {
        let store = CollectionStore::new(MemoryKvStore::new(), StorageKey::tasks());
        let outcome = store.load::<Task>().unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.recovered.is_none());
    }

    #[test]
    fn save_writes_json_array_to_underlying_store() {
        let store = CollectionStore::new(MemoryKvStore::new(), StorageKey::tasks());
        let tasks: Vec<Task> = decode_records(br#"[{"id":"a","text":"x","order":0}]"#).unwrap();
        store.save(&tasks).unwrap();

        let bytes = store.store().get(&StorageKey::tasks()).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["order"], 0);
        assert_eq!(store.load::<Task>().unwrap().records, tasks);
    }

    #[test]
    fn load_of_malformed_payload_recovers_empty() {
        let kv = MemoryKvStore::new();
        kv.set(&StorageKey::tasks(), b"{not json").unwrap();
        let store = CollectionStore::new(&kv, StorageKey::tasks());

        let outcome = store.load::<Task>().unwrap();
        assert!(outcome.records.is_empty());
        assert!(matches!(outcome.recovered, Some(DeserializationError::Json(_))));
    }
}
