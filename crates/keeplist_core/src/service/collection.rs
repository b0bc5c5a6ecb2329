//! Ordered in-memory collection with write-through persistence.
//!
//! # Responsibility
//! - Own the authoritative list of records for one storage key.
//! - Implement add/update/remove/reorder and persist after every mutation.
//!
//! # Invariants
//! - Ids are unique within the collection at all times.
//! - `items` is always sorted by `(order_key, id)`.
//! - A mutation returns only after the full collection was written. When the
//!   write fails, in-memory state is rolled back to match the store.
//! - Blank records are never inserted or persisted.

use crate::model::id::{EntityId, IdGenerator};
use crate::model::record::{OrderKey, Record};
use crate::model::task::{Task, TaskPatch};
use crate::repo::collection_store::{CollectionStore, DeserializationError};
use crate::repo::kv_store::{KeyValueStore, StorageKey, StoreError, StoreResult};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attempts at drawing a fresh id before `add` gives up.
const MAX_ID_ATTEMPTS: usize = 8;

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Errors from collection mutations.
#[derive(Debug)]
pub enum CollectionError {
    /// Record would be blank after the operation.
    InvalidInput(&'static str),
    /// Referenced id is not in the collection.
    NotFound(EntityId),
    /// Id generator kept returning ids already in use.
    DuplicateId(EntityId),
    /// Write-through failed; the mutation was rolled back.
    Store(StoreError),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::DuplicateId(id) => write!(f, "generated id already in use: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CollectionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// The moved record now sits directly before the target.
    Moved,
    /// Unknown id, or moved onto itself. Nothing was written.
    NoOp,
}

/// Authoritative ordered collection for one record type.
pub struct OrderedCollection<R: Record, S: KeyValueStore, G: IdGenerator> {
    items: Vec<R>,
    store: CollectionStore<S>,
    ids: G,
    recovered: Option<DeserializationError>,
}

impl<R: Record, S: KeyValueStore, G: IdGenerator> OrderedCollection<R, S, G> {
    /// Loads the collection stored under `key`.
    ///
    /// Malformed stored data is discarded: the collection starts empty and
    /// the decode error is logged and kept in `recovered_error()`.
    ///
    /// # Errors
    /// - Storage transport failures from the underlying store.
    pub fn load(store: S, key: StorageKey, ids: G) -> StoreResult<Self> {
        let store = CollectionStore::new(store, key);
        let outcome = store.load::<R>()?;

        match &outcome.recovered {
            Some(err) => warn!(
                "event=collection_load module=collection status=recovered kind={} key={} error={}",
                R::KIND,
                store.key(),
                err
            ),
            None => info!(
                "event=collection_load module=collection status=ok kind={} key={} count={}",
                R::KIND,
                store.key(),
                outcome.records.len()
            ),
        }

        Ok(Self {
            items: outcome.records,
            store,
            ids,
            recovered: outcome.recovered,
        })
    }

    /// Decode error discarded by `load`, if any.
    pub fn recovered_error(&self) -> Option<&DeserializationError> {
        self.recovered.as_ref()
    }

    pub fn key(&self) -> &StorageKey {
        self.store.key()
    }

    /// Records in canonical order.
    pub fn list(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a new record after every existing one.
    ///
    /// No duplicate-text detection is performed.
    ///
    /// # Errors
    /// - `InvalidInput` when the record would be blank.
    /// - `DuplicateId` when the generator keeps colliding with existing ids.
    /// - `Store` when write-through fails.
    pub fn add(&mut self, draft: R::Draft) -> CollectionResult<R> {
        let id = self.fresh_id()?;
        let previous = self.items.clone();
        let record = R::from_draft(id, self.next_order_key(), draft);
        if record.is_blank() {
            self.items = previous;
            return Err(CollectionError::InvalidInput("entity text must not be blank"));
        }

        self.items.push(record.clone());
        self.write_through("entity_add", previous)?;
        Ok(record)
    }

    /// Applies `patch` to one record, leaving unset fields untouched.
    ///
    /// # Errors
    /// - `NotFound` when `id` is absent.
    /// - `InvalidInput` when the patched record would be blank.
    /// - `Store` when write-through fails.
    pub fn update(&mut self, id: &str, patch: R::Patch) -> CollectionResult<R> {
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;

        let mut updated = self.items[index].clone();
        updated.apply_patch(patch);
        if updated.is_blank() {
            return Err(CollectionError::InvalidInput("entity text must not be blank"));
        }

        let previous = self.items.clone();
        self.items[index] = updated.clone();
        self.write_through("entity_update", previous)?;
        Ok(updated)
    }

    /// Removes one record. Removing an absent id is a no-op.
    ///
    /// Returns whether a record was removed.
    pub fn remove(&mut self, id: &str) -> CollectionResult<bool> {
        let Some(index) = self.position(id) else {
            debug!(
                "event=entity_remove module=collection status=noop kind={} key={}",
                R::KIND,
                self.store.key()
            );
            return Ok(false);
        };

        let previous = self.items.clone();
        self.items.remove(index);
        self.write_through("entity_remove", previous)?;
        Ok(true)
    }

    /// Moves `moved_id` to sit immediately before `target_id`.
    ///
    /// The record is taken out first and reinserted at the target's index in
    /// the shortened list, so it lands above the target for both upward and
    /// downward moves. All order keys are then renumbered `0..n`.
    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> CollectionResult<ReorderOutcome> {
        if moved_id == target_id {
            return Ok(ReorderOutcome::NoOp);
        }
        let (Some(from), true) = (self.position(moved_id), self.contains(target_id)) else {
            debug!(
                "event=entity_reorder module=collection status=noop kind={} key={}",
                R::KIND,
                self.store.key()
            );
            return Ok(ReorderOutcome::NoOp);
        };

        let previous = self.items.clone();
        let moved = self.items.remove(from);
        let Some(to) = self.position(target_id) else {
            self.items = previous;
            return Ok(ReorderOutcome::NoOp);
        };
        self.items.insert(to, moved);
        self.renumber();

        self.write_through("entity_reorder", previous)?;
        Ok(ReorderOutcome::Moved)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Key strictly above every current key. When the largest key cannot be
    /// incremented, existing records are renumbered `0..n` first.
    fn next_order_key(&mut self) -> OrderKey {
        let Some(max) = self.items.iter().map(Record::order_key).max() else {
            return 0;
        };
        match max.checked_add(1) {
            Some(next) => next,
            None => {
                warn!(
                    "event=order_key_overflow module=collection status=renumber kind={} key={}",
                    R::KIND,
                    self.store.key()
                );
                self.renumber();
                self.items.len() as OrderKey
            }
        }
    }

    fn renumber(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_order_key(index as OrderKey);
        }
    }

    fn fresh_id(&self) -> CollectionResult<EntityId> {
        let mut last = EntityId::new();
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.generate_id();
            if !candidate.is_empty() && !self.contains(&candidate) {
                return Ok(candidate);
            }
            last = candidate;
        }
        Err(CollectionError::DuplicateId(last))
    }

    /// Persists the full collection, restoring `previous` on failure.
    fn write_through(&mut self, event: &'static str, previous: Vec<R>) -> CollectionResult<()> {
        if let Err(err) = self.store.save(&self.items) {
            self.items = previous;
            error!(
                "event={event} module=collection status=error kind={} key={} error={}",
                R::KIND,
                self.store.key(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event={event} module=collection status=ok kind={} key={} count={}",
            R::KIND,
            self.store.key(),
            self.items.len()
        );
        Ok(())
    }
}

impl<S: KeyValueStore, G: IdGenerator> OrderedCollection<Task, S, G> {
    /// Sets the completion flag of one task.
    pub fn set_status(&mut self, id: &str, completed: bool) -> CollectionResult<Task> {
        self.update(id, TaskPatch::completed(completed))
    }

    /// Flips the completion flag of one task.
    pub fn toggle_status(&mut self, id: &str) -> CollectionResult<Task> {
        let completed = self
            .get(id)
            .map(|task| task.completed)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        self.set_status(id, !completed)
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionError, OrderedCollection, ReorderOutcome};
    use crate::model::id::SequenceIdGenerator;
    use crate::model::task::{Task, TaskDraft, TaskPatch};
    use crate::repo::kv_store::{KeyValueStore, MemoryKvStore, StorageKey};

    type Tasks<'a> = OrderedCollection<Task, &'a MemoryKvStore, SequenceIdGenerator>;

    fn tasks_with<'a>(kv: &'a MemoryKvStore, texts: &[&str]) -> Tasks<'a> {
        let mut tasks =
            OrderedCollection::load(kv, StorageKey::tasks(), SequenceIdGenerator::new("t"))
                .unwrap();
        for text in texts {
            tasks.add(TaskDraft::new(*text)).unwrap();
        }
        tasks
    }

    fn ids(tasks: &Tasks<'_>) -> Vec<String> {
        tasks.list().iter().map(|task| task.id.clone()).collect()
    }

    #[test]
    fn add_appends_with_increasing_order_keys() {
        let kv = MemoryKvStore::new();
        let tasks = tasks_with(&kv, &["a", "b", "c"]);
        let keys: Vec<_> = tasks.list().iter().map(|task| task.order_key).collect();
        assert_eq!(keys, [0, 1, 2]);
    }

    #[test]
    fn add_rejects_blank_text() {
        let kv = MemoryKvStore::new();
        let mut tasks = tasks_with(&kv, &[]);
        let err = tasks.add(TaskDraft::new("   ")).unwrap_err();
        assert!(matches!(err, CollectionError::InvalidInput(_)));
        assert!(tasks.is_empty());
        assert!(kv.is_empty());
    }

    #[test]
    fn add_skips_ids_already_in_use() {
        let kv = MemoryKvStore::new();
        {
            let mut seeded = OrderedCollection::<Task, _, _>::load(
                &kv,
                StorageKey::tasks(),
                SequenceIdGenerator::new("t"),
            )
            .unwrap();
            seeded.add(TaskDraft::new("first")).unwrap();
        }

        let mut tasks = tasks_with(&kv, &[]);
        let added = tasks.add(TaskDraft::new("second")).unwrap();
        assert_eq!(added.id, "t-2");
    }

    #[test]
    fn update_rejects_blank_and_keeps_previous_text() {
        let kv = MemoryKvStore::new();
        let mut tasks = tasks_with(&kv, &["a"]);
        let err = tasks.update("t-1", TaskPatch::text("")).unwrap_err();
        assert!(matches!(err, CollectionError::InvalidInput(_)));
        assert_eq!(tasks.get("t-1").unwrap().text, "a");
    }

    #[test]
    fn reorder_moving_down_lands_before_target() {
        let kv = MemoryKvStore::new();
        let mut tasks = tasks_with(&kv, &["a", "b", "c"]);
        let outcome = tasks.reorder("t-1", "t-3").unwrap();
        assert_eq!(outcome, ReorderOutcome::Moved);
        assert_eq!(ids(&tasks), ["t-2", "t-1", "t-3"]);
    }

    #[test]
    fn reorder_renumbers_after_colliding_keys() {
        let kv = MemoryKvStore::new();
        kv.set(
            &StorageKey::tasks(),
            br#"[
                {"id":"a","text":"a","order":5},
                {"id":"b","text":"b","order":5},
                {"id":"c","text":"c","order":5},
                {"id":"d","text":"d","order":7}
            ]"#,
        )
        .unwrap();
        let mut tasks = tasks_with(&kv, &[]);
        assert_eq!(ids(&tasks), ["a", "b", "c", "d"]);

        tasks.reorder("d", "b").unwrap();
        let keys: Vec<_> = tasks.list().iter().map(|task| task.order_key).collect();
        assert_eq!(keys, [0, 1, 2, 3]);
        assert_eq!(ids(&tasks), ["a", "d", "b", "c"]);
    }

    #[test]
    fn add_after_maximum_order_key_renumbers_and_appends() {
        let kv = MemoryKvStore::new();
        let payload = format!(r#"[{{"id":"m","text":"max","order":{}}}]"#, i64::MAX);
        kv.set(&StorageKey::tasks(), payload.as_bytes()).unwrap();
        let mut tasks = tasks_with(&kv, &[]);

        let added = tasks.add(TaskDraft::new("y")).unwrap();
        assert_eq!(added.order_key, 1);
        assert_eq!(ids(&tasks), ["m", "t-1"]);
        let keys: Vec<_> = tasks.list().iter().map(|task| task.order_key).collect();
        assert_eq!(keys, [0, 1]);

        let reloaded = tasks_with(&kv, &[]);
        assert_eq!(ids(&reloaded), ["m", "t-1"]);
    }

    #[test]
    fn toggle_status_flips_completion() {
        let kv = MemoryKvStore::new();
        let mut tasks = tasks_with(&kv, &["a"]);
        assert!(tasks.toggle_status("t-1").unwrap().completed);
        assert!(!tasks.toggle_status("t-1").unwrap().completed);
        let err = tasks.toggle_status("missing").unwrap_err();
        assert!(matches!(err, CollectionError::NotFound(id) if id == "missing"));
    }
}
