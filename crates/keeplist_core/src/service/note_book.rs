//! Notebook: note collection plus the current selection.
//!
//! # Responsibility
//! - Drive the select / new / save / delete flow of a single-pane note editor.
//! - Stamp notes with the injected clock on every save.
//!
//! # Invariants
//! - Display order is newest-first by timestamp (see `project_notes`).
//! - Saving with nothing selected creates a note; otherwise the selected note
//!   has its title/content replaced and its timestamp refreshed.
//! - After a save the saved note is selected; after a delete the newest
//!   remaining note (if any) is selected.

use crate::model::clock::Clock;
use crate::model::id::{EntityId, IdGenerator};
use crate::model::note::{Note, NoteDraft, NotePatch};
use crate::repo::kv_store::{KeyValueStore, StorageKey, StoreResult};
use crate::service::collection::{CollectionError, CollectionResult, OrderedCollection};
use crate::service::edit_state::EditSelectionState;
use crate::service::projection::project_notes;

/// Owning component for the notebook.
pub struct NoteBook<S: KeyValueStore, G: IdGenerator, C: Clock> {
    notes: OrderedCollection<Note, S, G>,
    selection: EditSelectionState,
    clock: C,
}

impl<S: KeyValueStore, G: IdGenerator, C: Clock> NoteBook<S, G, C> {
    /// Loads the notebook from the default notes key and selects the newest
    /// note, if any.
    pub fn open(store: S, ids: G, clock: C) -> StoreResult<Self> {
        Self::open_with_key(store, StorageKey::notes(), ids, clock)
    }

    pub fn open_with_key(store: S, key: StorageKey, ids: G, clock: C) -> StoreResult<Self> {
        let mut book = Self {
            notes: OrderedCollection::load(store, key, ids)?,
            selection: EditSelectionState::new(),
            clock,
        };
        book.select_newest();
        Ok(book)
    }

    pub fn collection(&self) -> &OrderedCollection<Note, S, G> {
        &self.notes
    }

    /// Notes newest-first.
    pub fn notes(&self) -> Vec<Note> {
        project_notes(self.notes.list())
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.selected_id()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected_id().and_then(|id| self.notes.get(id))
    }

    /// Selects an existing note. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> Option<&Note> {
        if !self.notes.contains(id) {
            return None;
        }
        self.selection.select(id);
        self.notes.get(id)
    }

    /// Starts a new-note flow: nothing selected, empty editor.
    pub fn new_note(&mut self) {
        self.selection.clear();
    }

    /// Saves editor input. Both fields are trimmed; a save with both blank
    /// is ignored and returns `None`.
    pub fn save(&mut self, title: &str, content: &str) -> CollectionResult<Option<Note>> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() && content.is_empty() {
            return Ok(None);
        }

        let timestamp = self.clock.now_epoch_ms();
        let saved = match self.selection.selected_id().map(str::to_string) {
            Some(id) => {
                let patch = NotePatch {
                    title: Some(title.to_string()),
                    content: Some(content.to_string()),
                    timestamp: Some(timestamp),
                };
                match self.notes.update(&id, patch) {
                    Err(CollectionError::NotFound(_)) => self.create(title, content, timestamp)?,
                    other => other?,
                }
            }
            None => self.create(title, content, timestamp)?,
        };

        self.selection.select(saved.id.clone());
        Ok(Some(saved))
    }

    /// Deletes the selected note and selects the newest remaining one.
    ///
    /// Returns the deleted id, or `None` when nothing was selected.
    pub fn delete_selected(&mut self) -> CollectionResult<Option<EntityId>> {
        let Some(id) = self.selection.selected_id().map(str::to_string) else {
            return Ok(None);
        };
        self.delete(&id)?;
        Ok(Some(id))
    }

    /// Deletes one note. Deleting the selected note moves the selection to
    /// the newest remaining note.
    pub fn delete(&mut self, id: &str) -> CollectionResult<bool> {
        let removed = self.notes.remove(id)?;
        if self.selection.selected_id() == Some(id) {
            self.selection.clear();
            self.select_newest();
        }
        Ok(removed)
    }

    fn create(&mut self, title: &str, content: &str, timestamp: i64) -> CollectionResult<Note> {
        self.notes.add(NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            timestamp,
        })
    }

    fn select_newest(&mut self) {
        if let Some(newest) = project_notes(self.notes.list()).into_iter().next() {
            self.selection.select(newest.id);
        }
    }
}
