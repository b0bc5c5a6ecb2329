//! To-do board: task collection plus edit session and current filter.
//!
//! # Responsibility
//! - Translate discrete UI events (add, toggle, edit, drag) into collection calls.
//! - Enforce the single-edit rule and the blank-commit-deletes rule.
//!
//! # Invariants
//! - At most one task is in an edit session.
//! - Beginning an edit on another task first commits the interrupted session
//!   using its latest draft text.
//! - A commit with blank text removes the task; blank text is never persisted.
//! - Cancel restores cached text and issues no store mutation.

use crate::model::id::{EntityId, IdGenerator};
use crate::model::task::{Task, TaskDraft, TaskPatch};
use crate::repo::kv_store::{KeyValueStore, StorageKey, StoreResult};
use crate::service::collection::{
    CollectionError, CollectionResult, OrderedCollection, ReorderOutcome,
};
use crate::service::edit_state::{EditSelectionState, EditSession};
use crate::service::projection::{project_tasks, TaskFilter};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from board operations.
#[derive(Debug)]
pub enum TaskBoardError {
    Collection(CollectionError),
    /// Commit or cancel was requested with no edit session open.
    NoActiveEdit,
}

impl Display for TaskBoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection(err) => write!(f, "{err}"),
            Self::NoActiveEdit => write!(f, "no task is being edited"),
        }
    }
}

impl Error for TaskBoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            Self::NoActiveEdit => None,
        }
    }
}

impl From<CollectionError> for TaskBoardError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

/// How an edit session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommit {
    /// Non-blank text was saved.
    Updated(Task),
    /// Blank text was committed, so the task was deleted.
    Removed(EntityId),
    /// The task disappeared while being edited; nothing was written.
    Discarded(EntityId),
}

/// Task totals across the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

/// Owning component for the to-do list.
pub struct TaskBoard<S: KeyValueStore, G: IdGenerator> {
    tasks: OrderedCollection<Task, S, G>,
    edit: EditSelectionState,
    filter: TaskFilter,
}

impl<S: KeyValueStore, G: IdGenerator> TaskBoard<S, G> {
    /// Loads the board from the default tasks key.
    pub fn open(store: S, ids: G) -> StoreResult<Self> {
        Self::open_with_key(store, StorageKey::tasks(), ids)
    }

    pub fn open_with_key(store: S, key: StorageKey, ids: G) -> StoreResult<Self> {
        Ok(Self {
            tasks: OrderedCollection::load(store, key, ids)?,
            edit: EditSelectionState::new(),
            filter: TaskFilter::default(),
        })
    }

    pub fn collection(&self) -> &OrderedCollection<Task, S, G> {
        &self.tasks
    }

    /// Every task in collection order.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.list()
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Tasks visible under the current filter.
    pub fn visible(&self) -> Vec<Task> {
        project_tasks(self.tasks.list(), self.filter)
    }

    pub fn counts(&self) -> TaskCounts {
        let total = self.tasks.len();
        let completed = self.tasks.list().iter().filter(|task| task.completed).count();
        TaskCounts {
            active: total - completed,
            completed,
            total,
        }
    }

    pub fn edit_state(&self) -> &EditSelectionState {
        &self.edit
    }

    /// Adds a task from raw input. Blank input is ignored.
    pub fn add_task(&mut self, raw_text: &str) -> CollectionResult<Option<Task>> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.tasks.add(TaskDraft::new(text)).map(Some)
    }

    /// Flips completion. Unknown ids are a no-op returning `None`.
    pub fn toggle_complete(&mut self, id: &str) -> CollectionResult<Option<Task>> {
        ignore_not_found(self.tasks.toggle_status(id))
    }

    /// Sets completion. Unknown ids are a no-op returning `None`.
    pub fn set_completed(&mut self, id: &str, completed: bool) -> CollectionResult<Option<Task>> {
        ignore_not_found(self.tasks.set_status(id, completed))
    }

    /// Deletes one task, closing its edit session if open.
    pub fn delete_task(&mut self, id: &str) -> CollectionResult<bool> {
        let removed = self.tasks.remove(id)?;
        self.edit.forget(id);
        Ok(removed)
    }

    /// Drops `moved_id` directly before `target_id`.
    pub fn reorder(&mut self, moved_id: &str, target_id: &str) -> CollectionResult<ReorderOutcome> {
        self.tasks.reorder(moved_id, target_id)
    }

    /// Opens an edit session on `id`.
    ///
    /// When another task is being edited, that session is committed first
    /// with its draft text and the outcome is returned.
    ///
    /// # Errors
    /// - `NotFound` when `id` is absent; the current session is kept.
    pub fn begin_edit(&mut self, id: &str) -> Result<Option<EditCommit>, TaskBoardError> {
        let original_text = self
            .tasks
            .get(id)
            .map(|task| task.text.clone())
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;

        if self.edit.editing().is_some_and(|session| session.id == id) {
            return Ok(None);
        }

        let interrupted = match self.edit.finish_edit() {
            Some(session) => {
                debug!("event=edit_interrupted module=task_board status=commit");
                let draft = session.draft_text.clone();
                Some(self.resolve(session, &draft)?)
            }
            None => None,
        };

        self.edit.begin_edit(id, original_text);
        Ok(interrupted)
    }

    /// Records in-progress input for the open session.
    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        self.edit.set_draft(text)
    }

    /// Ends the open session with `text`: saves it, or deletes the task when
    /// `text` is blank after trimming.
    ///
    /// On a storage failure the session stays open.
    pub fn commit_edit(&mut self, text: &str) -> Result<EditCommit, TaskBoardError> {
        let session = self.edit.finish_edit().ok_or(TaskBoardError::NoActiveEdit)?;
        self.resolve(session, text)
    }

    /// Ends the open session without writing anything.
    ///
    /// The returned session carries the cached `original_text` to redisplay.
    pub fn cancel_edit(&mut self) -> Result<EditSession, TaskBoardError> {
        self.edit.finish_edit().ok_or(TaskBoardError::NoActiveEdit)
    }

    fn resolve(&mut self, session: EditSession, text: &str) -> Result<EditCommit, TaskBoardError> {
        let trimmed = text.trim();
        let result = if trimmed.is_empty() {
            self.tasks
                .remove(&session.id)
                .map(|_| EditCommit::Removed(session.id.clone()))
        } else {
            match self.tasks.update(&session.id, TaskPatch::text(trimmed)) {
                Ok(task) => Ok(EditCommit::Updated(task)),
                Err(CollectionError::NotFound(id)) => Ok(EditCommit::Discarded(id)),
                Err(err) => Err(err),
            }
        };

        result.map_err(|err| {
            self.edit.resume(session);
            TaskBoardError::Collection(err)
        })
    }
}

fn ignore_not_found<T>(result: CollectionResult<T>) -> CollectionResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CollectionError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
