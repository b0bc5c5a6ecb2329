//! Core of the keeplist note/task manager.
//!
//! Holds ordered collections in memory, writes them through to a key-value
//! store after every mutation, and exposes filtered projections for
//! renderers. Rendering, input capture and raw persistence stay outside.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::clock::{Clock, FixedClock, SystemClock};
pub use model::id::{EntityId, IdGenerator, SequenceIdGenerator, UuidIdGenerator};
pub use model::note::{Note, NoteDraft, NotePatch};
pub use model::record::{OrderKey, Record};
pub use model::task::{Task, TaskDraft, TaskPatch};
pub use repo::collection_store::{CollectionStore, DeserializationError, LoadOutcome};
pub use repo::kv_store::{
    KeyValueStore, MemoryKvStore, SqliteKvStore, StorageKey, StoreError, StoreResult,
    NOTES_STORAGE_KEY, TASKS_STORAGE_KEY,
};
pub use service::collection::{
    CollectionError, CollectionResult, OrderedCollection, ReorderOutcome,
};
pub use service::edit_state::{ActiveTarget, EditSelectionState, EditSession};
pub use service::note_book::NoteBook;
pub use service::projection::{project_notes, project_tasks, TaskFilter, UnknownFilter};
pub use service::task_board::{EditCommit, TaskBoard, TaskBoardError, TaskCounts};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
