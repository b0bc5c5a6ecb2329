//! Task record for the to-do list variant.
//!
//! # Invariants
//! - `text` is never persisted blank; blank edits delete the task instead.
//! - Serialized shape is `{id, text, completed, order}`.

use crate::model::id::EntityId;
use crate::model::record::{OrderKey, Record};
use serde::{Deserialize, Serialize};

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "order", default)]
    pub order_key: OrderKey,
}

/// Creation input for `Task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Partial update for `Task`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Replaces task text only.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    /// Sets completion only.
    pub fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }
}

impl Record for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const KIND: &'static str = "task";

    fn from_draft(id: EntityId, order_key: OrderKey, draft: TaskDraft) -> Self {
        Self {
            id,
            text: draft.text,
            completed: false,
            order_key,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn order_key(&self) -> OrderKey {
        self.order_key
    }

    fn set_order_key(&mut self, order_key: OrderKey) {
        self.order_key = order_key;
    }

    fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskDraft, TaskPatch};
    use crate::model::record::Record;

    #[test]
    fn draft_starts_incomplete() {
        let task = Task::from_draft("t1".to_string(), 4, TaskDraft::new("buy milk"));
        assert!(!task.completed);
        assert_eq!(task.order_key, 4);
    }

    #[test]
    fn patch_leaves_unset_fields_untouched() {
        let mut task = Task::from_draft("t1".to_string(), 0, TaskDraft::new("buy milk"));
        task.apply_patch(TaskPatch::completed(true));
        assert_eq!(task.text, "buy milk");
        assert!(task.completed);

        task.apply_patch(TaskPatch::text("buy oat milk"));
        assert_eq!(task.text, "buy oat milk");
        assert!(task.completed);
        assert_eq!(task.id, "t1");
    }

    #[test]
    fn deserializes_legacy_shape_with_defaults() {
        let task: Task = serde_json::from_str(r#"{"id":"a","text":"x"}"#).unwrap();
        assert!(!task.completed);
        assert_eq!(task.order_key, 0);
    }

    #[test]
    fn whitespace_text_is_blank() {
        let task = Task::from_draft("t1".to_string(), 0, TaskDraft::new("  \t"));
        assert!(task.is_blank());
    }
}
