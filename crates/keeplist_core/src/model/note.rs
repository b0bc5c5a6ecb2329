//! Note record for the notebook variant.
//!
//! # Invariants
//! - A note is blank only when both `title` and `content` are blank.
//! - `timestamp` is last-modified epoch ms; it drives display order, not identity.

use crate::model::id::EntityId;
use crate::model::record::{OrderKey, Record};
use serde::{Deserialize, Serialize};

/// One notebook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Unix epoch milliseconds of the last save.
    pub timestamp: i64,
    #[serde(rename = "order", default)]
    pub order_key: OrderKey,
}

impl Note {
    /// Title used by list renderers when the stored title is empty.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}

/// Creation input for `Note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub timestamp: i64,
}

/// Partial update for `Note`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub timestamp: Option<i64>,
}

impl Record for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    const KIND: &'static str = "note";

    fn from_draft(id: EntityId, order_key: OrderKey, draft: NoteDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            timestamp: draft.timestamp,
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

    fn apply_patch(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(timestamp) = patch.timestamp {
            self.timestamp = timestamp;
        }
    }

    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteDraft};
    use crate::model::record::Record;

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            timestamp: 1_000,
        }
    }

    #[test]
    fn body_only_note_is_not_blank() {
        let note = Note::from_draft("n1".to_string(), 0, draft("", "body"));
        assert!(!note.is_blank());
        assert_eq!(note.display_title(), "(Untitled)");
    }

    #[test]
    fn empty_title_and_body_is_blank() {
        let note = Note::from_draft("n1".to_string(), 0, draft(" ", "\n"));
        assert!(note.is_blank());
    }

    #[test]
    fn deserializes_record_without_order() {
        let note: Note =
            serde_json::from_str(r#"{"id":"n","title":"t","content":"c","timestamp":5}"#).unwrap();
        assert_eq!(note.order_key, 0);
        assert_eq!(note.timestamp, 5);
    }
}
