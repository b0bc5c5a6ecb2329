//! Single-slot edit/selection state machine.
//!
//! # Responsibility
//! - Track which one entity, if any, is selected or being edited.
//! - Cache the text shown when an edit began so cancel can restore it.
//!
//! # Invariants
//! - At most one target is active at a time.
//! - Entering a new state hands back any interrupted edit session so the
//!   owner can resolve it; sessions are never dropped silently.
//! - This type never touches storage; owners issue store calls.

use crate::model::id::EntityId;

/// An in-progress text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: EntityId,
    /// Text rendered when the edit began.
    pub original_text: String,
    /// Latest uncommitted input; starts equal to `original_text`.
    pub draft_text: String,
}

/// Current active target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveTarget {
    #[default]
    Idle,
    Selected(EntityId),
    Editing(EditSession),
}

#[derive(Debug, Clone, Default)]
pub struct EditSelectionState {
    active: ActiveTarget,
}

impl EditSelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &ActiveTarget {
        &self.active
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.active, ActiveTarget::Idle)
    }

    /// Id of the selected or edited entity.
    pub fn active_id(&self) -> Option<&str> {
        match &self.active {
            ActiveTarget::Idle => None,
            ActiveTarget::Selected(id) => Some(id.as_str()),
            ActiveTarget::Editing(session) => Some(session.id.as_str()),
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        match &self.active {
            ActiveTarget::Selected(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn editing(&self) -> Option<&EditSession> {
        match &self.active {
            ActiveTarget::Editing(session) => Some(session),
            _ => None,
        }
    }

    /// `Any -> Selected(id)`. Returns an interrupted edit session, if any.
    pub fn select(&mut self, id: impl Into<EntityId>) -> Option<EditSession> {
        self.replace(ActiveTarget::Selected(id.into()))
    }

    /// `Any -> Editing(id)`. Returns an interrupted edit session, if any.
    pub fn begin_edit(
        &mut self,
        id: impl Into<EntityId>,
        original_text: impl Into<String>,
    ) -> Option<EditSession> {
        let original_text = original_text.into();
        self.replace(ActiveTarget::Editing(EditSession {
            id: id.into(),
            draft_text: original_text.clone(),
            original_text,
        }))
    }

    /// Re-enters a previously finished session, e.g. after a failed commit.
    pub fn resume(&mut self, session: EditSession) -> Option<EditSession> {
        self.replace(ActiveTarget::Editing(session))
    }

    /// Records uncommitted input for the active edit. Returns `false` when idle.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        match &mut self.active {
            ActiveTarget::Editing(session) => {
                session.draft_text = text.into();
                true
            }
            _ => false,
        }
    }

    /// `Editing(id) -> Idle`, yielding the session. Other states are untouched.
    pub fn finish_edit(&mut self) -> Option<EditSession> {
        if !matches!(self.active, ActiveTarget::Editing(_)) {
            return None;
        }
        self.replace(ActiveTarget::Idle)
    }

    /// `Any -> Idle`. Returns an interrupted edit session, if any.
    pub fn clear(&mut self) -> Option<EditSession> {
        self.replace(ActiveTarget::Idle)
    }

    /// Drops the active target if it refers to `id`.
    pub fn forget(&mut self, id: &str) {
        if self.active_id() == Some(id) {
            self.active = ActiveTarget::Idle;
        }
    }

    fn replace(&mut self, next: ActiveTarget) -> Option<EditSession> {
        match std::mem::replace(&mut self.active, next) {
            ActiveTarget::Editing(session) => Some(session),
            _ => None,
        }
    }
}
