//! Entity identifiers and id-generation capability.
//!
//! # Invariants
//! - Generated ids are opaque strings; callers must not parse them.
//! - A generator must not repeat an id within one collection lifetime.

use std::cell::Cell;
use uuid::Uuid;

/// Opaque, globally unique record identifier.
pub type EntityId = String;

/// Injected capability producing fresh entity ids.
pub trait IdGenerator {
    fn generate_id(&self) -> EntityId;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn generate_id(&self) -> EntityId {
        (**self).generate_id()
    }
}

/// Random UUID v4 ids in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate_id(&self) -> EntityId {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids, counting up from 1.
///
/// Used by tests and scripted sessions where stable ids matter more than
/// global uniqueness.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    prefix: String,
    next: Cell<u64>,
}

impl SequenceIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(first),
        }
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn generate_id(&self) -> EntityId {
        let current = self.next.get();
        self.next.set(current.wrapping_add(1));
        format!("{}-{current}", self.prefix)
    }
}
