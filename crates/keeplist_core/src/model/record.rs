//! Shared record contract for ordered collections.
//!
//! # Responsibility
//! - Describe what an ordered collection needs from one record type.
//! - Provide the canonical ordering comparator.
//!
//! # Invariants
//! - `id()` never changes after `from_draft`.
//! - `apply_patch` must leave `id` and `order_key` untouched.

use crate::model::id::EntityId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;

/// Numeric sort key. Not required to be contiguous.
pub type OrderKey = i64;

/// One persisted entry of an ordered collection.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Creation input, before an id and order key exist.
    type Draft;
    /// Partial update input. Unset fields stay untouched.
    type Patch;

    /// Stable kind label used in log events.
    const KIND: &'static str;

    fn from_draft(id: EntityId, order_key: OrderKey, draft: Self::Draft) -> Self;
    fn id(&self) -> &str;
    fn order_key(&self) -> OrderKey;
    fn set_order_key(&mut self, order_key: OrderKey);
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Whether this record is degenerate and must not be persisted.
    fn is_blank(&self) -> bool;
}

/// Canonical collection order: `order_key ASC, id ASC`.
pub fn compare_order<R: Record>(left: &R, right: &R) -> Ordering {
    left.order_key()
        .cmp(&right.order_key())
        .then_with(|| left.id().cmp(right.id()))
}
