//! Domain model for ordered note/task collections.
//!
//! # Responsibility
//! - Define the record shapes persisted under one storage key per collection.
//! - Define the injected id and clock capabilities used when records are born.
//!
//! # Invariants
//! - Every record is identified by an `EntityId` assigned once at creation.
//! - Record order is `(order_key, id)`, a total order even when keys collide.

pub mod clock;
pub mod id;
pub mod note;
pub mod record;
pub mod task;
