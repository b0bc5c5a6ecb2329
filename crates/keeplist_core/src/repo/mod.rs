//! Persistence boundary: raw key-value storage and the collection adapter
//! that (de)serializes whole collections under one key.
//!
//! # Invariants
//! - A collection is written as one value; there are no partial writes.
//! - Malformed stored payloads are reported, never propagated as `Err`.

pub mod collection_store;
pub mod kv_store;
