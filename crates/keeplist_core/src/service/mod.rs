//! Core use-case services.
//!
//! # Responsibility
//! - Own collections in memory and mediate every mutation through them.
//! - Keep renderers decoupled from storage details: they read projections
//!   and call the operations exposed here.

pub mod collection;
pub mod edit_state;
pub mod note_book;
pub mod projection;
pub mod task_board;
