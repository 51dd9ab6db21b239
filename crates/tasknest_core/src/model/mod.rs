//! Domain model for users, todo lists and hierarchical tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one record shape per entity, shared by storage and projection.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Tasks reference their parent by optional ID; `None` means top-level.

pub mod list;
pub mod task;
pub mod user;
