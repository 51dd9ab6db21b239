//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce validation (ownership, depth, sibling uniqueness) above the
//!   persistence layer.
//!
//! # Invariants
//! - Every operation takes the authenticated user as an explicit argument;
//!   there is no ambient session state.
//! - Absent and not-owned entities are indistinguishable in results.

pub mod list_service;
pub mod task_service;
pub mod user_service;
