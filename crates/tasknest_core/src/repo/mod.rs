//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Ownership-scoped lookups (`*_owned`) never distinguish "absent" from
//!   "owned by someone else"; both are `None`.
//! - Multi-row mutations (completion cascade, subtree move) run inside one
//!   immediate transaction.

pub mod list_repo;
pub mod task_repo;
pub mod user_repo;
