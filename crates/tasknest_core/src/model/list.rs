//! Todo list model.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a todo list.
pub type ListId = Uuid;

/// Canonical todo list record.
///
/// A list belongs to exactly one user; its name is unique per owner after
/// trimming surrounding whitespace. Deleting a list deletes every task in its
/// subtree forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub uuid: ListId,
    pub name: String,
    pub user_uuid: UserId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
