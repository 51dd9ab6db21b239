//! Hierarchical task model.
//!
//! # Responsibility
//! - Define the self-referencing task record and its priority enum.
//!
//! # Invariants
//! - `parent_uuid = None` means the task is top-level (depth 1).
//! - A task's `list_uuid` equals its parent's whenever a parent exists;
//!   the move operation maintains this across whole subtrees.
//! - Depth never exceeds [`MAX_DEPTH`].
//! - `completed` and `collapsed` are independent booleans.

use crate::model::list::ListId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Maximum nesting depth, counting top-level tasks as depth 1.
pub const MAX_DEPTH: u32 = 5;

/// Task priority. Defaults to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Stable wire/storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses the wire/storage spelling. Unknown values yield `None`; the
    /// update path treats that as "leave the priority unchanged".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Canonical task record.
///
/// Titles are stored trimmed and are unique within their sibling scope:
/// tasks under the same parent, or top-level tasks of the same list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// UI-only state (hide/show subtasks), persisted but never cascaded.
    pub collapsed: bool,
    pub priority: Priority,
    pub list_uuid: ListId,
    pub parent_uuid: Option<TaskId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Returns whether this task sits at depth 1.
    pub fn is_top_level(&self) -> bool {
        self.parent_uuid.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::Priority;

    #[test]
    fn priority_parse_roundtrip() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(Priority::parse(priority.as_str()), Some(priority));
        }
    }

    #[test]
    fn priority_parse_rejects_unknown_values() {
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::parse("MEDIUM"), None);
        assert_eq!(Priority::parse(""), None);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
