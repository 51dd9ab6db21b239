//! Response-ready projections of domain records.
//!
//! # Responsibility
//! - Convert entities into nested, serialization-ready view records.
//! - Derive presentation statistics (depth, subtask/list counts).
//!
//! # Invariants
//! - Views never expose the stored credential.
//! - Nested subtasks are attached only on request; sibling order is
//!   deterministic (`created_at ASC, task_uuid ASC`, as fetched).
//! - Depth is recomputed during assembly; top-level tasks render depth 1.

use crate::model::list::{ListId, TodoList};
use crate::model::task::{Priority, Task, TaskId};
use crate::model::user::{User, UserId};
use crate::repo::list_repo::ListStats;
use serde::Serialize;
use std::collections::HashMap;

/// User record for API responses. The credential stays out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: i64,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.uuid,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Task record for API responses, optionally carrying its nested subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub collapsed: bool,
    pub priority: Priority,
    pub list_id: ListId,
    pub parent_id: Option<TaskId>,
    pub depth: u32,
    pub created_at: i64,
    pub subtask_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<TaskView>>,
}

/// List record for API responses with derived statistics over all depths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub id: ListId,
    pub name: String,
    pub user_id: UserId,
    pub created_at: i64,
    pub task_count: u32,
    pub completed_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskView>>,
}

/// Outward error record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Renders one task without attaching children.
///
/// `subtask_count` still reports direct children, so callers must supply it
/// from the store.
pub fn task_view_shallow(task: &Task, depth: u32, subtask_count: u32) -> TaskView {
    TaskView {
        id: task.uuid,
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        collapsed: task.collapsed,
        priority: task.priority,
        list_id: task.list_uuid,
        parent_id: task.parent_uuid,
        depth,
        created_at: task.created_at,
        subtask_count,
        subtasks: None,
    }
}

/// Renders one task with its full nested subtree.
///
/// `subtree` is the flat fetch of the task and all descendants; `root_depth`
/// is the task's depth in its list. Returns `None` when the root is absent
/// from the slice.
pub fn build_task_tree(root: TaskId, root_depth: u32, subtree: &[Task]) -> Option<TaskView> {
    let index = children_index(subtree);
    let root_task = subtree.iter().find(|task| task.uuid == root)?;
    Some(assemble(root_task, root_depth, &index))
}

/// Renders a list's task forest: top-level tasks only, each with its nested
/// subtree. `tasks` is the flat fetch of every task in the list.
pub fn build_forest(tasks: &[Task]) -> Vec<TaskView> {
    let index = children_index(tasks);
    tasks
        .iter()
        .filter(|task| task.is_top_level())
        .map(|task| assemble(task, 1, &index))
        .collect()
}

/// Renders a list header with statistics and an optional task forest.
pub fn list_view(list: &TodoList, stats: ListStats, tasks: Option<&[Task]>) -> ListView {
    ListView {
        id: list.uuid,
        name: list.name.clone(),
        user_id: list.user_uuid,
        created_at: list.created_at,
        task_count: stats.task_count,
        completed_count: stats.completed_count,
        tasks: tasks.map(build_forest),
    }
}

fn children_index(tasks: &[Task]) -> HashMap<TaskId, Vec<&Task>> {
    let mut index: HashMap<TaskId, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(parent_uuid) = task.parent_uuid {
            index.entry(parent_uuid).or_default().push(task);
        }
    }
    index
}

// Recursion is bounded by the depth-5 hierarchy limit.
fn assemble(task: &Task, depth: u32, index: &HashMap<TaskId, Vec<&Task>>) -> TaskView {
    let children: Vec<TaskView> = index
        .get(&task.uuid)
        .map(|children| {
            children
                .iter()
                .map(|child| assemble(child, depth + 1, index))
                .collect()
        })
        .unwrap_or_default();

    TaskView {
        id: task.uuid,
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        collapsed: task.collapsed,
        priority: task.priority,
        list_id: task.list_uuid,
        parent_id: task.parent_uuid,
        depth,
        created_at: task.created_at,
        subtask_count: children.len() as u32,
        subtasks: Some(children),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_forest, build_task_tree, task_view_shallow};
    use crate::model::task::{Priority, Task};
    use uuid::Uuid;

    fn task(list: Uuid, parent: Option<Uuid>, title: &str, created_at: i64) -> Task {
        Task {
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            completed: false,
            collapsed: false,
            priority: Priority::Medium,
            list_uuid: list,
            parent_uuid: parent,
            created_at,
        }
    }

    #[test]
    fn forest_nests_children_and_tracks_depth() {
        let list = Uuid::new_v4();
        let top = task(list, None, "Top", 1);
        let child = task(list, Some(top.uuid), "Child", 2);
        let grandchild = task(list, Some(child.uuid), "Grandchild", 3);
        let tasks = vec![top.clone(), child.clone(), grandchild.clone()];

        let forest = build_forest(&tasks);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, top.uuid);
        assert_eq!(forest[0].depth, 1);
        assert_eq!(forest[0].subtask_count, 1);

        let nested_child = &forest[0].subtasks.as_ref().unwrap()[0];
        assert_eq!(nested_child.id, child.uuid);
        assert_eq!(nested_child.depth, 2);

        let nested_grandchild = &nested_child.subtasks.as_ref().unwrap()[0];
        assert_eq!(nested_grandchild.id, grandchild.uuid);
        assert_eq!(nested_grandchild.depth, 3);
        assert_eq!(nested_grandchild.subtask_count, 0);
    }

    #[test]
    fn task_tree_starts_from_requested_depth() {
        let list = Uuid::new_v4();
        let parent = task(list, None, "Parent", 1);
        let child = task(list, Some(parent.uuid), "Child", 2);
        let subtree = vec![parent.clone(), child.clone()];

        let view = build_task_tree(parent.uuid, 1, &subtree).unwrap();
        assert_eq!(view.depth, 1);
        assert_eq!(view.subtasks.as_ref().unwrap()[0].depth, 2);

        let missing = build_task_tree(Uuid::new_v4(), 1, &subtree);
        assert!(missing.is_none());
    }

    #[test]
    fn shallow_view_serializes_without_subtasks_field() {
        let list = Uuid::new_v4();
        let top = task(list, None, "Solo", 1);
        let view = task_view_shallow(&top, 1, 0);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("subtasks").is_none());
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["depth"], 1);
    }
}
