//! Hierarchical task use-case service.
//!
//! # Responsibility
//! - Validate hierarchy invariants (depth bound, sibling uniqueness,
//!   top-level move restriction) above the repository layer.
//! - Orchestrate completion toggles, collapse state and subtree moves.
//!
//! # Invariants
//! - Depth of any task never exceeds `MAX_DEPTH` (5); creation under a
//!   depth-5 parent is rejected.
//! - Sibling titles are unique after trim; the scope never spans lists.
//! - Only top-level tasks move between lists; the whole subtree follows.
//! - Ownership misses surface as not-found, never as a distinct
//!   authorization error.

use crate::model::list::ListId;
use crate::model::task::{Priority, Task, TaskId, MAX_DEPTH};
use crate::model::user::UserId;
use crate::repo::list_repo::{ListRepoError, ListRepository};
use crate::repo::task_repo::{
    NewTaskRecord, SiblingScope, TaskRepoError, TaskRepository,
};
use crate::view::{self, TaskView};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task service operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is blank after trim on creation.
    InvalidTitle,
    /// A sibling in the same scope already uses this title.
    DuplicateTitle(String),
    /// Creation would nest beyond `MAX_DEPTH` levels.
    DepthExceeded,
    /// List does not exist or is not owned by the caller.
    ListNotFound(ListId),
    /// Task does not exist or is not owned by the caller.
    TaskNotFound(TaskId),
    /// Parent task does not exist or is not owned by the caller.
    ParentNotFound(TaskId),
    /// Cross-list move attempted on a non-root task.
    NotTopLevel(TaskId),
    /// Task store failure.
    Repo(TaskRepoError),
    /// List store failure.
    ListRepo(ListRepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "task title is required"),
            Self::DuplicateTitle(title) => {
                write!(f, "a task named `{title}` already exists here")
            }
            Self::DepthExceeded => {
                write!(f, "maximum nesting depth of {MAX_DEPTH} levels reached")
            }
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent task not found: {id}"),
            Self::NotTopLevel(id) => {
                write!(f, "only top-level tasks can be moved between lists: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::ListRepo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ListRepo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskRepoError> for TaskServiceError {
    fn from(value: TaskRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ListRepoError> for TaskServiceError {
    fn from(value: ListRepoError) -> Self {
        Self::ListRepo(value)
    }
}

impl TaskServiceError {
    /// Outward HTTP-style status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTitle
            | Self::DuplicateTitle(_)
            | Self::DepthExceeded
            | Self::NotTopLevel(_) => 400,
            Self::ListNotFound(_) | Self::TaskNotFound(_) | Self::ParentNotFound(_) => 404,
            Self::Repo(_) | Self::ListRepo(_) => 500,
        }
    }
}

/// Creation payload for one task.
///
/// Unknown priority spellings fall back to the default rather than failing.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub list_id: ListId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub parent_id: Option<TaskId>,
}

/// Update payload; every field is optional and applied independently.
/// An unknown priority value is silently ignored, not rejected.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// Use-case service for hierarchical tasks.
pub struct TaskService<T: TaskRepository, L: ListRepository> {
    tasks: T,
    lists: L,
}

impl<T: TaskRepository, L: ListRepository> TaskService<T, L> {
    /// Creates a service from repository implementations.
    pub fn new(tasks: T, lists: L) -> Self {
        Self { tasks, lists }
    }

    /// Creates one task or subtask for the caller.
    ///
    /// # Contract
    /// - The target list must be owned; a given parent must be owned too.
    /// - Rejects creation under a parent already at `MAX_DEPTH`.
    /// - Rejects trimmed-title duplicates within the sibling scope.
    pub fn create_task(&self, user: UserId, new: &NewTask) -> Result<TaskView, TaskServiceError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(TaskServiceError::InvalidTitle);
        }

        self.lists
            .get_list_owned(new.list_id, user)?
            .ok_or(TaskServiceError::ListNotFound(new.list_id))?;

        let scope = match new.parent_id {
            Some(parent_id) => {
                self.tasks
                    .get_task_owned(parent_id, user)?
                    .ok_or(TaskServiceError::ParentNotFound(parent_id))?;
                if self.tasks.depth(parent_id)? >= MAX_DEPTH {
                    return Err(TaskServiceError::DepthExceeded);
                }
                SiblingScope::Children(parent_id)
            }
            None => SiblingScope::TopLevel(new.list_id),
        };

        if self.tasks.title_in_scope_exists(scope, title, None)? {
            return Err(TaskServiceError::DuplicateTitle(title.to_string()));
        }

        let task = self.tasks.create_task(&NewTaskRecord {
            title: title.to_string(),
            description: new.description.clone().unwrap_or_default(),
            priority: parse_priority_lenient(new.priority.as_deref()),
            list_uuid: new.list_id,
            parent_uuid: new.parent_id,
        })?;
        info!(
            "event=task_create module=task status=ok task={} list={} user={}",
            task.uuid, new.list_id, user
        );
        self.render_with_subtasks(&task)
    }

    /// Loads one owned task, optionally with its nested subtree.
    pub fn get_task_view(
        &self,
        user: UserId,
        id: TaskId,
        include_subtasks: bool,
    ) -> Result<TaskView, TaskServiceError> {
        let task = self.resolve_owned(user, id)?;
        if include_subtasks {
            self.render_with_subtasks(&task)
        } else {
            let depth = self.tasks.depth(id)?;
            let subtask_count = self.tasks.count_children(id)?;
            Ok(view::task_view_shallow(&task, depth, subtask_count))
        }
    }

    /// Applies a partial update to title/description/priority.
    ///
    /// A new title is trimmed and checked against siblings excluding the
    /// task itself. Unknown priority values are dropped without error.
    pub fn update_task(
        &self,
        user: UserId,
        id: TaskId,
        update: &TaskUpdate,
    ) -> Result<TaskView, TaskServiceError> {
        let mut task = self.resolve_owned(user, id)?;

        if let Some(new_title) = update.title.as_deref() {
            let trimmed = new_title.trim();
            let scope = match task.parent_uuid {
                Some(parent_id) => SiblingScope::Children(parent_id),
                None => SiblingScope::TopLevel(task.list_uuid),
            };
            if self
                .tasks
                .title_in_scope_exists(scope, trimmed, Some(task.uuid))?
            {
                return Err(TaskServiceError::DuplicateTitle(trimmed.to_string()));
            }
            task.title = trimmed.to_string();
        }

        if let Some(description) = update.description.as_deref() {
            task.description = description.to_string();
        }

        if let Some(priority) = update.priority.as_deref() {
            if let Some(parsed) = Priority::parse(priority) {
                task.priority = parsed;
            }
        }

        self.tasks.update_task(&task)?;
        self.render_with_subtasks(&task)
    }

    /// Deletes one owned task together with its whole descendant subtree.
    pub fn delete_task(&self, user: UserId, id: TaskId) -> Result<(), TaskServiceError> {
        self.resolve_owned(user, id)?;
        self.tasks.delete_task(id)?;
        info!(
            "event=task_delete module=task status=ok task={} user={}",
            id, user
        );
        Ok(())
    }

    /// Flips completion with the full cascade semantics: checking completes
    /// the subtree and conditionally completes ancestors; unchecking leaves
    /// descendants alone and unconditionally un-completes ancestors.
    pub fn toggle_task(&self, user: UserId, id: TaskId) -> Result<TaskView, TaskServiceError> {
        self.resolve_owned(user, id)?;
        let task = self.tasks.toggle_completion(id)?;
        info!(
            "event=task_toggle module=task status=ok task={} completed={} user={}",
            id, task.completed, user
        );
        self.render_with_subtasks(&task)
    }

    /// Sets or flips the collapse flag; returns the new state.
    pub fn set_collapsed(
        &self,
        user: UserId,
        id: TaskId,
        desired: Option<bool>,
    ) -> Result<bool, TaskServiceError> {
        self.resolve_owned(user, id)?;
        Ok(self.tasks.set_collapsed(id, desired)?)
    }

    /// Moves an owned top-level task and its subtree to another owned list.
    ///
    /// Title uniqueness is not re-checked against the destination list's
    /// top-level tasks; a move can introduce a duplicate title there.
    pub fn move_task(
        &self,
        user: UserId,
        id: TaskId,
        new_list_id: ListId,
    ) -> Result<TaskView, TaskServiceError> {
        let task = self.resolve_owned(user, id)?;
        self.lists
            .get_list_owned(new_list_id, user)?
            .ok_or(TaskServiceError::ListNotFound(new_list_id))?;
        if !task.is_top_level() {
            return Err(TaskServiceError::NotTopLevel(id));
        }

        self.tasks.move_subtree(id, new_list_id)?;
        info!(
            "event=task_move module=task status=ok task={} list={} user={}",
            id, new_list_id, user
        );
        let moved = self
            .tasks
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        self.render_with_subtasks(&moved)
    }

    fn resolve_owned(&self, user: UserId, id: TaskId) -> Result<Task, TaskServiceError> {
        self.tasks
            .get_task_owned(id, user)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    fn render_with_subtasks(&self, task: &Task) -> Result<TaskView, TaskServiceError> {
        let depth = self.tasks.depth(task.uuid)?;
        let subtree = self.tasks.list_subtree(task.uuid)?;
        view::build_task_tree(task.uuid, depth, &subtree)
            .ok_or(TaskServiceError::TaskNotFound(task.uuid))
    }
}

fn parse_priority_lenient(value: Option<&str>) -> Priority {
    value.and_then(Priority::parse).unwrap_or_default()
}
