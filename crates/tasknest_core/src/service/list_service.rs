//! Todo list use-case service.
//!
//! # Responsibility
//! - List creation with per-owner name uniqueness.
//! - Ownership-guarded reads and cascade deletes.
//!
//! # Invariants
//! - List names are compared after trimming surrounding whitespace.
//! - A list another user owns resolves exactly like a missing list.

use crate::model::list::ListId;
use crate::model::user::UserId;
use crate::repo::list_repo::{ListRepoError, ListRepository};
use crate::repo::task_repo::{TaskRepoError, TaskRepository};
use crate::view::{self, ListView};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from todo list service operations.
#[derive(Debug)]
pub enum ListServiceError {
    /// Name is blank after trim.
    InvalidName,
    /// Owner already has a list with this name.
    DuplicateName(String),
    /// Target list does not exist or is not owned by the caller.
    NotFound(ListId),
    /// Repository-level failure.
    Repo(ListRepoError),
    /// Task store failure while rendering list contents.
    TaskRepo(TaskRepoError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "list name is required"),
            Self::DuplicateName(name) => {
                write!(f, "a list named `{name}` already exists")
            }
            Self::NotFound(id) => write!(f, "list not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::TaskRepo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::TaskRepo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ListRepoError> for ListServiceError {
    fn from(value: ListRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TaskRepoError> for ListServiceError {
    fn from(value: TaskRepoError) -> Self {
        Self::TaskRepo(value)
    }
}

impl ListServiceError {
    /// Outward HTTP-style status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidName | Self::DuplicateName(_) => 400,
            Self::NotFound(_) => 404,
            Self::Repo(_) | Self::TaskRepo(_) => 500,
        }
    }
}

/// Use-case service for todo lists.
pub struct ListService<L: ListRepository, T: TaskRepository> {
    lists: L,
    tasks: T,
}

impl<L: ListRepository, T: TaskRepository> ListService<L, T> {
    /// Creates a service from repository implementations.
    pub fn new(lists: L, tasks: T) -> Self {
        Self { lists, tasks }
    }

    /// Creates one list for the caller. The name is trimmed and must be
    /// unique among the caller's lists.
    pub fn create_list(&self, user: UserId, name: &str) -> Result<ListView, ListServiceError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ListServiceError::InvalidName);
        }
        if self.lists.name_exists(user, trimmed)? {
            return Err(ListServiceError::DuplicateName(trimmed.to_string()));
        }

        let list = self.lists.create_list(user, trimmed)?;
        info!(
            "event=list_create module=list status=ok list={} user={}",
            list.uuid, user
        );
        let stats = self.lists.list_stats(list.uuid)?;
        Ok(view::list_view(&list, stats, None))
    }

    /// Lists the caller's lists with statistics, without task contents.
    pub fn lists_for_user(&self, user: UserId) -> Result<Vec<ListView>, ListServiceError> {
        let mut views = Vec::new();
        for list in self.lists.list_for_user(user)? {
            let stats = self.lists.list_stats(list.uuid)?;
            views.push(view::list_view(&list, stats, None));
        }
        Ok(views)
    }

    /// Loads one owned list with its full nested task forest.
    pub fn get_list_view(&self, user: UserId, id: ListId) -> Result<ListView, ListServiceError> {
        let list = self
            .lists
            .get_list_owned(id, user)?
            .ok_or(ListServiceError::NotFound(id))?;
        let stats = self.lists.list_stats(id)?;
        let tasks = self.tasks.list_for_list(id)?;
        Ok(view::list_view(&list, stats, Some(&tasks)))
    }

    /// Deletes one owned list; every task at every depth goes with it.
    pub fn delete_list(&self, user: UserId, id: ListId) -> Result<(), ListServiceError> {
        self.lists
            .get_list_owned(id, user)?
            .ok_or(ListServiceError::NotFound(id))?;
        self.lists.delete_list(id)?;
        info!(
            "event=list_delete module=list status=ok list={} user={}",
            id, user
        );
        Ok(())
    }
}
