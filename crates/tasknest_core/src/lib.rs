//! Core domain logic for TaskNest, a multi-user hierarchical task manager.
//! This crate is the single source of truth for business invariants:
//! ownership isolation, the depth-5 nesting bound, sibling title uniqueness
//! and the asymmetric completion cascade.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::list::{ListId, TodoList};
pub use model::task::{Priority, Task, TaskId, MAX_DEPTH};
pub use model::user::{CredentialScheme, User, UserId};
pub use repo::list_repo::{ListRepoError, ListRepository, ListStats, SqliteListRepository};
pub use repo::task_repo::{
    NewTaskRecord, SiblingScope, SqliteTaskRepository, TaskRepoError, TaskRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepoError, UserRepository};
pub use service::list_service::{ListService, ListServiceError};
pub use service::task_service::{NewTask, TaskService, TaskServiceError, TaskUpdate};
pub use service::user_service::{UserService, UserServiceError};
pub use view::{ErrorBody, ListView, TaskView, UserView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
