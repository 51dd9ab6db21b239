//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the self-referencing task hierarchy.
//! - Implement the completion-cascade state machine and subtree move as
//!   single transactions.
//!
//! # Invariants
//! - `get_task_owned` resolves ownership transitively through the task's
//!   list; tasks carry no direct owner column.
//! - Checking a task completes its whole subtree; unchecking touches only
//!   the task itself plus already-complete ancestors.
//! - Deleting a task hard-deletes its descendant subtree via FK cascade.

use crate::db::DbError;
use crate::model::list::ListId;
use crate::model::task::{Priority, Task, TaskId};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    title,
    description,
    completed,
    collapsed,
    priority,
    list_uuid,
    parent_uuid,
    created_at
FROM tasks";

pub type TaskRepoResult<T> = Result<T, TaskRepoError>;

/// Errors from task persistence and hierarchy operations.
#[derive(Debug)]
pub enum TaskRepoError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for TaskRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for TaskRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for TaskRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TaskRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Insert payload for one task. Title arrives pre-trimmed and non-empty.
#[derive(Debug, Clone)]
pub struct NewTaskRecord {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub list_uuid: ListId,
    pub parent_uuid: Option<TaskId>,
}

/// Title-uniqueness comparison set: children of one parent, or top-level
/// tasks of one list. Never spans lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingScope {
    Children(TaskId),
    TopLevel(ListId),
}

/// Repository interface for hierarchical task operations.
pub trait TaskRepository {
    /// Inserts one task.
    fn create_task(&self, record: &NewTaskRecord) -> TaskRepoResult<Task>;
    /// Loads one task by ID regardless of owner.
    fn get_task(&self, id: TaskId) -> TaskRepoResult<Option<Task>>;
    /// Loads one task only when its list belongs to `user_uuid`.
    fn get_task_owned(&self, id: TaskId, user_uuid: UserId) -> TaskRepoResult<Option<Task>>;
    /// Whole-row update for title/description/priority edits.
    fn update_task(&self, task: &Task) -> TaskRepoResult<()>;
    /// Hard-deletes one task and, via FK cascade, its descendants.
    fn delete_task(&self, id: TaskId) -> TaskRepoResult<()>;
    /// Walks the parent chain; 1 = top-level.
    fn depth(&self, id: TaskId) -> TaskRepoResult<u32>;
    /// Returns whether a sibling in `scope` already uses `title`,
    /// optionally excluding one task (the rename case).
    fn title_in_scope_exists(
        &self,
        scope: SiblingScope,
        title: &str,
        exclude: Option<TaskId>,
    ) -> TaskRepoResult<bool>;
    /// Counts direct children.
    fn count_children(&self, id: TaskId) -> TaskRepoResult<u32>;
    /// Lists every task of a list at all depths in creation order.
    fn list_for_list(&self, list_uuid: ListId) -> TaskRepoResult<Vec<Task>>;
    /// Lists a task and all its descendants in creation order.
    fn list_subtree(&self, root: TaskId) -> TaskRepoResult<Vec<Task>>;
    /// Flips completion and runs the full cascade in one transaction.
    /// Returns the reloaded task.
    fn toggle_completion(&self, id: TaskId) -> TaskRepoResult<Task>;
    /// Sets collapse state; `None` flips the current value. Returns the new
    /// state.
    fn set_collapsed(&self, id: TaskId, desired: Option<bool>) -> TaskRepoResult<bool>;
    /// Reassigns a task and every descendant to `destination` in one
    /// transaction, preserving parent links and completion/collapse state.
    fn move_subtree(&self, id: TaskId, destination: ListId) -> TaskRepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, record: &NewTaskRecord) -> TaskRepoResult<Task> {
        let task_uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (
                task_uuid,
                title,
                description,
                priority,
                list_uuid,
                parent_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task_uuid.to_string(),
                record.title.as_str(),
                record.description.as_str(),
                record.priority.as_str(),
                record.list_uuid.to_string(),
                record.parent_uuid.map(|value| value.to_string()),
            ],
        )?;
        load_required_task(self.conn, task_uuid)
    }

    fn get_task(&self, id: TaskId) -> TaskRepoResult<Option<Task>> {
        load_task(self.conn, id)
    }

    fn get_task_owned(&self, id: TaskId, user_uuid: UserId) -> TaskRepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.task_uuid AS task_uuid,
                t.title AS title,
                t.description AS description,
                t.completed AS completed,
                t.collapsed AS collapsed,
                t.priority AS priority,
                t.list_uuid AS list_uuid,
                t.parent_uuid AS parent_uuid,
                t.created_at AS created_at
             FROM tasks t
             INNER JOIN todo_lists l ON l.list_uuid = t.list_uuid
             WHERE t.task_uuid = ?1
               AND l.user_uuid = ?2;",
        )?;
        let mut rows = stmt.query(params![id.to_string(), user_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn update_task(&self, task: &Task) -> TaskRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                completed = ?3,
                collapsed = ?4,
                priority = ?5,
                list_uuid = ?6,
                parent_uuid = ?7
             WHERE task_uuid = ?8;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.completed),
                bool_to_int(task.collapsed),
                task.priority.as_str(),
                task.list_uuid.to_string(),
                task.parent_uuid.map(|value| value.to_string()),
                task.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(TaskRepoError::NotFound(task.uuid));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> TaskRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE task_uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(TaskRepoError::NotFound(id));
        }
        Ok(())
    }

    fn depth(&self, id: TaskId) -> TaskRepoResult<u32> {
        let mut depth = 1u32;
        let mut cursor = parent_of(self.conn, id)?.ok_or(TaskRepoError::NotFound(id))?;
        while let Some(parent_id) = cursor {
            depth += 1;
            cursor = parent_of(self.conn, parent_id)?.ok_or(TaskRepoError::NotFound(parent_id))?;
        }
        Ok(depth)
    }

    fn title_in_scope_exists(
        &self,
        scope: SiblingScope,
        title: &str,
        exclude: Option<TaskId>,
    ) -> TaskRepoResult<bool> {
        let exclude = exclude.map(|value| value.to_string());
        let exists: i64 = match scope {
            SiblingScope::Children(parent_uuid) => self.conn.query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM tasks
                    WHERE parent_uuid = ?1
                      AND title = ?2
                      AND (?3 IS NULL OR task_uuid <> ?3)
                );",
                params![parent_uuid.to_string(), title, exclude],
                |row| row.get(0),
            )?,
            SiblingScope::TopLevel(list_uuid) => self.conn.query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM tasks
                    WHERE list_uuid = ?1
                      AND parent_uuid IS NULL
                      AND title = ?2
                      AND (?3 IS NULL OR task_uuid <> ?3)
                );",
                params![list_uuid.to_string(), title, exclude],
                |row| row.get(0),
            )?,
        };
        Ok(exists == 1)
    }

    fn count_children(&self, id: TaskId) -> TaskRepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE parent_uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn list_for_list(&self, list_uuid: ListId) -> TaskRepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE list_uuid = ?1
             ORDER BY created_at ASC, task_uuid ASC;"
        ))?;
        let mut rows = stmt.query([list_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn list_subtree(&self, root: TaskId) -> TaskRepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE subtree(task_uuid) AS (
                SELECT task_uuid FROM tasks WHERE task_uuid = ?1
                UNION ALL
                SELECT child.task_uuid
                FROM tasks child
                INNER JOIN subtree parent ON child.parent_uuid = parent.task_uuid
            )
            SELECT
                t.task_uuid AS task_uuid,
                t.title AS title,
                t.description AS description,
                t.completed AS completed,
                t.collapsed AS collapsed,
                t.priority AS priority,
                t.list_uuid AS list_uuid,
                t.parent_uuid AS parent_uuid,
                t.created_at AS created_at
            FROM tasks t
            INNER JOIN subtree ON subtree.task_uuid = t.task_uuid
            ORDER BY t.created_at ASC, t.task_uuid ASC;",
        )?;
        let mut rows = stmt.query([root.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn toggle_completion(&self, id: TaskId) -> TaskRepoResult<Task> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let task = load_task(&tx, id)?.ok_or(TaskRepoError::NotFound(id))?;
        let new_status = !task.completed;

        if new_status {
            complete_subtree(&tx, id)?;
            cascade_up_on_check(&tx, task.parent_uuid)?;
        } else {
            // Unchecking never touches descendants.
            set_completed(&tx, id, false)?;
            cascade_up_on_uncheck(&tx, task.parent_uuid)?;
        }

        tx.commit()?;
        load_required_task(self.conn, id)
    }

    fn set_collapsed(&self, id: TaskId, desired: Option<bool>) -> TaskRepoResult<bool> {
        let task = load_task(self.conn, id)?.ok_or(TaskRepoError::NotFound(id))?;
        let new_state = desired.unwrap_or(!task.collapsed);
        self.conn.execute(
            "UPDATE tasks SET collapsed = ?2 WHERE task_uuid = ?1;",
            params![id.to_string(), bool_to_int(new_state)],
        )?;
        Ok(new_state)
    }

    fn move_subtree(&self, id: TaskId, destination: ListId) -> TaskRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_task(&tx, id)?.is_none() {
            return Err(TaskRepoError::NotFound(id));
        }

        tx.execute(
            "WITH RECURSIVE subtree(task_uuid) AS (
                SELECT task_uuid FROM tasks WHERE task_uuid = ?1
                UNION ALL
                SELECT child.task_uuid
                FROM tasks child
                INNER JOIN subtree parent ON child.parent_uuid = parent.task_uuid
            )
            UPDATE tasks
            SET list_uuid = ?2
            WHERE task_uuid IN (SELECT task_uuid FROM subtree);",
            params![id.to_string(), destination.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

/// Marks a task and every descendant complete (the check-path downward
/// cascade). Idempotent over already-complete rows.
fn complete_subtree(conn: &Connection, root: TaskId) -> TaskRepoResult<()> {
    conn.execute(
        "WITH RECURSIVE subtree(task_uuid) AS (
            SELECT task_uuid FROM tasks WHERE task_uuid = ?1
            UNION ALL
            SELECT child.task_uuid
            FROM tasks child
            INNER JOIN subtree parent ON child.parent_uuid = parent.task_uuid
        )
        UPDATE tasks
        SET completed = 1
        WHERE task_uuid IN (SELECT task_uuid FROM subtree);",
        [root.to_string()],
    )?;
    Ok(())
}

/// Check-path upward walk: a parent auto-completes only when every direct
/// child is complete; an already-complete parent stops the walk.
fn cascade_up_on_check(conn: &Connection, start: Option<TaskId>) -> TaskRepoResult<()> {
    let mut cursor = start;
    while let Some(parent_id) = cursor {
        let parent = load_task(conn, parent_id)?.ok_or(TaskRepoError::NotFound(parent_id))?;
        if parent.completed {
            break;
        }
        if has_incomplete_child(conn, parent_id)? {
            break;
        }
        set_completed(conn, parent_id, true)?;
        cursor = parent.parent_uuid;
    }
    Ok(())
}

/// Uncheck-path upward walk: every already-complete ancestor flips to
/// incomplete unconditionally; siblings are never inspected.
fn cascade_up_on_uncheck(conn: &Connection, start: Option<TaskId>) -> TaskRepoResult<()> {
    let mut cursor = start;
    while let Some(parent_id) = cursor {
        let parent = load_task(conn, parent_id)?.ok_or(TaskRepoError::NotFound(parent_id))?;
        if !parent.completed {
            break;
        }
        set_completed(conn, parent_id, false)?;
        cursor = parent.parent_uuid;
    }
    Ok(())
}

fn has_incomplete_child(conn: &Connection, parent_id: TaskId) -> TaskRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM tasks WHERE parent_uuid = ?1 AND completed = 0
        );",
        [parent_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn set_completed(conn: &Connection, id: TaskId, completed: bool) -> TaskRepoResult<()> {
    conn.execute(
        "UPDATE tasks SET completed = ?2 WHERE task_uuid = ?1;",
        params![id.to_string(), bool_to_int(completed)],
    )?;
    Ok(())
}

fn parent_of(conn: &Connection, id: TaskId) -> TaskRepoResult<Option<Option<TaskId>>> {
    let parent_text: Option<Option<String>> = conn
        .query_row(
            "SELECT parent_uuid FROM tasks WHERE task_uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match parent_text {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(value)) => Ok(Some(Some(parse_uuid(&value, "tasks.parent_uuid")?))),
    }
}

fn load_task(conn: &Connection, id: TaskId) -> TaskRepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE task_uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }
    Ok(None)
}

fn load_required_task(conn: &Connection, id: TaskId) -> TaskRepoResult<Task> {
    load_task(conn, id)?.ok_or(TaskRepoError::NotFound(id))
}

pub(crate) fn parse_task_row(row: &Row<'_>) -> TaskRepoResult<Task> {
    let uuid_text: String = row.get("task_uuid")?;
    let uuid = parse_uuid(&uuid_text, "tasks.task_uuid")?;

    let list_text: String = row.get("list_uuid")?;
    let list_uuid = parse_uuid(&list_text, "tasks.list_uuid")?;

    let parent_uuid = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "tasks.parent_uuid"))
        .transpose()?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        TaskRepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    Ok(Task {
        uuid,
        title: row.get("title")?,
        description: row.get("description")?,
        completed: parse_bool_column(row, "completed")?,
        collapsed: parse_bool_column(row, "collapsed")?,
        priority,
        list_uuid,
        parent_uuid,
        created_at: row.get("created_at")?,
    })
}

fn parse_bool_column(row: &Row<'_>, column: &'static str) -> TaskRepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TaskRepoError::InvalidData(format!(
            "invalid boolean value `{other}` in tasks.{column}"
        ))),
    }
}

fn parse_uuid(value: &str, column: &'static str) -> TaskRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| TaskRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
