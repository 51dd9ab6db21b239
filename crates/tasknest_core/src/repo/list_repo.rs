//! Todo list repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist todo lists and resolve them under ownership scoping.
//! - Provide aggregate task statistics for list projections.
//!
//! # Invariants
//! - `get_list_owned` resolves only lists whose owner matches; a miss never
//!   says whether the list exists for someone else.
//! - Deleting a list hard-deletes its entire task forest via FK cascade.

use crate::db::DbError;
use crate::model::list::{ListId, TodoList};
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const LIST_SELECT_SQL: &str = "SELECT
    list_uuid,
    name,
    user_uuid,
    created_at
FROM todo_lists";

pub type ListRepoResult<T> = Result<T, ListRepoError>;

/// Errors from todo list persistence operations.
#[derive(Debug)]
pub enum ListRepoError {
    Db(DbError),
    NotFound(ListId),
    InvalidData(String),
}

impl Display for ListRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "list not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted list data: {message}"),
        }
    }
}

impl Error for ListRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for ListRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ListRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Task counts over a list's full task set, all depths included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStats {
    pub task_count: u32,
    pub completed_count: u32,
}

/// Repository interface for todo list operations.
pub trait ListRepository {
    /// Inserts one list for the given owner. The name arrives pre-trimmed.
    fn create_list(&self, user_uuid: UserId, name: &str) -> ListRepoResult<TodoList>;
    /// Loads one list by ID regardless of owner.
    fn get_list(&self, id: ListId) -> ListRepoResult<Option<TodoList>>;
    /// Loads one list only when it exists and belongs to `user_uuid`.
    fn get_list_owned(&self, id: ListId, user_uuid: UserId) -> ListRepoResult<Option<TodoList>>;
    /// Lists all lists owned by one user in creation order.
    fn list_for_user(&self, user_uuid: UserId) -> ListRepoResult<Vec<TodoList>>;
    /// Returns whether the owner already has a list with this exact name.
    fn name_exists(&self, user_uuid: UserId, name: &str) -> ListRepoResult<bool>;
    /// Hard-deletes one list; tasks at every depth go with it.
    fn delete_list(&self, id: ListId) -> ListRepoResult<()>;
    /// Computes total/completed task counts across all depths.
    fn list_stats(&self, id: ListId) -> ListRepoResult<ListStats>;
}

/// SQLite-backed todo list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, user_uuid: UserId, name: &str) -> ListRepoResult<TodoList> {
        let list_uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO todo_lists (list_uuid, name, user_uuid)
             VALUES (?1, ?2, ?3);",
            params![list_uuid.to_string(), name, user_uuid.to_string()],
        )?;
        load_required_list(self.conn, list_uuid)
    }

    fn get_list(&self, id: ListId) -> ListRepoResult<Option<TodoList>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LIST_SELECT_SQL} WHERE list_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_list_row(row)?));
        }
        Ok(None)
    }

    fn get_list_owned(&self, id: ListId, user_uuid: UserId) -> ListRepoResult<Option<TodoList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL} WHERE list_uuid = ?1 AND user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), user_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_list_row(row)?));
        }
        Ok(None)
    }

    fn list_for_user(&self, user_uuid: UserId) -> ListRepoResult<Vec<TodoList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE user_uuid = ?1
             ORDER BY created_at ASC, list_uuid ASC;"
        ))?;
        let mut rows = stmt.query([user_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_list_row(row)?);
        }
        Ok(items)
    }

    fn name_exists(&self, user_uuid: UserId, name: &str) -> ListRepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM todo_lists WHERE user_uuid = ?1 AND name = ?2
            );",
            params![user_uuid.to_string(), name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_list(&self, id: ListId) -> ListRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todo_lists WHERE list_uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(ListRepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_stats(&self, id: ListId) -> ListRepoResult<ListStats> {
        let (task_count, completed_count): (u32, u32) = self.conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(completed), 0)
             FROM tasks
             WHERE list_uuid = ?1;",
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(ListStats {
            task_count,
            completed_count,
        })
    }
}

fn load_required_list(conn: &Connection, list_uuid: ListId) -> ListRepoResult<TodoList> {
    let mut stmt = conn.prepare(&format!("{LIST_SELECT_SQL} WHERE list_uuid = ?1;"))?;
    let mut rows = stmt.query([list_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_list_row(row);
    }
    Err(ListRepoError::NotFound(list_uuid))
}

fn parse_list_row(row: &Row<'_>) -> ListRepoResult<TodoList> {
    let uuid_text: String = row.get("list_uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        ListRepoError::InvalidData(format!("invalid uuid `{uuid_text}` in todo_lists.list_uuid"))
    })?;

    let owner_text: String = row.get("user_uuid")?;
    let user_uuid = Uuid::parse_str(&owner_text).map_err(|_| {
        ListRepoError::InvalidData(format!("invalid uuid `{owner_text}` in todo_lists.user_uuid"))
    })?;

    Ok(TodoList {
        uuid,
        name: row.get("name")?,
        user_uuid,
        created_at: row.get("created_at")?,
    })
}
