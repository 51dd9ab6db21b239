//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist user accounts and resolve them for login/ownership checks.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `username` and `email` are unique; the service layer checks before
//!   insert and the schema enforces as a backstop.

use crate::db::DbError;
use crate::model::user::{User, UserId};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    user_uuid,
    username,
    email,
    password_hash,
    created_at
FROM users";

pub type UserRepoResult<T> = Result<T, UserRepoError>;

/// Errors from user persistence operations.
#[derive(Debug)]
pub enum UserRepoError {
    Db(DbError),
    NotFound(UserId),
    InvalidData(String),
}

impl Display for UserRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for UserRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for UserRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for UserRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts one user; `password_hash` is stored opaquely.
    fn create_user(&self, username: &str, email: &str, password_hash: &str)
        -> UserRepoResult<User>;
    /// Loads one user by stable ID.
    fn get_user(&self, id: UserId) -> UserRepoResult<Option<User>>;
    /// Loads one user by exact username (login path).
    fn find_by_username(&self, username: &str) -> UserRepoResult<Option<User>>;
    /// Returns whether any user already claims this username.
    fn username_exists(&self, username: &str) -> UserRepoResult<bool>;
    /// Returns whether any user already claims this email.
    fn email_exists(&self, email: &str) -> UserRepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> UserRepoResult<User> {
        let user_uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO users (user_uuid, username, email, password_hash)
             VALUES (?1, ?2, ?3, ?4);",
            params![user_uuid.to_string(), username, email, password_hash],
        )?;
        load_required_user(self.conn, user_uuid)
    }

    fn get_user(&self, id: UserId) -> UserRepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE user_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_by_username(&self, username: &str) -> UserRepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn username_exists(&self, username: &str) -> UserRepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1);",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn email_exists(&self, email: &str) -> UserRepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1);",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn load_required_user(conn: &Connection, user_uuid: UserId) -> UserRepoResult<User> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE user_uuid = ?1;"))?;
    let mut rows = stmt.query([user_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_user_row(row);
    }
    Err(UserRepoError::NotFound(user_uuid))
}

fn parse_user_row(row: &Row<'_>) -> UserRepoResult<User> {
    let uuid_text: String = row.get("user_uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        UserRepoError::InvalidData(format!("invalid uuid `{uuid_text}` in users.user_uuid"))
    })?;

    Ok(User {
        uuid,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}
