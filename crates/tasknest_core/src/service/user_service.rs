//! User account use-case service.
//!
//! # Responsibility
//! - Registration with username/email uniqueness checks.
//! - Credential verification through the opaque `CredentialScheme`.
//!
//! # Invariants
//! - Login never reveals whether a username exists; unknown user and wrong
//!   password both yield `None`.

use crate::model::user::{CredentialScheme, User, UserId};
use crate::repo::user_repo::{UserRepoError, UserRepository};
use crate::view::UserView;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from user service operations.
#[derive(Debug)]
pub enum UserServiceError {
    /// A required field is missing or blank after trim.
    MissingRequired(&'static str),
    /// Username already taken.
    DuplicateUsername(String),
    /// Email already registered.
    DuplicateEmail(String),
    /// Target user does not exist.
    UserNotFound(UserId),
    /// Repository-level failure.
    Repo(UserRepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired(field) => write!(f, "{field} is required"),
            Self::DuplicateUsername(username) => {
                write!(f, "username `{username}` already exists")
            }
            Self::DuplicateEmail(email) => write!(f, "email `{email}` already registered"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserRepoError> for UserServiceError {
    fn from(value: UserRepoError) -> Self {
        Self::Repo(value)
    }
}

impl UserServiceError {
    /// Outward HTTP-style status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingRequired(_) | Self::DuplicateUsername(_) | Self::DuplicateEmail(_) => 400,
            Self::UserNotFound(_) => 404,
            Self::Repo(_) => 500,
        }
    }
}

/// Use-case service for user accounts.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one user. The plaintext password is derived into its stored
    /// form by `scheme` and never persisted as-is.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        scheme: &dyn CredentialScheme,
    ) -> Result<User, UserServiceError> {
        if username.trim().is_empty() {
            return Err(UserServiceError::MissingRequired("username"));
        }
        if email.trim().is_empty() {
            return Err(UserServiceError::MissingRequired("email"));
        }
        if password.is_empty() {
            return Err(UserServiceError::MissingRequired("password"));
        }

        if self.repo.username_exists(username)? {
            return Err(UserServiceError::DuplicateUsername(username.to_string()));
        }
        if self.repo.email_exists(email)? {
            return Err(UserServiceError::DuplicateEmail(email.to_string()));
        }

        let user = self
            .repo
            .create_user(username, email, &scheme.derive(password))?;
        info!(
            "event=user_register module=user status=ok user={}",
            user.uuid
        );
        Ok(user)
    }

    /// Verifies credentials; `None` for unknown user or wrong password.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        scheme: &dyn CredentialScheme,
    ) -> Result<Option<User>, UserServiceError> {
        let Some(user) = self.repo.find_by_username(username)? else {
            return Ok(None);
        };
        if !scheme.verify(password, &user.password_hash) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Loads the authenticated user's own record as a response view.
    pub fn get_user_view(&self, id: UserId) -> Result<UserView, UserServiceError> {
        let user = self
            .repo
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))?;
        Ok(UserView::from(&user))
    }
}
