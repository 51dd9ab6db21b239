//! User account model and credential capability.
//!
//! # Responsibility
//! - Define the user record owning todo lists.
//! - Keep password handling opaque behind the `CredentialScheme` trait.
//!
//! # Invariants
//! - `username` and `email` are unique across all users.
//! - Core never interprets `password_hash`; only a `CredentialScheme` does.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user account.
pub type UserId = Uuid;

/// Canonical user record.
///
/// The credential is stored as an opaque string; hashing and verification are
/// delegated to the caller-provided [`CredentialScheme`], so the core stays
/// independent of any particular hash algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub username: String,
    pub email: String,
    /// Opaque derived credential. Never serialized into API views.
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Capability for deriving and verifying opaque credentials.
///
/// Implementations live outside the core (the transport layer picks the
/// algorithm); tests provide trivial schemes.
pub trait CredentialScheme {
    /// Derives the stored form of a plaintext password.
    fn derive(&self, password: &str) -> String;
    /// Verifies a plaintext password against the stored form.
    fn verify(&self, password: &str, stored: &str) -> bool;
}
