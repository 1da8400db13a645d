//! # Credential Store
//!
//! The `UserRepository` capability and its implementations:
//! - `postgres`: the persisted store backed by the users table
//! - `ephemeral`: the in-memory demo store used while the database is down
//! - `probe`: the short-timeout availability check that chooses between them

use async_trait::async_trait;
use thiserror::Error;

use crate::database::{NewUser, User, UserChanges};

pub mod ephemeral;
pub mod postgres;
pub mod probe;

#[cfg(test)]
pub mod memory;

pub use ephemeral::EphemeralRepository;
pub use postgres::PostgresUserRepository;
pub use probe::{Availability, probe};

/// Failures reported by a credential store.
///
/// Connectivity problems are kept apart from everything else so callers can
/// pick the demo path without inspecting error text.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("schema validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("credential store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Lookup, create and update operations over user records.
///
/// Implementations enforce email uniqueness themselves; a losing concurrent
/// `create` must fail with `StoreError::DuplicateEmail`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized email, optionally including the password hash
    async fn find_by_email(&self, email: &str, include_hash: bool)
    -> Result<Option<User>, StoreError>;

    /// Find a user by identifier, optionally including the password hash
    async fn find_by_id(&self, id: &str, include_hash: bool) -> Result<Option<User>, StoreError>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Apply `changes` and return the updated record, or `None` if `id` is unknown
    async fn update_by_id(&self, id: &str, changes: UserChanges)
    -> Result<Option<User>, StoreError>;

    /// Cheapest possible read, used by the availability probe
    async fn ping(&self) -> Result<(), StoreError>;
}
