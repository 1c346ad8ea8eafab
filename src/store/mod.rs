use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::account::{NewUserRecord, User};

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Errors produced by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique email constraint rejected the insert.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent storage for user records.
///
/// The store owns the atomicity of the uniqueness check plus insert;
/// a violation surfaces as [`StoreError::DuplicateEmail`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new user, failing if the email is already taken.
    async fn insert_unique(&self, record: NewUserRecord) -> Result<User, StoreError>;

    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Stamp `last_login` for an existing user.
    async fn touch_last_login(&self, id: Uuid, when: OffsetDateTime) -> Result<(), StoreError>;
}
