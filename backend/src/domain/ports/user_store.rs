//! Driven port for user and profile persistence.
//!
//! Adapters must keep a user and its category profile consistent: every
//! mutation that touches both runs as one atomic unit, and no user may ever
//! be observable without exactly one matching profile row.

use async_trait::async_trait;

use crate::domain::batch::BatchSummary;
use crate::domain::user::{Category, NewUser, User, UserPatch};

/// Errors raised by user store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution; any enclosing transaction
    /// has been rolled back.
    #[error("user store query failed: {message}")]
    Query { message: String },
    /// The write collides with existing state (duplicate email, a user still
    /// referenced by dependants).
    #[error("conflicting user state: {message}")]
    Conflict { message: String },
    /// The addressed user does not exist.
    #[error("user not found: {message}")]
    NotFound { message: String },
    /// A supplied cross-entity reference does not resolve as required.
    #[error("invalid reference: {message}")]
    InvalidReference { message: String },
}

impl UserStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a conflict error with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a not-found error with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid-reference error with the given message.
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference {
            message: message.into(),
        }
    }
}

/// Port for user provisioning and lookup.
///
/// Mutations are transactional per call: either the user row and its profile
/// (and, for students, bridge rows) all change, or none of them do.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user row plus exactly one profile row matching the command's
    /// category, atomically. A student's course reference is validated inside
    /// the same transaction. A duplicate email yields
    /// [`UserStoreError::Conflict`] and leaves no rows behind.
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError>;

    /// Update base fields and the profile fields matching the user's current
    /// category, in one transaction. Returns `None` when the user does not
    /// exist. A profile patch of a different category is rejected with
    /// [`UserStoreError::InvalidReference`].
    async fn update(&self, id: i32, patch: UserPatch) -> Result<Option<User>, UserStoreError>;

    /// Delete the user's profile row (and a student's bridge rows) followed
    /// by the user row, in one transaction. Returns whether a user existed.
    /// Deleting a trainer still referenced by courses or batches yields
    /// [`UserStoreError::Conflict`].
    async fn delete(&self, id: i32) -> Result<bool, UserStoreError>;

    /// Fetch a user with its profile.
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError>;

    /// List users, optionally restricted to one category.
    async fn list(&self, category: Option<Category>) -> Result<Vec<User>, UserStoreError>;

    /// Case-insensitive substring search over name and email.
    async fn search(&self, query: &str) -> Result<Vec<User>, UserStoreError>;

    /// Replace the full set of batches the student is enrolled in.
    /// Every batch id must resolve; the whole call is one transaction.
    async fn replace_student_batches(
        &self,
        student_id: i32,
        batch_ids: Vec<i32>,
    ) -> Result<(), UserStoreError>;

    /// List the batches a student is enrolled in.
    async fn batches_for_student(&self, student_id: i32)
    -> Result<Vec<BatchSummary>, UserStoreError>;
}
