//! Driven port for batch persistence and enrollment membership.

use async_trait::async_trait;

use crate::domain::batch::{BatchDetail, BatchPatch, NewBatch};

/// Errors raised by batch store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchStoreError {
    /// Store connection could not be established.
    #[error("batch store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution; any enclosing transaction
    /// has been rolled back.
    #[error("batch store query failed: {message}")]
    Query { message: String },
    /// The addressed batch does not exist.
    #[error("batch not found: {message}")]
    NotFound { message: String },
    /// A supplied cross-entity reference does not resolve as required
    /// (unknown trainer or course, or a non-student id in an enrollment set).
    #[error("invalid reference: {message}")]
    InvalidReference { message: String },
}

impl BatchStoreError {
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

/// Port for batch storage and enrollment membership.
///
/// Enrollment follows replace-set semantics: the supplied set becomes the
/// complete membership, inside the same transaction as the batch write that
/// triggered it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Validate the trainer and course references, insert the batch, and
    /// populate the initial student set, all in one transaction. Any invalid
    /// id rolls back the batch insert too.
    async fn create(&self, batch: NewBatch) -> Result<BatchDetail, BatchStoreError>;

    /// Apply a partial update; supplied trainer/course references are
    /// revalidated and a supplied student set fully replaces membership.
    /// Returns `None` when the batch does not exist.
    async fn update(
        &self,
        id: i32,
        patch: BatchPatch,
    ) -> Result<Option<BatchDetail>, BatchStoreError>;

    /// Delete the batch and its bridge rows, in one transaction. Returns
    /// whether a batch existed.
    async fn delete(&self, id: i32) -> Result<bool, BatchStoreError>;

    /// Fetch a batch with its trainer, course, and enrolled students.
    async fn find_by_id(&self, id: i32) -> Result<Option<BatchDetail>, BatchStoreError>;

    /// List all batches with their trainer, course, and enrolled students.
    async fn list(&self) -> Result<Vec<BatchDetail>, BatchStoreError>;

    /// Replace the batch's full membership with the supplied student set.
    /// Idempotent; an empty set clears enrollment.
    async fn set_enrollment(
        &self,
        batch_id: i32,
        student_ids: Vec<i32>,
    ) -> Result<(), BatchStoreError>;
}
