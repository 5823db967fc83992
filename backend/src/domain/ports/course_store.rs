//! Driven port for course persistence.

use async_trait::async_trait;

use crate::domain::course::{CourseDetail, CoursePatch, NewCourse};

/// Errors raised by course store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseStoreError {
    /// Store connection could not be established.
    #[error("course store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution; any enclosing transaction
    /// has been rolled back.
    #[error("course store query failed: {message}")]
    Query { message: String },
    /// The write collides with existing state (course still referenced by
    /// batches or student profiles).
    #[error("conflicting course state: {message}")]
    Conflict { message: String },
    /// The addressed course does not exist.
    #[error("course not found: {message}")]
    NotFound { message: String },
    /// A supplied cross-entity reference does not resolve as required.
    #[error("invalid reference: {message}")]
    InvalidReference { message: String },
}

impl CourseStoreError {
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

/// Port for course storage and lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Validate the trainer reference and insert the course, in one
    /// transaction. Returns the created course with its resolved trainer.
    async fn create(&self, course: NewCourse) -> Result<CourseDetail, CourseStoreError>;

    /// Apply a partial update; a supplied trainer reference is revalidated.
    /// Returns `None` when the course does not exist.
    async fn update(
        &self,
        id: i32,
        patch: CoursePatch,
    ) -> Result<Option<CourseDetail>, CourseStoreError>;

    /// Delete the course and cascade its syllabus, in one transaction.
    /// Returns whether a course existed. A course still referenced by
    /// batches or student profiles yields [`CourseStoreError::Conflict`].
    async fn delete(&self, id: i32) -> Result<bool, CourseStoreError>;

    /// Fetch a course with its trainer and enrolled-student summaries.
    async fn find_by_id(&self, id: i32) -> Result<Option<CourseDetail>, CourseStoreError>;

    /// List all courses with their trainer and enrolled-student summaries.
    async fn list(&self) -> Result<Vec<CourseDetail>, CourseStoreError>;

    /// Ids of students whose profile references the course.
    /// Yields [`CourseStoreError::NotFound`] when the course does not exist.
    async fn enrolled_students(&self, course_id: i32) -> Result<Vec<i32>, CourseStoreError>;
}
