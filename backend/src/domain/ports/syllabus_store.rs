//! Driven port for syllabus (chapter/session) persistence.

use async_trait::async_trait;

use crate::domain::syllabus::{Chapter, ChapterPatch, NewChapter};

/// Errors raised by syllabus store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyllabusStoreError {
    /// Store connection could not be established.
    #[error("syllabus store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution; any enclosing transaction
    /// has been rolled back.
    #[error("syllabus store query failed: {message}")]
    Query { message: String },
    /// A supplied cross-entity reference does not resolve as required.
    #[error("invalid reference: {message}")]
    InvalidReference { message: String },
}

impl SyllabusStoreError {
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

    /// Create an invalid-reference error with the given message.
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference {
            message: message.into(),
        }
    }
}

/// Port for chapter and session storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyllabusStore: Send + Sync {
    /// Validate the course reference and insert the chapter with its initial
    /// sessions, in one transaction.
    async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, SyllabusStoreError>;

    /// Apply a partial update to the chapter and the addressed sessions, in
    /// one transaction. Returns `None` when the chapter does not exist.
    async fn update_chapter(
        &self,
        id: i32,
        patch: ChapterPatch,
    ) -> Result<Option<Chapter>, SyllabusStoreError>;

    /// Delete the chapter and its sessions, in one transaction. Returns
    /// whether a chapter existed.
    async fn delete_chapter(&self, id: i32) -> Result<bool, SyllabusStoreError>;

    /// Fetch a chapter with its sessions.
    async fn find_chapter(&self, id: i32) -> Result<Option<Chapter>, SyllabusStoreError>;

    /// List all chapters with their sessions.
    async fn list_chapters(&self) -> Result<Vec<Chapter>, SyllabusStoreError>;
}
