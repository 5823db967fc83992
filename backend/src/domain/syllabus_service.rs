//! Syllabus domain service.

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::ports::{SyllabusStore, SyllabusStoreError};
use crate::domain::syllabus::{Chapter, ChapterPatch, NewChapter};

/// Service for chapters and their sessions.
#[derive(Clone)]
pub struct SyllabusService<S> {
    store: Arc<S>,
}

impl<S> SyllabusService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> SyllabusService<S>
where
    S: SyllabusStore,
{
    fn map_store_error(error: SyllabusStoreError) -> DomainError {
        match error {
            SyllabusStoreError::Connection { message } => {
                DomainError::unavailable(format!("syllabus store unavailable: {message}"))
            }
            SyllabusStoreError::Query { message } => {
                DomainError::internal(format!("syllabus store error: {message}"))
            }
            SyllabusStoreError::InvalidReference { message } => {
                DomainError::invalid_request(message)
            }
        }
    }

    /// Create a chapter with its initial sessions, atomically.
    pub async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, DomainError> {
        let created = self
            .store
            .create_chapter(chapter)
            .await
            .map_err(Self::map_store_error)?;
        info!(
            chapter_id = created.id,
            sessions = created.sessions.len(),
            "chapter created"
        );
        Ok(created)
    }

    /// Apply a partial update to a chapter and the addressed sessions.
    pub async fn update_chapter(
        &self,
        id: i32,
        patch: ChapterPatch,
    ) -> Result<Chapter, DomainError> {
        patch
            .validate()
            .map_err(|err| DomainError::invalid_request(err.to_string()))?;
        self.store
            .update_chapter(id, patch)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no chapter with id {id}")))
    }

    /// Delete a chapter and its sessions; reports whether a row was removed.
    pub async fn delete_chapter(&self, id: i32) -> Result<bool, DomainError> {
        let removed = self
            .store
            .delete_chapter(id)
            .await
            .map_err(Self::map_store_error)?;
        if removed {
            info!(chapter_id = id, "chapter deleted");
        }
        Ok(removed)
    }

    /// Fetch a chapter with its sessions.
    pub async fn get_chapter(&self, id: i32) -> Result<Chapter, DomainError> {
        self.store
            .find_chapter(id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no chapter with id {id}")))
    }

    /// List all chapters with their sessions.
    pub async fn list_chapters(&self) -> Result<Vec<Chapter>, DomainError> {
        self.store
            .list_chapters()
            .await
            .map_err(Self::map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockSyllabusStore;
    use crate::domain::syllabus::SessionEdit;

    #[tokio::test]
    async fn create_chapter_surfaces_missing_course_as_invalid_request() {
        let mut store = MockSyllabusStore::new();
        store
            .expect_create_chapter()
            .times(1)
            .return_once(|_| Err(SyllabusStoreError::invalid_reference("no course with id 3")));

        let service = SyllabusService::new(Arc::new(store));
        let command = NewChapter::new("Ownership", 3, Vec::new()).expect("valid command");
        let error = service.create_chapter(command).await.expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_chapter_rejects_blank_session_edit_before_store_access() {
        let mut store = MockSyllabusStore::new();
        store.expect_update_chapter().times(0);

        let service = SyllabusService::new(Arc::new(store));
        let patch = ChapterPatch {
            sessions: Some(vec![SessionEdit {
                id: 1,
                session_name: Some("  ".to_owned()),
                session_link: None,
            }]),
            ..ChapterPatch::default()
        };
        let error = service.update_chapter(1, patch).await.expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn get_chapter_maps_missing_chapter_to_not_found() {
        let mut store = MockSyllabusStore::new();
        store.expect_find_chapter().times(1).return_once(|_| Ok(None));

        let service = SyllabusService::new(Arc::new(store));
        let error = service.get_chapter(5).await.expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
