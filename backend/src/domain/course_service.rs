//! Course catalogue domain service.

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::course::{CourseDetail, CoursePatch, NewCourse};
use crate::domain::ports::{CourseStore, CourseStoreError};

/// Catalogue service for courses.
#[derive(Clone)]
pub struct CourseService<S> {
    store: Arc<S>,
}

impl<S> CourseService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> CourseService<S>
where
    S: CourseStore,
{
    fn map_store_error(error: CourseStoreError) -> DomainError {
        match error {
            CourseStoreError::Connection { message } => {
                DomainError::unavailable(format!("course store unavailable: {message}"))
            }
            CourseStoreError::Query { message } => {
                DomainError::internal(format!("course store error: {message}"))
            }
            CourseStoreError::Conflict { message } => DomainError::conflict(message),
            CourseStoreError::NotFound { message } => DomainError::not_found(message),
            CourseStoreError::InvalidReference { message } => {
                DomainError::invalid_request(message)
            }
        }
    }

    /// Create a course after the store validates its trainer reference.
    pub async fn create_course(&self, course: NewCourse) -> Result<CourseDetail, DomainError> {
        let created = self
            .store
            .create(course)
            .await
            .map_err(Self::map_store_error)?;
        info!(course_id = created.course.id, "course created");
        Ok(created)
    }

    /// Apply a partial update to a course.
    pub async fn update_course(
        &self,
        id: i32,
        patch: CoursePatch,
    ) -> Result<CourseDetail, DomainError> {
        patch
            .validate()
            .map_err(|err| DomainError::invalid_request(err.to_string()))?;
        self.store
            .update(id, patch)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no course with id {id}")))
    }

    /// Delete a course; reports whether a row was removed.
    pub async fn delete_course(&self, id: i32) -> Result<bool, DomainError> {
        let removed = self.store.delete(id).await.map_err(Self::map_store_error)?;
        if removed {
            info!(course_id = id, "course deleted");
        }
        Ok(removed)
    }

    /// Fetch a course snapshot.
    pub async fn get_course(&self, id: i32) -> Result<CourseDetail, DomainError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no course with id {id}")))
    }

    /// List all course snapshots.
    pub async fn list_courses(&self) -> Result<Vec<CourseDetail>, DomainError> {
        self.store.list().await.map_err(Self::map_store_error)
    }

    /// Ids of students whose profile references the course.
    pub async fn enrolled_students(&self, course_id: i32) -> Result<Vec<i32>, DomainError> {
        self.store
            .enrolled_students(course_id)
            .await
            .map_err(Self::map_store_error)
    }
}
