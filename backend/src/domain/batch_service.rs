//! Batch and enrollment domain service.

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::batch::{BatchDetail, BatchPatch, NewBatch};
use crate::domain::ports::{BatchStore, BatchStoreError};

/// Service for batches and their enrolled-student membership.
#[derive(Clone)]
pub struct BatchService<S> {
    store: Arc<S>,
}

impl<S> BatchService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> BatchService<S>
where
    S: BatchStore,
{
    fn map_store_error(error: BatchStoreError) -> DomainError {
        match error {
            BatchStoreError::Connection { message } => {
                DomainError::unavailable(format!("batch store unavailable: {message}"))
            }
            BatchStoreError::Query { message } => {
                DomainError::internal(format!("batch store error: {message}"))
            }
            BatchStoreError::NotFound { message } => DomainError::not_found(message),
            BatchStoreError::InvalidReference { message } => DomainError::invalid_request(message),
        }
    }

    /// Create a batch with its optional initial enrollment, atomically.
    pub async fn create_batch(&self, batch: NewBatch) -> Result<BatchDetail, DomainError> {
        let created = self
            .store
            .create(batch)
            .await
            .map_err(Self::map_store_error)?;
        info!(
            batch_id = created.batch.id,
            students = created.enrolled_students.len(),
            "batch created"
        );
        Ok(created)
    }

    /// Apply a partial update; a supplied student set replaces membership.
    pub async fn update_batch(
        &self,
        id: i32,
        patch: BatchPatch,
    ) -> Result<BatchDetail, DomainError> {
        self.store
            .update(id, patch)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no batch with id {id}")))
    }

    /// Delete a batch and its bridge rows; reports whether a row was removed.
    pub async fn delete_batch(&self, id: i32) -> Result<bool, DomainError> {
        let removed = self.store.delete(id).await.map_err(Self::map_store_error)?;
        if removed {
            info!(batch_id = id, "batch deleted");
        }
        Ok(removed)
    }

    /// Fetch a batch snapshot.
    pub async fn get_batch(&self, id: i32) -> Result<BatchDetail, DomainError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no batch with id {id}")))
    }

    /// List all batch snapshots.
    pub async fn list_batches(&self) -> Result<Vec<BatchDetail>, DomainError> {
        self.store.list().await.map_err(Self::map_store_error)
    }

    /// Replace the batch's full membership with the supplied student set.
    pub async fn set_enrollment(
        &self,
        batch_id: i32,
        student_ids: Vec<i32>,
    ) -> Result<(), DomainError> {
        let count = student_ids.len();
        self.store
            .set_enrollment(batch_id, student_ids)
            .await
            .map_err(Self::map_store_error)?;
        info!(batch_id, students = count, "batch enrollment replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockBatchStore;
    use chrono::NaiveDate;

    fn new_batch() -> NewBatch {
        NewBatch {
            trainer_id: 5,
            course_id: 1,
            batch_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
            batch_end_date: NaiveDate::from_ymd_opt(2026, 6, 5).expect("valid date"),
            student_ids: vec![8, 9],
            ..NewBatch::default()
        }
    }

    #[tokio::test]
    async fn create_batch_surfaces_invalid_student_as_invalid_request() {
        let mut store = MockBatchStore::new();
        store.expect_create().times(1).return_once(|_| {
            Err(BatchStoreError::invalid_reference(
                "ids do not resolve to students: [9]",
            ))
        });

        let service = BatchService::new(Arc::new(store));
        let error = service.create_batch(new_batch()).await.expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_batch_maps_missing_batch_to_not_found() {
        let mut store = MockBatchStore::new();
        store.expect_update().times(1).return_once(|_, _| Ok(None));

        let service = BatchService::new(Arc::new(store));
        let error = service
            .update_batch(77, BatchPatch::default())
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn set_enrollment_passes_the_complete_set_through() {
        let mut store = MockBatchStore::new();
        store
            .expect_set_enrollment()
            .withf(|batch_id, ids| *batch_id == 4 && ids == &[2, 3])
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = BatchService::new(Arc::new(store));
        service.set_enrollment(4, vec![2, 3]).await.expect("replaced");
    }

    #[tokio::test]
    async fn delete_batch_reports_removal_outcome() {
        let mut store = MockBatchStore::new();
        store.expect_delete().times(1).return_once(|_| Ok(true));

        let service = BatchService::new(Arc::new(store));
        assert!(service.delete_batch(4).await.expect("outcome"));
    }
}
