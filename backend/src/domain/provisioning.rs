//! User provisioning domain service.
//!
//! Orchestrates polymorphic user creation, update, and deletion over the
//! [`UserStore`] port. Field-level validation happens before delegation;
//! cross-entity checks and atomicity are the store's contract.

use std::sync::Arc;

use tracing::info;

use crate::domain::DomainError;
use crate::domain::batch::BatchSummary;
use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::user::{Category, NewUser, User, UserDetail, UserPatch};

/// Provisioning service for users and their category profiles.
#[derive(Clone)]
pub struct UserProvisioningService<S> {
    store: Arc<S>,
}

impl<S> UserProvisioningService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> UserProvisioningService<S>
where
    S: UserStore,
{
    fn map_store_error(error: UserStoreError) -> DomainError {
        match error {
            UserStoreError::Connection { message } => {
                DomainError::unavailable(format!("user store unavailable: {message}"))
            }
            UserStoreError::Query { message } => {
                DomainError::internal(format!("user store error: {message}"))
            }
            UserStoreError::Conflict { message } => DomainError::conflict(message),
            UserStoreError::NotFound { message } => DomainError::not_found(message),
            UserStoreError::InvalidReference { message } => DomainError::invalid_request(message),
        }
    }

    /// Provision a user together with its category profile.
    pub async fn create_user(&self, user: NewUser) -> Result<User, DomainError> {
        let category = user.profile().category();
        let created = self
            .store
            .create(user)
            .await
            .map_err(Self::map_store_error)?;
        info!(user_id = created.id(), category = %category, "user provisioned");
        Ok(created)
    }

    /// Update base fields and the profile matching the user's category.
    pub async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, DomainError> {
        patch
            .validate()
            .map_err(|err| DomainError::invalid_request(err.to_string()))?;
        self.store
            .update(id, patch)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no user with id {id}")))
    }

    /// Remove a user and its profile atomically.
    pub async fn delete_user(&self, id: i32) -> Result<(), DomainError> {
        let removed = self.store.delete(id).await.map_err(Self::map_store_error)?;
        if !removed {
            return Err(DomainError::not_found(format!("no user with id {id}")));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Fetch a user enriched with the associations relevant to its category.
    pub async fn get_user(&self, id: i32) -> Result<UserDetail, DomainError> {
        let user = self
            .store
            .find_by_id(id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| DomainError::not_found(format!("no user with id {id}")))?;

        let batches = if user.category() == Category::Student {
            self.store
                .batches_for_student(id)
                .await
                .map_err(Self::map_store_error)?
        } else {
            Vec::new()
        };

        Ok(UserDetail { user, batches })
    }

    /// List users, optionally restricted to one category.
    pub async fn list_users(&self, category: Option<Category>) -> Result<Vec<User>, DomainError> {
        self.store
            .list(category)
            .await
            .map_err(Self::map_store_error)
    }

    /// Case-insensitive substring search over name and email.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::invalid_request("search query must not be empty"));
        }
        self.store
            .search(query)
            .await
            .map_err(Self::map_store_error)
    }

    /// Replace the full set of batches a student is enrolled in.
    pub async fn assign_batches(
        &self,
        student_id: i32,
        batch_ids: Vec<i32>,
    ) -> Result<(), DomainError> {
        self.require_student(student_id).await?;
        self.store
            .replace_student_batches(student_id, batch_ids)
            .await
            .map_err(Self::map_store_error)?;
        info!(user_id = student_id, "student batch set replaced");
        Ok(())
    }

    /// List the batches a student is enrolled in.
    pub async fn student_batches(&self, student_id: i32) -> Result<Vec<BatchSummary>, DomainError> {
        self.require_student(student_id).await?;
        self.store
            .batches_for_student(student_id)
            .await
            .map_err(Self::map_store_error)
    }

    async fn require_student(&self, id: i32) -> Result<(), DomainError> {
        let user = self
            .store
            .find_by_id(id)
            .await
            .map_err(Self::map_store_error)?;
        match user {
            Some(user) if user.category() == Category::Student => Ok(()),
            _ => Err(DomainError::not_found(format!("no student with id {id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserStore;
    use crate::domain::user::{
        AdminRole, EmailAddress, LearningMode, ProfileData, UserValidationError,
    };
    use chrono::NaiveDate;
    use rstest::rstest;

    fn student(id: i32) -> User {
        User::new(
            id,
            "Sam".to_owned(),
            EmailAddress::new("sam@example.com").expect("valid email"),
            9_876_543_210,
            ProfileData::Student {
                course_id: 1,
                learning_mode: LearningMode::Online,
                fee_detail: "45000 INR".to_owned(),
                payment_mode: "UPI".to_owned(),
            },
        )
    }

    fn admin(id: i32) -> User {
        User::new(
            id,
            "Ada".to_owned(),
            EmailAddress::new("ada@example.com").expect("valid email"),
            9_876_543_210,
            ProfileData::Admin {
                role: AdminRole::SuperAdmin,
            },
        )
    }

    fn new_student_user() -> NewUser {
        NewUser::new(
            "Sam",
            EmailAddress::new("sam@example.com").expect("valid email"),
            "hashed",
            9_876_543_210,
            ProfileData::Student {
                course_id: 1,
                learning_mode: LearningMode::Online,
                fee_detail: "45000 INR".to_owned(),
                payment_mode: "UPI".to_owned(),
            },
        )
        .expect("valid command")
    }

    #[tokio::test]
    async fn create_user_surfaces_duplicate_email_as_conflict() {
        let mut store = MockUserStore::new();
        store
            .expect_create()
            .times(1)
            .return_once(|_| Err(UserStoreError::conflict("email already registered")));

        let service = UserProvisioningService::new(Arc::new(store));
        let error = service
            .create_user(new_student_user())
            .await
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn create_user_returns_provisioned_user() {
        let mut store = MockUserStore::new();
        store
            .expect_create()
            .times(1)
            .return_once(|_| Ok(student(12)));

        let service = UserProvisioningService::new(Arc::new(store));
        let user = service.create_user(new_student_user()).await.expect("created");
        assert_eq!(user.id(), 12);
        assert_eq!(user.category(), Category::Student);
    }

    #[tokio::test]
    async fn update_user_rejects_invalid_patch_before_store_access() {
        let mut store = MockUserStore::new();
        store.expect_update().times(0);

        let service = UserProvisioningService::new(Arc::new(store));
        let patch = UserPatch {
            name: Some("  ".to_owned()),
            ..UserPatch::default()
        };
        let error = service.update_user(4, patch).await.expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.message(),
            UserValidationError::EmptyName.to_string()
        );
    }

    #[tokio::test]
    async fn update_user_maps_missing_user_to_not_found() {
        let mut store = MockUserStore::new();
        store.expect_update().times(1).return_once(|_, _| Ok(None));

        let service = UserProvisioningService::new(Arc::new(store));
        let error = service
            .update_user(99, UserPatch::default())
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_user_maps_missing_user_to_not_found() {
        let mut store = MockUserStore::new();
        store.expect_delete().times(1).return_once(|_| Ok(false));

        let service = UserProvisioningService::new(Arc::new(store));
        let error = service.delete_user(7).await.expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn get_user_enriches_students_with_batches() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(Some(student(3))));
        store.expect_batches_for_student().times(1).return_once(|_| {
            Ok(vec![BatchSummary {
                id: 21,
                course_id: 1,
                batch_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
                batch_end_date: NaiveDate::from_ymd_opt(2026, 6, 5).expect("valid date"),
                batch_timings: None,
            }])
        });

        let service = UserProvisioningService::new(Arc::new(store));
        let detail = service.get_user(3).await.expect("found");
        assert_eq!(detail.batches.len(), 1);
    }

    #[tokio::test]
    async fn get_user_skips_batch_lookup_for_admins() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(Some(admin(2))));
        store.expect_batches_for_student().times(0);

        let service = UserProvisioningService::new(Arc::new(store));
        let detail = service.get_user(2).await.expect("found");
        assert!(detail.batches.is_empty());
    }

    #[tokio::test]
    async fn assign_batches_rejects_non_students() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(Some(admin(2))));
        store.expect_replace_student_batches().times(0);

        let service = UserProvisioningService::new(Arc::new(store));
        let error = service
            .assign_batches(2, vec![1, 2])
            .await
            .expect_err("not a student");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn search_rejects_blank_queries() {
        let mut store = MockUserStore::new();
        store.expect_search().times(0);

        let service = UserProvisioningService::new(Arc::new(store));
        let error = service.search_users("  ").await.expect_err("blank query");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn store_errors_map_onto_the_domain_taxonomy() {
        let cases = [
            (
                UserStoreError::connection("refused"),
                ErrorCode::Unavailable,
            ),
            (UserStoreError::query("boom"), ErrorCode::InternalError),
            (UserStoreError::conflict("dup"), ErrorCode::Conflict),
            (UserStoreError::not_found("gone"), ErrorCode::NotFound),
            (
                UserStoreError::invalid_reference("bad ref"),
                ErrorCode::InvalidRequest,
            ),
        ];
        for (store_error, code) in cases {
            assert_eq!(
                UserProvisioningService::<MockUserStore>::map_store_error(store_error).code(),
                code
            );
        }
    }
}
