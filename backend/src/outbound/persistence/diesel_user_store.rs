//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! This adapter keeps a user row and its category profile row consistent:
//! every mutation that touches both runs inside one transaction, so a failed
//! step (duplicate email, unknown course, mismatched category) leaves no
//! partial user/profile pair behind.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;

use crate::domain::batch::BatchSummary;
use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::user::{
    AdminRole, Category, EmailAddress, LearningMode, NewUser, ProfileData, ProfilePatch,
    TrainerRole, User, UserPatch,
};

use super::checks;
use super::enrollment;
use super::models::{
    AdminProfileRow, BatchRow, NewAdminProfileRow, NewStudentProfileRow, NewTrainerProfileRow,
    NewUserRow, StudentProfileRow, StudentProfileUpdateRow, TrainerProfileRow, UserRow,
    UserUpdateRow,
};
use super::pool::DbPool;
use super::schema::{
    admin_profiles, batch_students, batches, courses, student_profiles, trainer_profiles, users,
};

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_admin_role(raw: &str) -> Result<AdminRole, UserStoreError> {
    AdminRole::parse(raw).ok_or_else(|| UserStoreError::query(format!("unknown admin role {raw}")))
}

fn parse_trainer_role(raw: &str) -> Result<TrainerRole, UserStoreError> {
    TrainerRole::parse(raw)
        .ok_or_else(|| UserStoreError::query(format!("unknown trainer role {raw}")))
}

fn parse_learning_mode(raw: &str) -> Result<LearningMode, UserStoreError> {
    LearningMode::parse(raw)
        .ok_or_else(|| UserStoreError::query(format!("unknown learning mode {raw}")))
}

fn parse_category(raw: &str) -> Result<Category, UserStoreError> {
    Category::parse(raw)
        .ok_or_else(|| UserStoreError::query(format!("unknown user category {raw}")))
}

fn student_profile_from_row(row: StudentProfileRow) -> Result<ProfileData, UserStoreError> {
    Ok(ProfileData::Student {
        course_id: row.course_id,
        learning_mode: parse_learning_mode(&row.learning_mode)?,
        fee_detail: row.fee_detail,
        payment_mode: row.payment_mode,
    })
}

/// Convert a user row plus its resolved profile into a domain user.
fn row_to_user(row: UserRow, profile: ProfileData) -> Result<User, UserStoreError> {
    let email = EmailAddress::new(row.email)
        .map_err(|err| UserStoreError::query(format!("stored email invalid: {err}")))?;
    Ok(User::new(row.id, row.name, email, row.mobile, profile))
}

/// Load the profile row matching the user's category.
async fn load_profile(
    conn: &mut AsyncPgConnection,
    category: Category,
    user_id: i32,
) -> Result<ProfileData, UserStoreError> {
    match category {
        Category::Admin => {
            let row: AdminProfileRow = admin_profiles::table
                .filter(admin_profiles::user_id.eq(user_id))
                .select(AdminProfileRow::as_select())
                .first(conn)
                .await?;
            Ok(ProfileData::Admin {
                role: parse_admin_role(&row.role)?,
            })
        }
        Category::Trainer => {
            let row: TrainerProfileRow = trainer_profiles::table
                .filter(trainer_profiles::user_id.eq(user_id))
                .select(TrainerProfileRow::as_select())
                .first(conn)
                .await?;
            Ok(ProfileData::Trainer {
                role: parse_trainer_role(&row.role)?,
            })
        }
        Category::Student => {
            let row: StudentProfileRow = student_profiles::table
                .filter(student_profiles::user_id.eq(user_id))
                .select(StudentProfileRow::as_select())
                .first(conn)
                .await?;
            student_profile_from_row(row)
        }
    }
}

/// Bulk-load profiles for a page of user rows and stitch them together.
async fn attach_profiles(
    conn: &mut AsyncPgConnection,
    rows: Vec<UserRow>,
) -> Result<Vec<User>, UserStoreError> {
    let mut admin_ids = Vec::new();
    let mut trainer_ids = Vec::new();
    let mut student_ids = Vec::new();
    for row in &rows {
        match parse_category(&row.category)? {
            Category::Admin => admin_ids.push(row.id),
            Category::Trainer => trainer_ids.push(row.id),
            Category::Student => student_ids.push(row.id),
        }
    }

    let mut profiles: HashMap<i32, ProfileData> = HashMap::new();
    if !admin_ids.is_empty() {
        let admin_rows: Vec<AdminProfileRow> = admin_profiles::table
            .filter(admin_profiles::user_id.eq_any(admin_ids))
            .select(AdminProfileRow::as_select())
            .load(conn)
            .await?;
        for row in admin_rows {
            profiles.insert(
                row.user_id,
                ProfileData::Admin {
                    role: parse_admin_role(&row.role)?,
                },
            );
        }
    }
    if !trainer_ids.is_empty() {
        let trainer_rows: Vec<TrainerProfileRow> = trainer_profiles::table
            .filter(trainer_profiles::user_id.eq_any(trainer_ids))
            .select(TrainerProfileRow::as_select())
            .load(conn)
            .await?;
        for row in trainer_rows {
            profiles.insert(
                row.user_id,
                ProfileData::Trainer {
                    role: parse_trainer_role(&row.role)?,
                },
            );
        }
    }
    if !student_ids.is_empty() {
        let student_rows: Vec<StudentProfileRow> = student_profiles::table
            .filter(student_profiles::user_id.eq_any(student_ids))
            .select(StudentProfileRow::as_select())
            .load(conn)
            .await?;
        for row in student_rows {
            let user_id = row.user_id;
            profiles.insert(user_id, student_profile_from_row(row)?);
        }
    }

    rows.into_iter()
        .map(|row| {
            let profile = profiles.remove(&row.id).ok_or_else(|| {
                UserStoreError::query(format!("profile row missing for user {}", row.id))
            })?;
            row_to_user(row, profile)
        })
        .collect()
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<User, UserStoreError, _>(|conn| {
            async move {
                let category = user.profile().category();
                let new_row = NewUserRow {
                    name: user.name(),
                    email: user.email().as_ref(),
                    password: user.credential(),
                    mobile: user.mobile(),
                    category: category.as_str(),
                };
                let row: UserRow = diesel::insert_into(users::table)
                    .values(&new_row)
                    .returning(UserRow::as_returning())
                    .get_result(conn)
                    .await?;

                match user.profile() {
                    ProfileData::Admin { role } => {
                        diesel::insert_into(admin_profiles::table)
                            .values(&NewAdminProfileRow {
                                user_id: row.id,
                                role: role.as_str(),
                            })
                            .execute(conn)
                            .await?;
                    }
                    ProfileData::Trainer { role } => {
                        diesel::insert_into(trainer_profiles::table)
                            .values(&NewTrainerProfileRow {
                                user_id: row.id,
                                role: role.as_str(),
                            })
                            .execute(conn)
                            .await?;
                    }
                    ProfileData::Student {
                        course_id,
                        learning_mode,
                        fee_detail,
                        payment_mode,
                    } => {
                        checks::ensure_course(conn, *course_id).await?;
                        diesel::insert_into(student_profiles::table)
                            .values(&NewStudentProfileRow {
                                user_id: row.id,
                                course_id: *course_id,
                                learning_mode: learning_mode.as_str(),
                                fee_detail,
                                payment_mode,
                            })
                            .execute(conn)
                            .await?;
                    }
                }

                row_to_user(row, user.profile().clone())
            }
            .scope_boxed()
        })
        .await
    }

    async fn update(&self, id: i32, patch: UserPatch) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<User>, UserStoreError, _>(|conn| {
            async move {
                let Some(category) = checks::user_category(conn, id).await? else {
                    return Ok(None);
                };

                if patch.has_base_changes() {
                    let changes = UserUpdateRow {
                        name: patch.name.as_deref(),
                        email: patch.email.as_ref().map(AsRef::as_ref),
                        password: patch.credential.as_deref(),
                        mobile: patch.mobile,
                    };
                    diesel::update(users::table.find(id))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                }

                if let Some(profile_patch) = &patch.profile {
                    if profile_patch.category() != category {
                        return Err(UserStoreError::invalid_reference(format!(
                            "category is immutable: user {id} has category {category}"
                        )));
                    }
                    match profile_patch {
                        ProfilePatch::Admin { role } => {
                            diesel::update(
                                admin_profiles::table.filter(admin_profiles::user_id.eq(id)),
                            )
                            .set(admin_profiles::role.eq(role.as_str()))
                            .execute(conn)
                            .await?;
                        }
                        ProfilePatch::Trainer { role } => {
                            diesel::update(
                                trainer_profiles::table.filter(trainer_profiles::user_id.eq(id)),
                            )
                            .set(trainer_profiles::role.eq(role.as_str()))
                            .execute(conn)
                            .await?;
                        }
                        ProfilePatch::Student {
                            course_id,
                            learning_mode,
                            fee_detail,
                            payment_mode,
                        } => {
                            if let Some(course_id) = course_id {
                                checks::ensure_course(conn, *course_id).await?;
                            }
                            let changes = StudentProfileUpdateRow {
                                course_id: *course_id,
                                learning_mode: learning_mode.map(LearningMode::as_str),
                                fee_detail: fee_detail.as_deref(),
                                payment_mode: payment_mode.as_deref(),
                            };
                            if changes.has_changes() {
                                diesel::update(
                                    student_profiles::table
                                        .filter(student_profiles::user_id.eq(id)),
                                )
                                .set(&changes)
                                .execute(conn)
                                .await?;
                            }
                        }
                    }
                }

                let row: UserRow = users::table
                    .find(id)
                    .select(UserRow::as_select())
                    .first(conn)
                    .await?;
                let profile = load_profile(conn, category, id).await?;
                row_to_user(row, profile).map(Some)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: i32) -> Result<bool, UserStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<bool, UserStoreError, _>(|conn| {
            async move {
                let Some(category) = checks::user_category(conn, id).await? else {
                    return Ok(false);
                };

                match category {
                    Category::Admin => {
                        diesel::delete(
                            admin_profiles::table.filter(admin_profiles::user_id.eq(id)),
                        )
                        .execute(conn)
                        .await?;
                    }
                    Category::Trainer => {
                        let course_refs: i64 = courses::table
                            .filter(courses::trainer_id.eq(id))
                            .count()
                            .get_result(conn)
                            .await?;
                        let batch_refs: i64 = batches::table
                            .filter(batches::trainer_id.eq(id))
                            .count()
                            .get_result(conn)
                            .await?;
                        if course_refs > 0 || batch_refs > 0 {
                            return Err(UserStoreError::conflict(format!(
                                "trainer {id} is still referenced by courses or batches"
                            )));
                        }
                        diesel::delete(
                            trainer_profiles::table.filter(trainer_profiles::user_id.eq(id)),
                        )
                        .execute(conn)
                        .await?;
                    }
                    Category::Student => {
                        diesel::delete(
                            batch_students::table.filter(batch_students::student_id.eq(id)),
                        )
                        .execute(conn)
                        .await?;
                        diesel::delete(
                            student_profiles::table.filter(student_profiles::user_id.eq(id)),
                        )
                        .execute(conn)
                        .await?;
                    }
                }

                diesel::delete(users::table.find(id)).execute(conn).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<User>, UserStoreError, _>(|conn| {
            async move {
                let row: Option<UserRow> = users::table
                    .find(id)
                    .select(UserRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let Some(row) = row else {
                    return Ok(None);
                };
                let category = parse_category(&row.category)?;
                let profile = load_profile(conn, category, id).await?;
                row_to_user(row, profile).map(Some)
            }
            .scope_boxed()
        })
        .await
    }

    async fn list(&self, category: Option<Category>) -> Result<Vec<User>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Vec<User>, UserStoreError, _>(|conn| {
            async move {
                let mut query = users::table
                    .select(UserRow::as_select())
                    .order(users::id.asc())
                    .into_boxed();
                if let Some(category) = category {
                    query = query.filter(users::category.eq(category.as_str()));
                }
                let rows: Vec<UserRow> = query.load(conn).await?;
                attach_profiles(conn, rows).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<User>, UserStoreError> {
        let pattern = format!("%{query}%");
        let mut conn = self.pool.get().await?;
        conn.transaction::<Vec<User>, UserStoreError, _>(|conn| {
            async move {
                let rows: Vec<UserRow> = users::table
                    .select(UserRow::as_select())
                    .filter(
                        users::name
                            .ilike(pattern.clone())
                            .or(users::email.ilike(pattern)),
                    )
                    .order(users::id.asc())
                    .load(conn)
                    .await?;
                attach_profiles(conn, rows).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn replace_student_batches(
        &self,
        student_id: i32,
        batch_ids: Vec<i32>,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<(), UserStoreError, _>(|conn| {
            async move {
                match checks::user_category(conn, student_id).await? {
                    Some(Category::Student) => {}
                    _ => {
                        return Err(UserStoreError::not_found(format!(
                            "no student with id {student_id}"
                        )));
                    }
                }
                enrollment::replace_student_batches(conn, student_id, &batch_ids).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn batches_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<BatchSummary>, UserStoreError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<BatchRow> = batch_students::table
            .inner_join(batches::table)
            .filter(batch_students::student_id.eq(student_id))
            .select(BatchRow::as_select())
            .order(batches::id.asc())
            .load(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| BatchSummary {
                id: row.id,
                course_id: row.course_id,
                batch_start_date: row.batch_start_date,
                batch_end_date: row.batch_end_date,
                batch_timings: row.batch_timings,
            })
            .collect())
    }
}
