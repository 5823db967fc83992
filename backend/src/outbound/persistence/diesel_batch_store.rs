//! PostgreSQL-backed `BatchStore` implementation using Diesel ORM.
//!
//! Batch creation and update share one transaction with the enrollment
//! replace helper, so an invalid trainer, course, or student id rolls back
//! the batch write as well. No orphan batch without its intended enrollment
//! state can persist.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::batch::{Batch, BatchDetail, BatchPatch, NewBatch};
use crate::domain::course::CourseSummary;
use crate::domain::ports::{BatchStore, BatchStoreError};
use crate::domain::user::StudentSummary;

use super::checks::{self, CheckFailure};
use super::diesel_course_store::{email_from_stored, trainer_summary};
use super::enrollment;
use super::models::{BatchRow, BatchUpdateRow, NewBatchRow};
use super::pool::DbPool;
use super::schema::{batch_students, batches, courses, users};

/// Diesel-backed implementation of the [`BatchStore`] port.
#[derive(Clone)]
pub struct DieselBatchStore {
    pool: DbPool,
}

impl DieselBatchStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_batch(row: BatchRow) -> Batch {
    Batch {
        id: row.id,
        trainer_id: row.trainer_id,
        course_id: row.course_id,
        cover: row.cover_image,
        study_material: row.study_material,
        batch_start_date: row.batch_start_date,
        batch_end_date: row.batch_end_date,
        batch_timings: row.batch_timings,
    }
}

/// Load the course summary referenced by a batch row.
async fn course_summary(
    conn: &mut AsyncPgConnection,
    course_id: i32,
) -> Result<CourseSummary, CheckFailure> {
    let (id, course_name, total_price, discount_price): (
        i32,
        String,
        rust_decimal::Decimal,
        Option<rust_decimal::Decimal>,
    ) = courses::table
        .filter(courses::id.eq(course_id))
        .select((
            courses::id,
            courses::course_name,
            courses::total_price,
            courses::discount_price,
        ))
        .first(conn)
        .await
        .map_err(CheckFailure::Db)?;

    Ok(CourseSummary {
        id,
        course_name,
        total_price,
        discount_price,
    })
}

/// Students enrolled in the batch, via the bridge relation.
async fn enrolled_summaries(
    conn: &mut AsyncPgConnection,
    batch_id: i32,
) -> Result<Vec<StudentSummary>, BatchStoreError> {
    let rows: Vec<(i32, String, String, i64)> = batch_students::table
        .inner_join(users::table)
        .filter(batch_students::batch_id.eq(batch_id))
        .select((users::id, users::name, users::email, users::mobile))
        .order(users::id.asc())
        .load(conn)
        .await?;

    rows.into_iter()
        .map(|(id, name, email, mobile)| {
            let email = email_from_stored(email).map_err(BatchStoreError::query)?;
            Ok(StudentSummary {
                id,
                name,
                email,
                mobile,
            })
        })
        .collect()
}

/// Assemble the full batch snapshot for a row.
async fn batch_detail(
    conn: &mut AsyncPgConnection,
    row: BatchRow,
) -> Result<BatchDetail, BatchStoreError> {
    let trainer = trainer_summary(conn, row.trainer_id).await?;
    let course = course_summary(conn, row.course_id).await?;
    let enrolled_students = enrolled_summaries(conn, row.id).await?;
    Ok(BatchDetail {
        batch: row_to_batch(row),
        trainer,
        course,
        enrolled_students,
    })
}

#[async_trait]
impl BatchStore for DieselBatchStore {
    async fn create(&self, batch: NewBatch) -> Result<BatchDetail, BatchStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<BatchDetail, BatchStoreError, _>(|conn| {
            async move {
                checks::ensure_trainer(conn, batch.trainer_id).await?;
                checks::ensure_course(conn, batch.course_id).await?;

                let new_row = NewBatchRow {
                    cover_image: batch.cover.as_deref(),
                    trainer_id: batch.trainer_id,
                    course_id: batch.course_id,
                    study_material: batch.study_material.as_deref(),
                    batch_start_date: batch.batch_start_date,
                    batch_end_date: batch.batch_end_date,
                    batch_timings: batch.batch_timings.as_deref(),
                };
                let row: BatchRow = diesel::insert_into(batches::table)
                    .values(&new_row)
                    .returning(BatchRow::as_returning())
                    .get_result(conn)
                    .await?;

                if !batch.student_ids.is_empty() {
                    enrollment::replace_batch_students(conn, row.id, &batch.student_ids).await?;
                }

                batch_detail(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn update(
        &self,
        id: i32,
        patch: BatchPatch,
    ) -> Result<Option<BatchDetail>, BatchStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<BatchDetail>, BatchStoreError, _>(|conn| {
            async move {
                let existing: Option<i32> = batches::table
                    .filter(batches::id.eq(id))
                    .select(batches::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Ok(None);
                }

                if let Some(trainer_id) = patch.trainer_id {
                    checks::ensure_trainer(conn, trainer_id).await?;
                }
                if let Some(course_id) = patch.course_id {
                    checks::ensure_course(conn, course_id).await?;
                }

                let changes = BatchUpdateRow {
                    cover_image: patch.cover.as_deref(),
                    trainer_id: patch.trainer_id,
                    course_id: patch.course_id,
                    study_material: patch.study_material.as_deref(),
                    batch_start_date: patch.batch_start_date,
                    batch_end_date: patch.batch_end_date,
                    batch_timings: patch.batch_timings.as_deref(),
                };
                if changes.has_changes() {
                    diesel::update(batches::table.find(id))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                }

                if let Some(student_ids) = &patch.student_ids {
                    enrollment::replace_batch_students(conn, id, student_ids).await?;
                }

                let row: BatchRow = batches::table
                    .find(id)
                    .select(BatchRow::as_select())
                    .first(conn)
                    .await?;
                batch_detail(conn, row).await.map(Some)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: i32) -> Result<bool, BatchStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<bool, BatchStoreError, _>(|conn| {
            async move {
                diesel::delete(batch_students::table.filter(batch_students::batch_id.eq(id)))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(batches::table.find(id))
                    .execute(conn)
                    .await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BatchDetail>, BatchStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<BatchDetail>, BatchStoreError, _>(|conn| {
            async move {
                let row: Option<BatchRow> = batches::table
                    .find(id)
                    .select(BatchRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                match row {
                    Some(row) => batch_detail(conn, row).await.map(Some),
                    None => Ok(None),
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn list(&self) -> Result<Vec<BatchDetail>, BatchStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Vec<BatchDetail>, BatchStoreError, _>(|conn| {
            async move {
                let rows: Vec<BatchRow> = batches::table
                    .select(BatchRow::as_select())
                    .order(batches::id.asc())
                    .load(conn)
                    .await?;
                let mut details = Vec::with_capacity(rows.len());
                for row in rows {
                    details.push(batch_detail(conn, row).await?);
                }
                Ok(details)
            }
            .scope_boxed()
        })
        .await
    }

    async fn set_enrollment(
        &self,
        batch_id: i32,
        student_ids: Vec<i32>,
    ) -> Result<(), BatchStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<(), BatchStoreError, _>(|conn| {
            async move {
                let existing: Option<i32> = batches::table
                    .filter(batches::id.eq(batch_id))
                    .select(batches::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Err(BatchStoreError::not_found(format!(
                        "no batch with id {batch_id}"
                    )));
                }

                enrollment::replace_batch_students(conn, batch_id, &student_ids).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    fn row_conversion_preserves_optional_fields() {
        let row = BatchRow {
            id: 4,
            cover_image: None,
            trainer_id: 2,
            course_id: 9,
            study_material: Some("notes.pdf".to_owned()),
            batch_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
            batch_end_date: NaiveDate::from_ymd_opt(2026, 6, 5).expect("valid date"),
            batch_timings: None,
        };

        let batch = row_to_batch(row);
        assert_eq!(batch.id, 4);
        assert_eq!(batch.study_material.as_deref(), Some("notes.pdf"));
        assert!(batch.cover.is_none());
    }
}
