//! PostgreSQL-backed `CourseStore` implementation using Diesel ORM.
//!
//! Course deletion follows a restrict-then-cascade policy: the delete is
//! refused while batches or student profiles reference the course, and the
//! course's syllabus (chapters and sessions) is removed in the same
//! transaction once nothing else depends on it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use chrono::{DateTime, Utc};

use crate::domain::course::{
    Availability, Course, CourseContent, CourseDetail, CoursePatch, ContentKind, NewCourse,
};
use crate::domain::ports::{CourseStore, CourseStoreError};
use crate::domain::user::{EmailAddress, StudentSummary, TrainerRole, TrainerSummary};

use super::checks;
use super::models::{CourseRow, CourseUpdateRow, NewCourseRow};
use super::pool::DbPool;
use super::schema::{batches, chapters, courses, sessions, student_profiles, trainer_profiles, users};

/// Diesel-backed implementation of the [`CourseStore`] port.
#[derive(Clone)]
pub struct DieselCourseStore {
    pool: DbPool,
}

impl DieselCourseStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Split an availability value into its three relational columns.
fn availability_to_columns(
    availability: Availability,
) -> (&'static str, Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match availability {
        Availability::Always => ("always", None, None),
        Availability::Timebound {
            available_from,
            available_to,
        } => ("timebound", Some(available_from), Some(available_to)),
    }
}

/// Rebuild the availability value from its relational columns.
fn availability_from_columns(
    kind: &str,
    available_from: Option<DateTime<Utc>>,
    available_to: Option<DateTime<Utc>>,
) -> Result<Availability, CourseStoreError> {
    match kind {
        "always" => Ok(Availability::Always),
        "timebound" => match (available_from, available_to) {
            (Some(available_from), Some(available_to)) => Ok(Availability::Timebound {
                available_from,
                available_to,
            }),
            _ => Err(CourseStoreError::query(
                "timebound course is missing an availability bound",
            )),
        },
        other => Err(CourseStoreError::query(format!(
            "unknown availability type {other}"
        ))),
    }
}

/// Convert a course row into a domain course.
fn row_to_course(row: CourseRow) -> Result<Course, CourseStoreError> {
    let availability =
        availability_from_columns(&row.availability_type, row.available_from, row.available_to)?;
    let content = match (row.item_type, row.item_url) {
        (Some(kind), Some(location)) => {
            let kind = ContentKind::parse(&kind)
                .ok_or_else(|| CourseStoreError::query(format!("unknown content kind {kind}")))?;
            Some(CourseContent { kind, location })
        }
        (None, None) => None,
        _ => {
            return Err(CourseStoreError::query(
                "course content columns are inconsistent",
            ));
        }
    };

    Ok(Course {
        id: row.id,
        course_name: row.course_name,
        trainer_id: row.trainer_id,
        total_price: row.total_price,
        discount_price: row.discount_price,
        cover: row.course_cover,
        availability,
        content,
    })
}

pub(crate) fn email_from_stored(raw: String) -> Result<EmailAddress, String> {
    EmailAddress::new(raw).map_err(|err| format!("stored email invalid: {err}"))
}

/// Load the trainer summary referenced by a course or batch row.
pub(crate) async fn trainer_summary(
    conn: &mut AsyncPgConnection,
    trainer_id: i32,
) -> Result<TrainerSummary, checks::CheckFailure> {
    let (id, name, email, role): (i32, String, String, String) = users::table
        .inner_join(trainer_profiles::table)
        .filter(users::id.eq(trainer_id))
        .select((
            users::id,
            users::name,
            users::email,
            trainer_profiles::role,
        ))
        .first(conn)
        .await
        .map_err(checks::CheckFailure::Db)?;

    let email = email_from_stored(email).map_err(checks::CheckFailure::Corrupt)?;
    let role = TrainerRole::parse(&role)
        .ok_or_else(|| checks::CheckFailure::Corrupt(format!("unknown trainer role {role}")))?;
    Ok(TrainerSummary {
        id,
        name,
        email,
        role,
    })
}

/// Students whose profile references the course.
async fn enrolled_summaries(
    conn: &mut AsyncPgConnection,
    course_id: i32,
) -> Result<Vec<StudentSummary>, CourseStoreError> {
    let rows: Vec<(i32, String, String, i64)> = student_profiles::table
        .inner_join(users::table)
        .filter(student_profiles::course_id.eq(course_id))
        .select((users::id, users::name, users::email, users::mobile))
        .order(users::id.asc())
        .load(conn)
        .await?;

    rows.into_iter()
        .map(|(id, name, email, mobile)| {
            let email = email_from_stored(email).map_err(CourseStoreError::query)?;
            Ok(StudentSummary {
                id,
                name,
                email,
                mobile,
            })
        })
        .collect()
}

/// Assemble the full course snapshot for a row.
async fn course_detail(
    conn: &mut AsyncPgConnection,
    row: CourseRow,
) -> Result<CourseDetail, CourseStoreError> {
    let trainer = trainer_summary(conn, row.trainer_id).await?;
    let enrolled_students = enrolled_summaries(conn, row.id).await?;
    Ok(CourseDetail {
        course: row_to_course(row)?,
        trainer,
        enrolled_students,
    })
}

#[async_trait]
impl CourseStore for DieselCourseStore {
    async fn create(&self, course: NewCourse) -> Result<CourseDetail, CourseStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<CourseDetail, CourseStoreError, _>(|conn| {
            async move {
                checks::ensure_trainer(conn, course.trainer_id()).await?;

                let (availability_type, available_from, available_to) =
                    availability_to_columns(course.availability());
                let new_row = NewCourseRow {
                    course_name: course.course_name(),
                    trainer_id: course.trainer_id(),
                    total_price: course.total_price(),
                    discount_price: course.discount_price(),
                    course_cover: course.cover(),
                    availability_type,
                    available_from,
                    available_to,
                    item_type: course.content().map(|content| content.kind.as_str()),
                    item_url: course.content().map(|content| content.location.as_str()),
                };
                let row: CourseRow = diesel::insert_into(courses::table)
                    .values(&new_row)
                    .returning(CourseRow::as_returning())
                    .get_result(conn)
                    .await?;

                course_detail(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn update(
        &self,
        id: i32,
        patch: CoursePatch,
    ) -> Result<Option<CourseDetail>, CourseStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<CourseDetail>, CourseStoreError, _>(|conn| {
            async move {
                let existing: Option<i32> = courses::table
                    .filter(courses::id.eq(id))
                    .select(courses::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Ok(None);
                }

                if let Some(trainer_id) = patch.trainer_id {
                    checks::ensure_trainer(conn, trainer_id).await?;
                }

                let changes = CourseUpdateRow {
                    course_name: patch.course_name.as_deref(),
                    trainer_id: patch.trainer_id,
                    total_price: patch.total_price,
                    discount_price: patch.discount_price,
                    course_cover: patch.cover.as_deref(),
                    item_type: patch.content.as_ref().map(|content| content.kind.as_str()),
                    item_url: patch
                        .content
                        .as_ref()
                        .map(|content| content.location.as_str()),
                };
                if changes.has_changes() {
                    diesel::update(courses::table.find(id))
                        .set(&changes)
                        .execute(conn)
                        .await?;
                }

                // Rewrite the whole availability trio so a switch back to
                // `always` clears both bounds.
                if let Some(availability) = patch.availability {
                    let (availability_type, available_from, available_to) =
                        availability_to_columns(availability);
                    diesel::update(courses::table.find(id))
                        .set((
                            courses::availability_type.eq(availability_type),
                            courses::available_from.eq(available_from),
                            courses::available_to.eq(available_to),
                        ))
                        .execute(conn)
                        .await?;
                }

                let row: CourseRow = courses::table
                    .find(id)
                    .select(CourseRow::as_select())
                    .first(conn)
                    .await?;
                course_detail(conn, row).await.map(Some)
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: i32) -> Result<bool, CourseStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<bool, CourseStoreError, _>(|conn| {
            async move {
                let existing: Option<i32> = courses::table
                    .filter(courses::id.eq(id))
                    .select(courses::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Ok(false);
                }

                let batch_refs: i64 = batches::table
                    .filter(batches::course_id.eq(id))
                    .count()
                    .get_result(conn)
                    .await?;
                let student_refs: i64 = student_profiles::table
                    .filter(student_profiles::course_id.eq(id))
                    .count()
                    .get_result(conn)
                    .await?;
                if batch_refs > 0 || student_refs > 0 {
                    return Err(CourseStoreError::conflict(format!(
                        "course {id} is still referenced by batches or student profiles"
                    )));
                }

                let chapter_ids: Vec<i32> = chapters::table
                    .filter(chapters::course_id.eq(id))
                    .select(chapters::id)
                    .load(conn)
                    .await?;
                if !chapter_ids.is_empty() {
                    diesel::delete(
                        sessions::table.filter(sessions::chapter_id.eq_any(chapter_ids)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(chapters::table.filter(chapters::course_id.eq(id)))
                        .execute(conn)
                        .await?;
                }

                diesel::delete(courses::table.find(id)).execute(conn).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CourseDetail>, CourseStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Option<CourseDetail>, CourseStoreError, _>(|conn| {
            async move {
                let row: Option<CourseRow> = courses::table
                    .find(id)
                    .select(CourseRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                match row {
                    Some(row) => course_detail(conn, row).await.map(Some),
                    None => Ok(None),
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn list(&self) -> Result<Vec<CourseDetail>, CourseStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Vec<CourseDetail>, CourseStoreError, _>(|conn| {
            async move {
                let rows: Vec<CourseRow> = courses::table
                    .select(CourseRow::as_select())
                    .order(courses::id.asc())
                    .load(conn)
                    .await?;
                let mut details = Vec::with_capacity(rows.len());
                for row in rows {
                    details.push(course_detail(conn, row).await?);
                }
                Ok(details)
            }
            .scope_boxed()
        })
        .await
    }

    async fn enrolled_students(&self, course_id: i32) -> Result<Vec<i32>, CourseStoreError> {
        let mut conn = self.pool.get().await?;
        conn.transaction::<Vec<i32>, CourseStoreError, _>(|conn| {
            async move {
                let existing: Option<i32> = courses::table
                    .filter(courses::id.eq(course_id))
                    .select(courses::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_none() {
                    return Err(CourseStoreError::not_found(format!(
                        "no course with id {course_id}"
                    )));
                }

                let ids: Vec<i32> = student_profiles::table
                    .filter(student_profiles::course_id.eq(course_id))
                    .select(student_profiles::user_id)
                    .order(student_profiles::user_id.asc())
                    .load(conn)
                    .await?;
                Ok(ids)
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for availability and content column handling.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn course_row() -> CourseRow {
        CourseRow {
            id: 1,
            course_name: "Rust 101".to_owned(),
            trainer_id: 5,
            total_price: Decimal::new(50_000, 2),
            discount_price: None,
            course_cover: None,
            availability_type: "always".to_owned(),
            available_from: None,
            available_to: None,
            item_type: None,
            item_url: None,
        }
    }

    #[rstest]
    fn availability_columns_round_trip() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().expect("valid date");
        let to = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid date");
        let (kind, col_from, col_to) = availability_to_columns(Availability::Timebound {
            available_from: from,
            available_to: to,
        });

        let rebuilt = availability_from_columns(kind, col_from, col_to).expect("valid columns");
        assert_eq!(
            rebuilt,
            Availability::Timebound {
                available_from: from,
                available_to: to,
            }
        );
    }

    #[rstest]
    fn timebound_row_missing_a_bound_is_rejected() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().expect("valid date");
        let error =
            availability_from_columns("timebound", Some(from), None).expect_err("missing bound");
        assert!(matches!(error, CourseStoreError::Query { .. }));
    }

    #[rstest]
    fn unknown_availability_kind_is_rejected() {
        let error = availability_from_columns("sometimes", None, None).expect_err("unknown kind");
        assert!(error.to_string().contains("sometimes"));
    }

    #[rstest]
    fn row_with_half_a_content_pair_is_rejected() {
        let mut row = course_row();
        row.item_type = Some("pdf".to_owned());
        let error = row_to_course(row).expect_err("inconsistent content");
        assert!(matches!(error, CourseStoreError::Query { .. }));
    }

    #[rstest]
    fn row_with_full_content_pair_converts() {
        let mut row = course_row();
        row.item_type = Some("video".to_owned());
        row.item_url = Some("assets/intro.mp4".to_owned());
        let course = row_to_course(row).expect("valid row");
        assert_eq!(
            course.content,
            Some(CourseContent {
                kind: ContentKind::Video,
                location: "assets/intro.mp4".to_owned(),
            })
        );
    }
}
