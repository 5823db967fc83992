//! In-transaction consistency checks for cross-entity references.
//!
//! Every check runs on the caller's connection so it observes, and is
//! protected by, the enclosing transaction. A failed check aborts that
//! transaction via the `From` conversions at the bottom of this module.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{BatchStoreError, CourseStoreError, SyllabusStoreError, UserStoreError};
use crate::domain::user::Category;

use super::schema::{batches, courses, users};

/// Outcome of a failed consistency check.
#[derive(Debug)]
pub(crate) enum CheckFailure {
    MissingTrainer(i32),
    MissingCourse(i32),
    MissingStudents(Vec<i32>),
    MissingBatches(Vec<i32>),
    Corrupt(String),
    Db(diesel::result::Error),
}

impl CheckFailure {
    fn message(&self) -> String {
        match self {
            Self::MissingTrainer(id) => format!("no trainer with id {id}"),
            Self::MissingCourse(id) => format!("no course with id {id}"),
            Self::MissingStudents(ids) => format!("ids do not resolve to students: {ids:?}"),
            Self::MissingBatches(ids) => format!("ids do not resolve to batches: {ids:?}"),
            Self::Corrupt(message) => message.clone(),
            Self::Db(_) => "database error".to_owned(),
        }
    }
}

/// Require a user with category Trainer to exist.
pub(crate) async fn ensure_trainer(
    conn: &mut AsyncPgConnection,
    id: i32,
) -> Result<(), CheckFailure> {
    let found: Option<i32> = users::table
        .filter(users::id.eq(id))
        .filter(users::category.eq(Category::Trainer.as_str()))
        .select(users::id)
        .first(conn)
        .await
        .optional()
        .map_err(CheckFailure::Db)?;
    if found.is_none() {
        return Err(CheckFailure::MissingTrainer(id));
    }
    Ok(())
}

/// Require a course to exist.
pub(crate) async fn ensure_course(
    conn: &mut AsyncPgConnection,
    id: i32,
) -> Result<(), CheckFailure> {
    let found: Option<i32> = courses::table
        .filter(courses::id.eq(id))
        .select(courses::id)
        .first(conn)
        .await
        .optional()
        .map_err(CheckFailure::Db)?;
    if found.is_none() {
        return Err(CheckFailure::MissingCourse(id));
    }
    Ok(())
}

/// Require every id to resolve to a user with category Student.
pub(crate) async fn ensure_students(
    conn: &mut AsyncPgConnection,
    ids: &[i32],
) -> Result<(), CheckFailure> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<i32> = users::table
        .filter(users::id.eq_any(ids.to_vec()))
        .filter(users::category.eq(Category::Student.as_str()))
        .select(users::id)
        .load(conn)
        .await
        .map_err(CheckFailure::Db)?;
    let missing = missing_ids(ids, &found);
    if !missing.is_empty() {
        return Err(CheckFailure::MissingStudents(missing));
    }
    Ok(())
}

/// Require every id to resolve to a batch.
pub(crate) async fn ensure_batches(
    conn: &mut AsyncPgConnection,
    ids: &[i32],
) -> Result<(), CheckFailure> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<i32> = batches::table
        .filter(batches::id.eq_any(ids.to_vec()))
        .select(batches::id)
        .load(conn)
        .await
        .map_err(CheckFailure::Db)?;
    let missing = missing_ids(ids, &found);
    if !missing.is_empty() {
        return Err(CheckFailure::MissingBatches(missing));
    }
    Ok(())
}

/// Fetch a user's category, if the user exists.
pub(crate) async fn user_category(
    conn: &mut AsyncPgConnection,
    id: i32,
) -> Result<Option<Category>, CheckFailure> {
    let stored: Option<String> = users::table
        .filter(users::id.eq(id))
        .select(users::category)
        .first(conn)
        .await
        .optional()
        .map_err(CheckFailure::Db)?;

    stored
        .map(|value| {
            Category::parse(&value)
                .ok_or_else(|| CheckFailure::Corrupt(format!("unknown user category {value}")))
        })
        .transpose()
}

fn missing_ids(supplied: &[i32], found: &[i32]) -> Vec<i32> {
    let mut missing: Vec<i32> = supplied
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

impl From<CheckFailure> for UserStoreError {
    fn from(failure: CheckFailure) -> Self {
        match failure {
            CheckFailure::Db(error) => error.into(),
            CheckFailure::Corrupt(message) => Self::query(message),
            other => Self::invalid_reference(other.message()),
        }
    }
}

impl From<CheckFailure> for CourseStoreError {
    fn from(failure: CheckFailure) -> Self {
        match failure {
            CheckFailure::Db(error) => error.into(),
            CheckFailure::Corrupt(message) => Self::query(message),
            other => Self::invalid_reference(other.message()),
        }
    }
}

impl From<CheckFailure> for BatchStoreError {
    fn from(failure: CheckFailure) -> Self {
        match failure {
            CheckFailure::Db(error) => error.into(),
            CheckFailure::Corrupt(message) => Self::query(message),
            other => Self::invalid_reference(other.message()),
        }
    }
}

impl From<CheckFailure> for SyllabusStoreError {
    fn from(failure: CheckFailure) -> Self {
        match failure {
            CheckFailure::Db(error) => error.into(),
            CheckFailure::Corrupt(message) => Self::query(message),
            other => Self::invalid_reference(other.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_ids_reports_sorted_deduplicated_gaps() {
        let missing = missing_ids(&[5, 3, 5, 1], &[3]);
        assert_eq!(missing, vec![1, 5]);
    }

    #[rstest]
    fn missing_ids_is_empty_when_all_resolve() {
        assert!(missing_ids(&[1, 2], &[2, 1]).is_empty());
    }

    #[rstest]
    fn failures_convert_to_invalid_reference_errors() {
        let error = UserStoreError::from(CheckFailure::MissingCourse(9));
        assert_eq!(error, UserStoreError::invalid_reference("no course with id 9"));

        let error = BatchStoreError::from(CheckFailure::MissingStudents(vec![4, 8]));
        assert_eq!(
            error,
            BatchStoreError::invalid_reference("ids do not resolve to students: [4, 8]")
        );
    }

    #[rstest]
    fn corrupt_state_converts_to_query_errors() {
        let error = UserStoreError::from(CheckFailure::Corrupt("unknown user category X".to_owned()));
        assert!(matches!(error, UserStoreError::Query { .. }));
    }
}
