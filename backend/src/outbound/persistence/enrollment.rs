//! Replace-set maintenance for the batch/student bridge relation.
//!
//! Membership is never patched incrementally: the existing rows for one side
//! of the relation are deleted and the surviving set is bulk-inserted, all on
//! the caller's transaction. Calling either helper twice with the same set is
//! idempotent, and an empty set clears membership.

use std::collections::BTreeSet;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::checks::{CheckFailure, ensure_batches, ensure_students};
use super::models::NewBatchStudentRow;
use super::schema::batch_students;

/// Replace the full student membership of one batch.
///
/// Every id must resolve to a user with category Student; a failure leaves
/// the caller's transaction to roll back whatever triggered the replace.
pub(crate) async fn replace_batch_students(
    conn: &mut AsyncPgConnection,
    batch_id: i32,
    student_ids: &[i32],
) -> Result<(), CheckFailure> {
    ensure_students(conn, student_ids).await?;

    diesel::delete(batch_students::table.filter(batch_students::batch_id.eq(batch_id)))
        .execute(conn)
        .await
        .map_err(CheckFailure::Db)?;

    let rows: Vec<NewBatchStudentRow> = dedup(student_ids)
        .into_iter()
        .map(|student_id| NewBatchStudentRow {
            batch_id,
            student_id,
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }

    diesel::insert_into(batch_students::table)
        .values(&rows)
        .execute(conn)
        .await
        .map_err(CheckFailure::Db)?;
    Ok(())
}

/// Replace the full batch membership of one student.
///
/// The student-side mirror of [`replace_batch_students`]; every id must
/// resolve to an existing batch.
pub(crate) async fn replace_student_batches(
    conn: &mut AsyncPgConnection,
    student_id: i32,
    batch_ids: &[i32],
) -> Result<(), CheckFailure> {
    ensure_batches(conn, batch_ids).await?;

    diesel::delete(batch_students::table.filter(batch_students::student_id.eq(student_id)))
        .execute(conn)
        .await
        .map_err(CheckFailure::Db)?;

    let rows: Vec<NewBatchStudentRow> = dedup(batch_ids)
        .into_iter()
        .map(|batch_id| NewBatchStudentRow {
            batch_id,
            student_id,
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }

    diesel::insert_into(batch_students::table)
        .values(&rows)
        .execute(conn)
        .await
        .map_err(CheckFailure::Db)?;
    Ok(())
}

/// One bridge row per surviving id, regardless of duplicates in the input.
fn dedup(ids: &[i32]) -> BTreeSet<i32> {
    ids.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn dedup_collapses_repeated_ids_in_order() {
        let ids: Vec<i32> = dedup(&[4, 2, 4, 9, 2]).into_iter().collect();
        assert_eq!(ids, vec![2, 4, 9]);
    }

    #[rstest]
    fn dedup_of_empty_input_is_empty() {
        assert!(dedup(&[]).is_empty());
    }
}
