//! Batch entity and enrollment commands.
//!
//! A batch ties a trainer and a course to a set of enrolled students. The
//! student set lives in a bridge relation with replace-the-whole-set update
//! semantics; incremental membership patches are deliberately not offered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::course::CourseSummary;
use crate::domain::user::{StudentSummary, TrainerSummary};

/// Scheduled batch of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: i32,
    pub trainer_id: i32,
    pub course_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_material: Option<String>,
    pub batch_start_date: NaiveDate,
    pub batch_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_timings: Option<String>,
}

/// Command to create a batch, optionally with an initial student set.
///
/// The trainer, course, and every student id are validated inside the same
/// transaction as the insert; any failure leaves no batch behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBatch {
    pub trainer_id: i32,
    pub course_id: i32,
    pub cover: Option<String>,
    pub study_material: Option<String>,
    pub batch_start_date: NaiveDate,
    pub batch_end_date: NaiveDate,
    pub batch_timings: Option<String>,
    pub student_ids: Vec<i32>,
}

/// Partial update for a batch.
///
/// A supplied `student_ids` list fully replaces the enrolled set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPatch {
    pub trainer_id: Option<i32>,
    pub course_id: Option<i32>,
    pub cover: Option<String>,
    pub study_material: Option<String>,
    pub batch_start_date: Option<NaiveDate>,
    pub batch_end_date: Option<NaiveDate>,
    pub batch_timings: Option<String>,
    pub student_ids: Option<Vec<i32>>,
}

/// Batch fields embedded in a student's membership listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub id: i32,
    pub course_id: i32,
    pub batch_start_date: NaiveDate,
    pub batch_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_timings: Option<String>,
}

/// Batch snapshot with its resolved trainer, course, and enrolled students.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDetail {
    #[serde(flatten)]
    pub batch: Batch,
    pub trainer: TrainerSummary,
    pub course: CourseSummary,
    pub enrolled_students: Vec<StudentSummary>,
}
