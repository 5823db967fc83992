//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{
    admin_profiles, batch_students, batches, chapters, courses, sessions, student_profiles,
    trainer_profiles, users,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub mobile: i64,
    pub category: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub mobile: i64,
    pub category: &'a str,
}

/// Changeset struct for updating base user columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdateRow<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub mobile: Option<i64>,
}

// ---------------------------------------------------------------------------
// Profile rows
// ---------------------------------------------------------------------------

/// Row struct for reading from the admin_profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admin_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminProfileRow {
    pub user_id: i32,
    pub role: String,
}

/// Insertable struct for creating admin profile rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_profiles)]
pub(crate) struct NewAdminProfileRow<'a> {
    pub user_id: i32,
    pub role: &'a str,
}

/// Row struct for reading from the trainer_profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trainer_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrainerProfileRow {
    pub user_id: i32,
    pub role: String,
}

/// Insertable struct for creating trainer profile rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trainer_profiles)]
pub(crate) struct NewTrainerProfileRow<'a> {
    pub user_id: i32,
    pub role: &'a str,
}

/// Row struct for reading from the student_profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = student_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentProfileRow {
    pub user_id: i32,
    pub course_id: i32,
    pub learning_mode: String,
    pub fee_detail: String,
    pub payment_mode: String,
}

/// Insertable struct for creating student profile rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = student_profiles)]
pub(crate) struct NewStudentProfileRow<'a> {
    pub user_id: i32,
    pub course_id: i32,
    pub learning_mode: &'a str,
    pub fee_detail: &'a str,
    pub payment_mode: &'a str,
}

/// Changeset struct for updating student profile columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = student_profiles)]
pub(crate) struct StudentProfileUpdateRow<'a> {
    pub course_id: Option<i32>,
    pub learning_mode: Option<&'a str>,
    pub fee_detail: Option<&'a str>,
    pub payment_mode: Option<&'a str>,
}

impl StudentProfileUpdateRow<'_> {
    /// Whether any column is touched; Diesel rejects empty changesets.
    pub(crate) fn has_changes(&self) -> bool {
        self.course_id.is_some()
            || self.learning_mode.is_some()
            || self.fee_detail.is_some()
            || self.payment_mode.is_some()
    }
}

// ---------------------------------------------------------------------------
// Course rows
// ---------------------------------------------------------------------------

/// Row struct for reading from the courses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: i32,
    pub course_name: String,
    pub trainer_id: i32,
    pub total_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub course_cover: Option<String>,
    pub availability_type: String,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub item_type: Option<String>,
    pub item_url: Option<String>,
}

/// Insertable struct for creating course rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub course_name: &'a str,
    pub trainer_id: i32,
    pub total_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub course_cover: Option<&'a str>,
    pub availability_type: &'a str,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub item_type: Option<&'a str>,
    pub item_url: Option<&'a str>,
}

/// Changeset struct for updating scalar course columns.
///
/// The availability trio is rewritten with an explicit set in the adapter so
/// a switch back to `always` clears both bounds.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseUpdateRow<'a> {
    pub course_name: Option<&'a str>,
    pub trainer_id: Option<i32>,
    pub total_price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub course_cover: Option<&'a str>,
    pub item_type: Option<&'a str>,
    pub item_url: Option<&'a str>,
}

impl CourseUpdateRow<'_> {
    /// Whether any column is touched; Diesel rejects empty changesets.
    pub(crate) fn has_changes(&self) -> bool {
        self.course_name.is_some()
            || self.trainer_id.is_some()
            || self.total_price.is_some()
            || self.discount_price.is_some()
            || self.course_cover.is_some()
            || self.item_type.is_some()
            || self.item_url.is_some()
    }
}

// ---------------------------------------------------------------------------
// Batch rows
// ---------------------------------------------------------------------------

/// Row struct for reading from the batches table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BatchRow {
    pub id: i32,
    pub cover_image: Option<String>,
    pub trainer_id: i32,
    pub course_id: i32,
    pub study_material: Option<String>,
    pub batch_start_date: NaiveDate,
    pub batch_end_date: NaiveDate,
    pub batch_timings: Option<String>,
}

/// Insertable struct for creating batch rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = batches)]
pub(crate) struct NewBatchRow<'a> {
    pub cover_image: Option<&'a str>,
    pub trainer_id: i32,
    pub course_id: i32,
    pub study_material: Option<&'a str>,
    pub batch_start_date: NaiveDate,
    pub batch_end_date: NaiveDate,
    pub batch_timings: Option<&'a str>,
}

/// Changeset struct for updating batch columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = batches)]
pub(crate) struct BatchUpdateRow<'a> {
    pub cover_image: Option<&'a str>,
    pub trainer_id: Option<i32>,
    pub course_id: Option<i32>,
    pub study_material: Option<&'a str>,
    pub batch_start_date: Option<NaiveDate>,
    pub batch_end_date: Option<NaiveDate>,
    pub batch_timings: Option<&'a str>,
}

impl BatchUpdateRow<'_> {
    /// Whether any column is touched; Diesel rejects empty changesets.
    pub(crate) fn has_changes(&self) -> bool {
        self.cover_image.is_some()
            || self.trainer_id.is_some()
            || self.course_id.is_some()
            || self.study_material.is_some()
            || self.batch_start_date.is_some()
            || self.batch_end_date.is_some()
            || self.batch_timings.is_some()
    }
}

/// Insertable struct for bridge rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = batch_students)]
pub(crate) struct NewBatchStudentRow {
    pub batch_id: i32,
    pub student_id: i32,
}

// ---------------------------------------------------------------------------
// Syllabus rows
// ---------------------------------------------------------------------------

/// Row struct for reading from the chapters table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chapters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChapterRow {
    pub id: i32,
    pub chapter_name: String,
    pub course_id: i32,
}

/// Insertable struct for creating chapter rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chapters)]
pub(crate) struct NewChapterRow<'a> {
    pub chapter_name: &'a str,
    pub course_id: i32,
}

/// Changeset struct for updating chapter columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = chapters)]
pub(crate) struct ChapterUpdateRow<'a> {
    pub chapter_name: Option<&'a str>,
    pub course_id: Option<i32>,
}

impl ChapterUpdateRow<'_> {
    /// Whether any column is touched; Diesel rejects empty changesets.
    pub(crate) fn has_changes(&self) -> bool {
        self.chapter_name.is_some() || self.course_id.is_some()
    }
}

/// Row struct for reading from the sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub id: i32,
    pub session_name: String,
    pub session_link: String,
    pub chapter_id: i32,
}

/// Insertable struct for creating session rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub session_name: &'a str,
    pub session_link: &'a str,
    pub chapter_id: i32,
}

/// Changeset struct for editing session columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sessions)]
pub(crate) struct SessionUpdateRow<'a> {
    pub session_name: Option<&'a str>,
    pub session_link: Option<&'a str>,
}

impl SessionUpdateRow<'_> {
    /// Whether any column is touched; Diesel rejects empty changesets.
    pub(crate) fn has_changes(&self) -> bool {
        self.session_name.is_some() || self.session_link.is_some()
    }
}
