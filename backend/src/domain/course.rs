//! Course entity, availability rules, and catalogue commands.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::user::{StudentSummary, TrainerSummary};

/// Validation errors returned by course command constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    EmptyCourseName,
    NegativePrice,
    EmptyContentLocation,
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCourseName => write!(f, "course name must not be empty"),
            Self::NegativePrice => write!(f, "prices must not be negative"),
            Self::EmptyContentLocation => write!(f, "content location must not be empty"),
        }
    }
}

impl std::error::Error for CourseValidationError {}

/// When a course can be taken.
///
/// A timebound course always carries both bounds; the partial state the
/// relational columns could express is rejected at the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "availabilityType", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Availability {
    Always,
    Timebound {
        available_from: DateTime<Utc>,
        available_to: DateTime<Utc>,
    },
}

/// Kind of supplementary content attached to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Pdf,
    Image,
    Video,
}

impl ContentKind {
    /// Stable string form used by the relational store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(Self::Pdf),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Supplementary content item: a kind plus an opaque location reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContent {
    pub kind: ContentKind,
    pub location: String,
}

impl CourseContent {
    /// Validate and construct a content item.
    pub fn new(kind: ContentKind, location: impl Into<String>) -> Result<Self, CourseValidationError> {
        let location = location.into();
        if location.trim().is_empty() {
            return Err(CourseValidationError::EmptyContentLocation);
        }
        Ok(Self { kind, location })
    }
}

/// Course offered by a trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i32,
    pub course_name: String,
    pub trainer_id: i32,
    pub total_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(flatten)]
    pub availability: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<CourseContent>,
}

/// Command to create a course.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    course_name: String,
    trainer_id: i32,
    total_price: Decimal,
    discount_price: Option<Decimal>,
    cover: Option<String>,
    availability: Availability,
    content: Option<CourseContent>,
}

impl NewCourse {
    /// Validate and construct a course-creation command.
    ///
    /// The trainer reference is checked against the store when the command
    /// executes, not here.
    pub fn new(
        course_name: impl Into<String>,
        trainer_id: i32,
        total_price: Decimal,
        discount_price: Option<Decimal>,
        cover: Option<String>,
        availability: Availability,
        content: Option<CourseContent>,
    ) -> Result<Self, CourseValidationError> {
        let course_name = course_name.into();
        if course_name.trim().is_empty() {
            return Err(CourseValidationError::EmptyCourseName);
        }
        if total_price.is_sign_negative()
            || matches!(discount_price, Some(price) if price.is_sign_negative())
        {
            return Err(CourseValidationError::NegativePrice);
        }

        Ok(Self {
            course_name,
            trainer_id,
            total_price,
            discount_price,
            cover,
            availability,
            content,
        })
    }

    /// Course title.
    pub fn course_name(&self) -> &str {
        self.course_name.as_str()
    }

    /// Trainer the course belongs to.
    pub fn trainer_id(&self) -> i32 {
        self.trainer_id
    }

    /// Full price of the course.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Optional discounted price.
    pub fn discount_price(&self) -> Option<Decimal> {
        self.discount_price
    }

    /// Optional cover asset reference.
    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    /// Availability window.
    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// Optional supplementary content item.
    pub fn content(&self) -> Option<&CourseContent> {
        self.content.as_ref()
    }
}

/// Partial update for a course.
///
/// Supplying `trainer_id` revalidates the reference; supplying
/// `availability` rewrites the whole availability window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    pub course_name: Option<String>,
    pub trainer_id: Option<i32>,
    pub total_price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub cover: Option<String>,
    pub availability: Option<Availability>,
    pub content: Option<CourseContent>,
}

impl CoursePatch {
    /// Check field-level constraints that do not need store access.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if matches!(self.course_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(CourseValidationError::EmptyCourseName);
        }
        if matches!(self.total_price, Some(price) if price.is_sign_negative())
            || matches!(self.discount_price, Some(price) if price.is_sign_negative())
        {
            return Err(CourseValidationError::NegativePrice);
        }
        Ok(())
    }
}

/// Course fields embedded in batch snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i32,
    pub course_name: String,
    pub total_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
}

/// Course snapshot with its resolved trainer and enrolled students.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub trainer: TrainerSummary,
    pub enrolled_students: Vec<StudentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn new_course_rejects_blank_name() {
        let err = NewCourse::new(
            "  ",
            1,
            Decimal::new(50_000, 2),
            None,
            None,
            Availability::Always,
            None,
        )
        .expect_err("blank name");
        assert_eq!(err, CourseValidationError::EmptyCourseName);
    }

    #[rstest]
    fn new_course_rejects_negative_prices() {
        let err = NewCourse::new(
            "Rust 101",
            1,
            Decimal::new(-1, 0),
            None,
            None,
            Availability::Always,
            None,
        )
        .expect_err("negative total");
        assert_eq!(err, CourseValidationError::NegativePrice);
    }

    #[rstest]
    fn content_requires_a_location() {
        let err = CourseContent::new(ContentKind::Pdf, "  ").expect_err("blank location");
        assert_eq!(err, CourseValidationError::EmptyContentLocation);
    }

    #[rstest]
    fn availability_serialises_with_the_stored_tag() {
        let always = serde_json::to_value(Availability::Always).expect("serializes");
        assert_eq!(always["availabilityType"], "always");

        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("valid date");
        let to = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).single().expect("valid date");
        let timebound = serde_json::to_value(Availability::Timebound {
            available_from: from,
            available_to: to,
        })
        .expect("serializes");
        assert_eq!(timebound["availabilityType"], "timebound");
        assert!(timebound.get("availableFrom").is_some());
        assert!(timebound.get("availableTo").is_some());
    }

    #[rstest]
    fn patch_validates_only_supplied_fields() {
        assert!(CoursePatch::default().validate().is_ok());

        let patch = CoursePatch {
            discount_price: Some(Decimal::new(-500, 2)),
            ..CoursePatch::default()
        };
        assert_eq!(patch.validate(), Err(CourseValidationError::NegativePrice));
    }
}
