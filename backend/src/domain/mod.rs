//! Domain layer: entities, validation, services, and ports.
//!
//! Nothing in this module touches the relational store directly; all
//! persistence flows through the port traits in [`ports`].

pub mod batch;
pub mod course;
mod error;
pub mod ports;
mod provisioning;
pub mod syllabus;
pub mod user;

mod batch_service;
mod course_service;
mod syllabus_service;

pub use batch::{Batch, BatchDetail, BatchPatch, BatchSummary, NewBatch};
pub use batch_service::BatchService;
pub use course::{
    Availability, ContentKind, Course, CourseContent, CourseDetail, CoursePatch, CourseSummary,
    CourseValidationError, NewCourse,
};
pub use course_service::CourseService;
pub use error::{DomainError, ErrorCode};
pub use provisioning::UserProvisioningService;
pub use syllabus::{
    Chapter, ChapterPatch, NewChapter, NewSession, Session, SessionEdit, SyllabusValidationError,
};
pub use syllabus_service::SyllabusService;
pub use user::{
    AdminRole, Category, EmailAddress, LearningMode, NewUser, ProfileData, ProfilePatch,
    StudentSummary, TrainerRole, TrainerSummary, User, UserDetail, UserPatch,
    UserValidationError,
};
