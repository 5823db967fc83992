//! Shared fixtures for the behavioural test suites.

use std::sync::Arc;

use academy_backend::domain::{
    AdminRole, Availability, BatchService, Category, CourseService, EmailAddress, LearningMode,
    NewBatch, NewCourse, NewUser, ProfileData, SyllabusService, TrainerRole,
    UserProvisioningService,
};
use academy_backend::test_support::InMemoryStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct Services {
    pub users: UserProvisioningService<InMemoryStore>,
    pub courses: CourseService<InMemoryStore>,
    pub batches: BatchService<InMemoryStore>,
    pub syllabus: SyllabusService<InMemoryStore>,
}

pub fn services() -> Services {
    let store = Arc::new(InMemoryStore::new());
    Services {
        users: UserProvisioningService::new(Arc::clone(&store)),
        courses: CourseService::new(Arc::clone(&store)),
        batches: BatchService::new(Arc::clone(&store)),
        syllabus: SyllabusService::new(store),
    }
}

pub fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw).expect("fixture email is valid")
}

pub fn admin_command(mail: &str) -> NewUser {
    NewUser::new(
        "Ada Admin",
        email(mail),
        "hashed-secret",
        9_876_543_210,
        ProfileData::Admin {
            role: AdminRole::SuperAdmin,
        },
    )
    .expect("fixture admin command is valid")
}

pub fn trainer_command(mail: &str) -> NewUser {
    NewUser::new(
        "Tina Trainer",
        email(mail),
        "hashed-secret",
        9_876_543_211,
        ProfileData::Trainer {
            role: TrainerRole::SrTrainer,
        },
    )
    .expect("fixture trainer command is valid")
}

pub fn student_command(mail: &str, course_id: i32) -> NewUser {
    NewUser::new(
        "Sam Student",
        email(mail),
        "hashed-secret",
        9_876_543_212,
        ProfileData::Student {
            course_id,
            learning_mode: LearningMode::Online,
            fee_detail: "45000 INR".to_owned(),
            payment_mode: "UPI".to_owned(),
        },
    )
    .expect("fixture student command is valid")
}

pub fn course_command(trainer_id: i32) -> NewCourse {
    NewCourse::new(
        "Rust in Production",
        trainer_id,
        Decimal::new(49_999, 2),
        Some(Decimal::new(39_999, 2)),
        None,
        Availability::Always,
        None,
    )
    .expect("fixture course command is valid")
}

pub fn batch_command(trainer_id: i32, course_id: i32, student_ids: Vec<i32>) -> NewBatch {
    NewBatch {
        trainer_id,
        course_id,
        batch_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
        batch_end_date: NaiveDate::from_ymd_opt(2026, 6, 5).expect("valid date"),
        batch_timings: Some("Mon/Wed 18:00".to_owned()),
        student_ids,
        ..NewBatch::default()
    }
}

/// Provision a trainer and return its id.
pub async fn seed_trainer(services: &Services, mail: &str) -> i32 {
    services
        .users
        .create_user(trainer_command(mail))
        .await
        .expect("trainer fixture provisions")
        .id()
}

/// Provision a trainer-owned course and return its id.
pub async fn seed_course(services: &Services, trainer_id: i32) -> i32 {
    services
        .courses
        .create_course(course_command(trainer_id))
        .await
        .expect("course fixture creates")
        .course
        .id
}

/// Provision a student on the course and return its id.
pub async fn seed_student(services: &Services, mail: &str, course_id: i32) -> i32 {
    services
        .users
        .create_user(student_command(mail, course_id))
        .await
        .expect("student fixture provisions")
        .id()
}

/// Provision a batch and return its id.
pub async fn seed_batch(
    services: &Services,
    trainer_id: i32,
    course_id: i32,
    student_ids: Vec<i32>,
) -> i32 {
    services
        .batches
        .create_batch(batch_command(trainer_id, course_id, student_ids))
        .await
        .expect("batch fixture creates")
        .batch
        .id
}

/// Current membership of a batch, sorted by student id.
pub async fn batch_members(services: &Services, batch_id: i32) -> Vec<i32> {
    let detail = services
        .batches
        .get_batch(batch_id)
        .await
        .expect("batch exists");
    let mut ids: Vec<i32> = detail
        .enrolled_students
        .iter()
        .map(|student| student.id)
        .collect();
    ids.sort_unstable();
    ids
}

pub fn assert_category(user: &academy_backend::domain::User, category: Category) {
    assert_eq!(user.category(), category);
}
