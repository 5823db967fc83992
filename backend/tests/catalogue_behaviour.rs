//! Behavioural tests for the course catalogue and syllabus: availability
//! bounds, reference revalidation, and the restrict-then-cascade delete
//! policy.

mod support;

use academy_backend::domain::{
    Availability, ChapterPatch, CoursePatch, ErrorCode, NewChapter, NewCourse, NewSession,
    SessionEdit,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use support::{seed_batch, seed_course, seed_student, seed_trainer, services};

#[tokio::test]
async fn timebound_bounds_are_stored_exactly_as_given() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;

    let from = Utc
        .with_ymd_and_hms(2026, 2, 1, 9, 30, 0)
        .single()
        .expect("valid date");
    let to = Utc
        .with_ymd_and_hms(2026, 4, 1, 18, 0, 0)
        .single()
        .expect("valid date");
    let command = NewCourse::new(
        "Async Rust",
        trainer_id,
        Decimal::new(75_000, 2),
        None,
        None,
        Availability::Timebound {
            available_from: from,
            available_to: to,
        },
        None,
    )
    .expect("valid command");

    let created = services
        .courses
        .create_course(command)
        .await
        .expect("course creates");
    assert_eq!(
        created.course.availability,
        Availability::Timebound {
            available_from: from,
            available_to: to,
        }
    );

    let fetched = services
        .courses
        .get_course(created.course.id)
        .await
        .expect("course exists");
    assert_eq!(fetched.course.availability, created.course.availability);
}

#[tokio::test]
async fn course_creation_requires_a_trainer_reference() {
    let services = services();
    let command = NewCourse::new(
        "Orphan Course",
        999,
        Decimal::new(10_000, 2),
        None,
        None,
        Availability::Always,
        None,
    )
    .expect("valid command");

    let error = services
        .courses
        .create_course(command)
        .await
        .expect_err("unknown trainer is rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let courses = services.courses.list_courses().await.expect("listing works");
    assert!(courses.is_empty());
}

#[tokio::test]
async fn course_update_revalidates_a_supplied_trainer() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;

    let error = services
        .courses
        .update_course(
            course_id,
            CoursePatch {
                trainer_id: Some(999),
                ..CoursePatch::default()
            },
        )
        .await
        .expect_err("unknown trainer is rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let updated = services
        .courses
        .update_course(
            course_id,
            CoursePatch {
                course_name: Some("Rust, Revised".to_owned()),
                ..CoursePatch::default()
            },
        )
        .await
        .expect("rename succeeds");
    assert_eq!(updated.course.course_name, "Rust, Revised");
    assert_eq!(updated.course.trainer_id, trainer_id);
}

#[tokio::test]
async fn availability_update_rewrites_the_whole_window() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;

    let from = Utc
        .with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
        .single()
        .expect("valid date");
    let to = Utc
        .with_ymd_and_hms(2026, 5, 1, 0, 0, 0)
        .single()
        .expect("valid date");
    let updated = services
        .courses
        .update_course(
            course_id,
            CoursePatch {
                availability: Some(Availability::Timebound {
                    available_from: from,
                    available_to: to,
                }),
                ..CoursePatch::default()
            },
        )
        .await
        .expect("window update succeeds");
    assert!(matches!(
        updated.course.availability,
        Availability::Timebound { .. }
    ));

    let reverted = services
        .courses
        .update_course(
            course_id,
            CoursePatch {
                availability: Some(Availability::Always),
                ..CoursePatch::default()
            },
        )
        .await
        .expect("revert succeeds");
    assert_eq!(reverted.course.availability, Availability::Always);
}

#[tokio::test]
async fn course_deletion_is_refused_while_referenced() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let batch_id = seed_batch(&services, trainer_id, course_id, Vec::new()).await;

    let error = services
        .courses
        .delete_course(course_id)
        .await
        .expect_err("referenced course cannot be deleted");
    assert_eq!(error.code(), ErrorCode::Conflict);

    assert!(services.batches.delete_batch(batch_id).await.expect("batch deletes"));
    assert!(services.courses.delete_course(course_id).await.expect("course deletes"));
    // Deleting again reports that nothing was removed.
    assert!(!services.courses.delete_course(course_id).await.expect("outcome"));
}

#[tokio::test]
async fn course_deletion_cascades_its_syllabus() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;

    let chapter = services
        .syllabus
        .create_chapter(
            NewChapter::new(
                "Ownership",
                course_id,
                vec![NewSession::new("Moves", "vids/moves").expect("valid session")],
            )
            .expect("valid chapter"),
        )
        .await
        .expect("chapter creates");

    assert!(services.courses.delete_course(course_id).await.expect("course deletes"));

    let error = services
        .syllabus
        .get_chapter(chapter.id)
        .await
        .expect_err("chapter is gone with its course");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn enrolled_students_lists_profile_references() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let other_course = seed_course(&services, trainer_id).await;
    let s1 = seed_student(&services, "s1@example.com", course_id).await;
    seed_student(&services, "s2@example.com", other_course).await;

    let enrolled = services
        .courses
        .enrolled_students(course_id)
        .await
        .expect("listing works");
    assert_eq!(enrolled, vec![s1]);

    let error = services
        .courses
        .enrolled_students(404)
        .await
        .expect_err("missing course");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn chapters_create_with_sessions_and_accept_edits() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;

    let chapter = services
        .syllabus
        .create_chapter(
            NewChapter::new(
                "Ownership",
                course_id,
                vec![
                    NewSession::new("Moves", "vids/moves").expect("valid session"),
                    NewSession::new("Borrows", "vids/borrows").expect("valid session"),
                ],
            )
            .expect("valid chapter"),
        )
        .await
        .expect("chapter creates");
    assert_eq!(chapter.sessions.len(), 2);

    let first_session = chapter.sessions[0].id;
    let updated = services
        .syllabus
        .update_chapter(
            chapter.id,
            ChapterPatch {
                chapter_name: Some("Ownership & Borrowing".to_owned()),
                sessions: Some(vec![SessionEdit {
                    id: first_session,
                    session_name: Some("Move Semantics".to_owned()),
                    session_link: None,
                }]),
                ..ChapterPatch::default()
            },
        )
        .await
        .expect("chapter updates");
    assert_eq!(updated.chapter_name, "Ownership & Borrowing");
    let renamed = updated
        .sessions
        .iter()
        .find(|session| session.id == first_session)
        .expect("session still present");
    assert_eq!(renamed.session_name, "Move Semantics");
    assert_eq!(renamed.session_link, "vids/moves");

    assert!(
        services
            .syllabus
            .delete_chapter(chapter.id)
            .await
            .expect("chapter deletes")
    );
    assert!(
        !services
            .syllabus
            .delete_chapter(chapter.id)
            .await
            .expect("outcome")
    );
}

#[tokio::test]
async fn chapter_creation_requires_an_existing_course() {
    let services = services();
    let error = services
        .syllabus
        .create_chapter(NewChapter::new("Orphan", 999, Vec::new()).expect("valid chapter"))
        .await
        .expect_err("unknown course is rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}
