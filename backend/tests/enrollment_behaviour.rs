//! Behavioural tests for the enrollment bridge: replace-set semantics,
//! idempotency, and rollback of batch writes on invalid references.

mod support;

use academy_backend::domain::ErrorCode;
use support::{
    batch_command, batch_members, seed_batch, seed_course, seed_student, seed_trainer, services,
};

#[tokio::test]
async fn replacing_with_an_empty_set_is_idempotent() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;
    let batch_id = seed_batch(&services, trainer_id, course_id, vec![student_id]).await;

    services
        .batches
        .set_enrollment(batch_id, Vec::new())
        .await
        .expect("first clear succeeds");
    assert!(batch_members(&services, batch_id).await.is_empty());

    services
        .batches
        .set_enrollment(batch_id, Vec::new())
        .await
        .expect("second clear succeeds");
    assert!(batch_members(&services, batch_id).await.is_empty());
}

#[tokio::test]
async fn replacement_is_the_complete_new_set() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let s1 = seed_student(&services, "s1@example.com", course_id).await;
    let s2 = seed_student(&services, "s2@example.com", course_id).await;
    let s3 = seed_student(&services, "s3@example.com", course_id).await;
    let batch_id = seed_batch(&services, trainer_id, course_id, Vec::new()).await;

    services
        .batches
        .set_enrollment(batch_id, vec![s1, s2])
        .await
        .expect("first set succeeds");
    assert_eq!(batch_members(&services, batch_id).await, vec![s1, s2]);

    services
        .batches
        .set_enrollment(batch_id, vec![s2, s3])
        .await
        .expect("second set succeeds");
    // s1 is removed, s3 is added, s2 persists.
    assert_eq!(batch_members(&services, batch_id).await, vec![s2, s3]);
}

#[tokio::test]
async fn duplicate_ids_collapse_to_one_membership_row() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;
    let batch_id = seed_batch(&services, trainer_id, course_id, Vec::new()).await;

    services
        .batches
        .set_enrollment(batch_id, vec![student_id, student_id])
        .await
        .expect("set succeeds");
    assert_eq!(batch_members(&services, batch_id).await, vec![student_id]);
}

#[tokio::test]
async fn non_student_ids_abort_the_replacement() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;
    let batch_id = seed_batch(&services, trainer_id, course_id, vec![student_id]).await;

    let error = services
        .batches
        .set_enrollment(batch_id, vec![student_id, trainer_id])
        .await
        .expect_err("trainer id is not a student");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    // The failed replacement changed nothing.
    assert_eq!(batch_members(&services, batch_id).await, vec![student_id]);
}

#[tokio::test]
async fn batch_creation_with_a_non_trainer_persists_nothing() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;

    let error = services
        .batches
        .create_batch(batch_command(student_id, course_id, Vec::new()))
        .await
        .expect_err("students cannot own batches");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let batches = services.batches.list_batches().await.expect("listing works");
    assert!(batches.is_empty());
}

#[tokio::test]
async fn batch_creation_with_an_invalid_student_rolls_back_the_batch() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;

    let error = services
        .batches
        .create_batch(batch_command(trainer_id, course_id, vec![student_id, 999]))
        .await
        .expect_err("unknown student id is rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    // No orphan batch without its intended enrollment state.
    let batches = services.batches.list_batches().await.expect("listing works");
    assert!(batches.is_empty());
}

#[tokio::test]
async fn enrollment_on_a_missing_batch_is_not_found() {
    let services = services();
    let error = services
        .batches
        .set_enrollment(404, Vec::new())
        .await
        .expect_err("missing batch");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn student_side_assignment_replaces_the_batch_set() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;
    let b1 = seed_batch(&services, trainer_id, course_id, vec![student_id]).await;
    let b2 = seed_batch(&services, trainer_id, course_id, Vec::new()).await;

    services
        .users
        .assign_batches(student_id, vec![b2])
        .await
        .expect("assignment succeeds");

    let batches = services
        .users
        .student_batches(student_id)
        .await
        .expect("listing works");
    let ids: Vec<i32> = batches.iter().map(|batch| batch.id).collect();
    assert_eq!(ids, vec![b2]);
    assert!(batch_members(&services, b1).await.is_empty());
}

#[tokio::test]
async fn student_side_assignment_rejects_unknown_batches() {
    let services = services();
    let trainer_id = seed_trainer(&services, "tina@example.com").await;
    let course_id = seed_course(&services, trainer_id).await;
    let student_id = seed_student(&services, "sam@example.com", course_id).await;

    let error = services
        .users
        .assign_batches(student_id, vec![404])
        .await
        .expect_err("unknown batch id is rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let batches = services
        .users
        .student_batches(student_id)
        .await
        .expect("listing works");
    assert!(batches.is_empty());
}
