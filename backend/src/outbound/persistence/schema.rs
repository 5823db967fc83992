//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! Diesel uses them for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// User accounts.
    ///
    /// `email` carries a unique constraint; `category` selects which profile
    /// table owns the 1:1 row for this user.
    users (id) {
        id -> Int4,
        name -> Varchar,
        email -> Varchar,
        password -> Varchar,
        mobile -> Int8,
        category -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// 1:1 profile rows for users with category Admin.
    admin_profiles (id) {
        id -> Int4,
        user_id -> Int4,
        role -> Varchar,
    }
}

diesel::table! {
    /// 1:1 profile rows for users with category Trainer.
    trainer_profiles (id) {
        id -> Int4,
        user_id -> Int4,
        role -> Varchar,
    }
}

diesel::table! {
    /// 1:1 profile rows for users with category Student.
    student_profiles (id) {
        id -> Int4,
        user_id -> Int4,
        course_id -> Int4,
        learning_mode -> Varchar,
        fee_detail -> Varchar,
        payment_mode -> Varchar,
    }
}

diesel::table! {
    /// Courses offered by trainers.
    ///
    /// `available_from`/`available_to` are both set iff `availability_type`
    /// is `timebound`; `item_type`/`item_url` are both set or both absent.
    courses (id) {
        id -> Int4,
        course_name -> Varchar,
        trainer_id -> Int4,
        total_price -> Numeric,
        discount_price -> Nullable<Numeric>,
        course_cover -> Nullable<Text>,
        availability_type -> Varchar,
        available_from -> Nullable<Timestamptz>,
        available_to -> Nullable<Timestamptz>,
        item_type -> Nullable<Varchar>,
        item_url -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Scheduled batches of a course.
    batches (id) {
        id -> Int4,
        cover_image -> Nullable<Text>,
        trainer_id -> Int4,
        course_id -> Int4,
        study_material -> Nullable<Varchar>,
        batch_start_date -> Date,
        batch_end_date -> Date,
        batch_timings -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Bridge relation for the Batch <-> Student many-to-many.
    ///
    /// (batch_id, student_id) carries a composite unique constraint;
    /// membership is always replaced wholesale, never patched row by row.
    batch_students (id) {
        id -> Int4,
        batch_id -> Int4,
        student_id -> Int4,
    }
}

diesel::table! {
    /// Chapters of a course syllabus.
    chapters (id) {
        id -> Int4,
        chapter_name -> Varchar,
        course_id -> Int4,
    }
}

diesel::table! {
    /// Teaching sessions inside a chapter.
    sessions (id) {
        id -> Int4,
        session_name -> Varchar,
        session_link -> Varchar,
        chapter_id -> Int4,
    }
}

diesel::joinable!(admin_profiles -> users (user_id));
diesel::joinable!(trainer_profiles -> users (user_id));
diesel::joinable!(student_profiles -> users (user_id));
diesel::joinable!(batch_students -> batches (batch_id));
diesel::joinable!(batch_students -> users (student_id));
diesel::joinable!(batches -> courses (course_id));
diesel::joinable!(sessions -> chapters (chapter_id));
diesel::joinable!(chapters -> courses (course_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    admin_profiles,
    trainer_profiles,
    student_profiles,
    courses,
    batches,
    batch_students,
    chapters,
    sessions,
);
