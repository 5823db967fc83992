//! In-memory store fixtures for behavioural tests.
//!
//! [`InMemoryStore`] implements every domain store port over a single mutex
//! of state, with the same observable semantics as the Diesel adapters:
//! every mutation validates completely before touching state, so a failed
//! call leaves nothing behind — the fixture equivalent of a rolled-back
//! transaction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::batch::{Batch, BatchDetail, BatchPatch, BatchSummary, NewBatch};
use crate::domain::course::{Course, CourseDetail, CoursePatch, CourseSummary, NewCourse};
use crate::domain::ports::{
    BatchStore, BatchStoreError, CourseStore, CourseStoreError, SyllabusStore, SyllabusStoreError,
    UserStore, UserStoreError,
};
use crate::domain::syllabus::{Chapter, ChapterPatch, NewChapter, Session};
use crate::domain::user::{
    Category, NewUser, ProfileData, ProfilePatch, StudentSummary, TrainerSummary, User, UserPatch,
};

struct StoredUser {
    user: User,
    #[expect(dead_code, reason = "credential is write-only, mirroring the schema")]
    credential: String,
}

#[derive(Default)]
struct State {
    next_id: i32,
    users: BTreeMap<i32, StoredUser>,
    courses: BTreeMap<i32, Course>,
    batches: BTreeMap<i32, Batch>,
    /// (batch_id, student_id) bridge pairs.
    enrollment: BTreeSet<(i32, i32)>,
    chapters: BTreeMap<i32, Chapter>,
}

impl State {
    fn alloc_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn is_trainer(&self, id: i32) -> bool {
        self.users
            .get(&id)
            .is_some_and(|stored| stored.user.category() == Category::Trainer)
    }

    fn is_student(&self, id: i32) -> bool {
        self.users
            .get(&id)
            .is_some_and(|stored| stored.user.category() == Category::Student)
    }

    fn missing_students(&self, ids: &[i32]) -> Vec<i32> {
        let mut missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !self.is_student(*id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    fn trainer_summary(&self, trainer_id: i32) -> Option<TrainerSummary> {
        let stored = self.users.get(&trainer_id)?;
        let ProfileData::Trainer { role } = stored.user.profile() else {
            return None;
        };
        Some(TrainerSummary {
            id: stored.user.id(),
            name: stored.user.name().to_owned(),
            email: stored.user.email().clone(),
            role: *role,
        })
    }

    fn student_summary(&self, student_id: i32) -> Option<StudentSummary> {
        let stored = self.users.get(&student_id)?;
        Some(StudentSummary {
            id: stored.user.id(),
            name: stored.user.name().to_owned(),
            email: stored.user.email().clone(),
            mobile: stored.user.mobile(),
        })
    }

    fn course_summary(&self, course_id: i32) -> Option<CourseSummary> {
        let course = self.courses.get(&course_id)?;
        Some(CourseSummary {
            id: course.id,
            course_name: course.course_name.clone(),
            total_price: course.total_price,
            discount_price: course.discount_price,
        })
    }

    fn batch_students(&self, batch_id: i32) -> Vec<i32> {
        self.enrollment
            .iter()
            .filter(|(b, _)| *b == batch_id)
            .map(|(_, s)| *s)
            .collect()
    }

    fn student_course_ids(&self, course_id: i32) -> Vec<i32> {
        self.users
            .values()
            .filter_map(|stored| match stored.user.profile() {
                ProfileData::Student { course_id: c, .. } if *c == course_id => {
                    Some(stored.user.id())
                }
                _ => None,
            })
            .collect()
    }
}

/// Shared in-memory implementation of every store port.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn course_detail(state: &State, course: &Course) -> Result<CourseDetail, CourseStoreError> {
    let trainer = state
        .trainer_summary(course.trainer_id)
        .ok_or_else(|| CourseStoreError::query("trainer row missing"))?;
    let enrolled_students = state
        .student_course_ids(course.id)
        .into_iter()
        .filter_map(|id| state.student_summary(id))
        .collect();
    Ok(CourseDetail {
        course: course.clone(),
        trainer,
        enrolled_students,
    })
}

fn batch_detail(state: &State, batch: &Batch) -> Result<BatchDetail, BatchStoreError> {
    let trainer = state
        .trainer_summary(batch.trainer_id)
        .ok_or_else(|| BatchStoreError::query("trainer row missing"))?;
    let course = state
        .course_summary(batch.course_id)
        .ok_or_else(|| BatchStoreError::query("course row missing"))?;
    let enrolled_students = state
        .batch_students(batch.id)
        .into_iter()
        .filter_map(|id| state.student_summary(id))
        .collect();
    Ok(BatchDetail {
        batch: batch.clone(),
        trainer,
        course,
        enrolled_students,
    })
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if state
            .users
            .values()
            .any(|stored| stored.user.email() == user.email())
        {
            return Err(UserStoreError::conflict("email already registered"));
        }
        if let ProfileData::Student { course_id, .. } = user.profile() {
            if !state.courses.contains_key(course_id) {
                return Err(UserStoreError::invalid_reference(format!(
                    "no course with id {course_id}"
                )));
            }
        }

        let id = state.alloc_id();
        let created = User::new(
            id,
            user.name().to_owned(),
            user.email().clone(),
            user.mobile(),
            user.profile().clone(),
        );
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                credential: user.credential().to_owned(),
            },
        );
        Ok(created)
    }

    async fn update(&self, id: i32, patch: UserPatch) -> Result<Option<User>, UserStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        let Some(category) = state.users.get(&id).map(|stored| stored.user.category()) else {
            return Ok(None);
        };

        if let Some(profile_patch) = &patch.profile {
            if profile_patch.category() != category {
                return Err(UserStoreError::invalid_reference(format!(
                    "category is immutable: user {id} has category {category}"
                )));
            }
            if let ProfilePatch::Student {
                course_id: Some(course_id),
                ..
            } = profile_patch
            {
                if !state.courses.contains_key(course_id) {
                    return Err(UserStoreError::invalid_reference(format!(
                        "no course with id {course_id}"
                    )));
                }
            }
        }
        if let Some(email) = &patch.email {
            if state
                .users
                .values()
                .any(|stored| stored.user.id() != id && stored.user.email() == email)
            {
                return Err(UserStoreError::conflict("email already registered"));
            }
        }

        let stored = state.users.get_mut(&id).expect("user checked above");
        let current = &stored.user;
        let name = patch.name.unwrap_or_else(|| current.name().to_owned());
        let email = patch.email.unwrap_or_else(|| current.email().clone());
        let mobile = patch.mobile.unwrap_or_else(|| current.mobile());
        let profile = match (patch.profile, current.profile().clone()) {
            (Some(ProfilePatch::Admin { role }), ProfileData::Admin { .. }) => {
                ProfileData::Admin { role }
            }
            (Some(ProfilePatch::Trainer { role }), ProfileData::Trainer { .. }) => {
                ProfileData::Trainer { role }
            }
            (
                Some(ProfilePatch::Student {
                    course_id,
                    learning_mode,
                    fee_detail,
                    payment_mode,
                }),
                ProfileData::Student {
                    course_id: current_course,
                    learning_mode: current_mode,
                    fee_detail: current_fee,
                    payment_mode: current_payment,
                },
            ) => ProfileData::Student {
                course_id: course_id.unwrap_or(current_course),
                learning_mode: learning_mode.unwrap_or(current_mode),
                fee_detail: fee_detail.unwrap_or(current_fee),
                payment_mode: payment_mode.unwrap_or(current_payment),
            },
            (_, profile) => profile,
        };
        if let Some(credential) = patch.credential {
            stored.credential = credential;
        }
        stored.user = User::new(id, name, email, mobile, profile);
        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, UserStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        let Some(category) = state.users.get(&id).map(|stored| stored.user.category()) else {
            return Ok(false);
        };

        match category {
            Category::Trainer => {
                let referenced = state
                    .courses
                    .values()
                    .any(|course| course.trainer_id == id)
                    || state.batches.values().any(|batch| batch.trainer_id == id);
                if referenced {
                    return Err(UserStoreError::conflict(format!(
                        "trainer {id} is still referenced by courses or batches"
                    )));
                }
            }
            Category::Student => {
                state.enrollment.retain(|(_, student_id)| *student_id != id);
            }
            Category::Admin => {}
        }

        state.users.remove(&id);
        Ok(true)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError> {
        let state = self.state.lock().expect("state poisoned");
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn list(&self, category: Option<Category>) -> Result<Vec<User>, UserStoreError> {
        let state = self.state.lock().expect("state poisoned");
        Ok(state
            .users
            .values()
            .filter(|stored| category.is_none_or(|c| stored.user.category() == c))
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<User>, UserStoreError> {
        let needle = query.to_lowercase();
        let state = self.state.lock().expect("state poisoned");
        Ok(state
            .users
            .values()
            .filter(|stored| {
                stored.user.name().to_lowercase().contains(&needle)
                    || stored
                        .user
                        .email()
                        .as_ref()
                        .to_lowercase()
                        .contains(&needle)
            })
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn replace_student_batches(
        &self,
        student_id: i32,
        batch_ids: Vec<i32>,
    ) -> Result<(), UserStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.is_student(student_id) {
            return Err(UserStoreError::not_found(format!(
                "no student with id {student_id}"
            )));
        }
        let mut missing: Vec<i32> = batch_ids
            .iter()
            .copied()
            .filter(|id| !state.batches.contains_key(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if !missing.is_empty() {
            return Err(UserStoreError::invalid_reference(format!(
                "ids do not resolve to batches: {missing:?}"
            )));
        }

        state.enrollment.retain(|(_, s)| *s != student_id);
        for batch_id in batch_ids {
            state.enrollment.insert((batch_id, student_id));
        }
        Ok(())
    }

    async fn batches_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<BatchSummary>, UserStoreError> {
        let state = self.state.lock().expect("state poisoned");
        Ok(state
            .enrollment
            .iter()
            .filter(|(_, s)| *s == student_id)
            .filter_map(|(batch_id, _)| state.batches.get(batch_id))
            .map(|batch| BatchSummary {
                id: batch.id,
                course_id: batch.course_id,
                batch_start_date: batch.batch_start_date,
                batch_end_date: batch.batch_end_date,
                batch_timings: batch.batch_timings.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn create(&self, course: NewCourse) -> Result<CourseDetail, CourseStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.is_trainer(course.trainer_id()) {
            return Err(CourseStoreError::invalid_reference(format!(
                "no trainer with id {}",
                course.trainer_id()
            )));
        }

        let id = state.alloc_id();
        let created = Course {
            id,
            course_name: course.course_name().to_owned(),
            trainer_id: course.trainer_id(),
            total_price: course.total_price(),
            discount_price: course.discount_price(),
            cover: course.cover().map(str::to_owned),
            availability: course.availability(),
            content: course.content().cloned(),
        };
        state.courses.insert(id, created.clone());
        course_detail(&state, &created)
    }

    async fn update(
        &self,
        id: i32,
        patch: CoursePatch,
    ) -> Result<Option<CourseDetail>, CourseStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.courses.contains_key(&id) {
            return Ok(None);
        }
        if let Some(trainer_id) = patch.trainer_id {
            if !state.is_trainer(trainer_id) {
                return Err(CourseStoreError::invalid_reference(format!(
                    "no trainer with id {trainer_id}"
                )));
            }
        }

        let course = state.courses.get_mut(&id).expect("course checked above");
        if let Some(course_name) = patch.course_name {
            course.course_name = course_name;
        }
        if let Some(trainer_id) = patch.trainer_id {
            course.trainer_id = trainer_id;
        }
        if let Some(total_price) = patch.total_price {
            course.total_price = total_price;
        }
        if let Some(discount_price) = patch.discount_price {
            course.discount_price = Some(discount_price);
        }
        if let Some(cover) = patch.cover {
            course.cover = Some(cover);
        }
        if let Some(availability) = patch.availability {
            course.availability = availability;
        }
        if let Some(content) = patch.content {
            course.content = Some(content);
        }

        let course = course.clone();
        course_detail(&state, &course).map(Some)
    }

    async fn delete(&self, id: i32) -> Result<bool, CourseStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.courses.contains_key(&id) {
            return Ok(false);
        }
        let referenced = state.batches.values().any(|batch| batch.course_id == id)
            || !state.student_course_ids(id).is_empty();
        if referenced {
            return Err(CourseStoreError::conflict(format!(
                "course {id} is still referenced by batches or student profiles"
            )));
        }

        state.chapters.retain(|_, chapter| chapter.course_id != id);
        state.courses.remove(&id);
        Ok(true)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CourseDetail>, CourseStoreError> {
        let state = self.state.lock().expect("state poisoned");
        match state.courses.get(&id) {
            Some(course) => course_detail(&state, course).map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<CourseDetail>, CourseStoreError> {
        let state = self.state.lock().expect("state poisoned");
        state
            .courses
            .values()
            .map(|course| course_detail(&state, course))
            .collect()
    }

    async fn enrolled_students(&self, course_id: i32) -> Result<Vec<i32>, CourseStoreError> {
        let state = self.state.lock().expect("state poisoned");
        if !state.courses.contains_key(&course_id) {
            return Err(CourseStoreError::not_found(format!(
                "no course with id {course_id}"
            )));
        }
        Ok(state.student_course_ids(course_id))
    }
}

#[async_trait]
impl BatchStore for InMemoryStore {
    async fn create(&self, batch: NewBatch) -> Result<BatchDetail, BatchStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.is_trainer(batch.trainer_id) {
            return Err(BatchStoreError::invalid_reference(format!(
                "no trainer with id {}",
                batch.trainer_id
            )));
        }
        if !state.courses.contains_key(&batch.course_id) {
            return Err(BatchStoreError::invalid_reference(format!(
                "no course with id {}",
                batch.course_id
            )));
        }
        let missing = state.missing_students(&batch.student_ids);
        if !missing.is_empty() {
            return Err(BatchStoreError::invalid_reference(format!(
                "ids do not resolve to students: {missing:?}"
            )));
        }

        let id = state.alloc_id();
        let created = Batch {
            id,
            trainer_id: batch.trainer_id,
            course_id: batch.course_id,
            cover: batch.cover,
            study_material: batch.study_material,
            batch_start_date: batch.batch_start_date,
            batch_end_date: batch.batch_end_date,
            batch_timings: batch.batch_timings,
        };
        state.batches.insert(id, created.clone());
        for student_id in &batch.student_ids {
            state.enrollment.insert((id, *student_id));
        }
        batch_detail(&state, &created)
    }

    async fn update(
        &self,
        id: i32,
        patch: BatchPatch,
    ) -> Result<Option<BatchDetail>, BatchStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.batches.contains_key(&id) {
            return Ok(None);
        }
        if let Some(trainer_id) = patch.trainer_id {
            if !state.is_trainer(trainer_id) {
                return Err(BatchStoreError::invalid_reference(format!(
                    "no trainer with id {trainer_id}"
                )));
            }
        }
        if let Some(course_id) = patch.course_id {
            if !state.courses.contains_key(&course_id) {
                return Err(BatchStoreError::invalid_reference(format!(
                    "no course with id {course_id}"
                )));
            }
        }
        if let Some(student_ids) = &patch.student_ids {
            let missing = state.missing_students(student_ids);
            if !missing.is_empty() {
                return Err(BatchStoreError::invalid_reference(format!(
                    "ids do not resolve to students: {missing:?}"
                )));
            }
        }

        let batch = state.batches.get_mut(&id).expect("batch checked above");
        if let Some(trainer_id) = patch.trainer_id {
            batch.trainer_id = trainer_id;
        }
        if let Some(course_id) = patch.course_id {
            batch.course_id = course_id;
        }
        if let Some(cover) = patch.cover {
            batch.cover = Some(cover);
        }
        if let Some(study_material) = patch.study_material {
            batch.study_material = Some(study_material);
        }
        if let Some(batch_start_date) = patch.batch_start_date {
            batch.batch_start_date = batch_start_date;
        }
        if let Some(batch_end_date) = patch.batch_end_date {
            batch.batch_end_date = batch_end_date;
        }
        if let Some(batch_timings) = patch.batch_timings {
            batch.batch_timings = Some(batch_timings);
        }
        let batch = batch.clone();

        if let Some(student_ids) = patch.student_ids {
            state.enrollment.retain(|(b, _)| *b != id);
            for student_id in student_ids {
                state.enrollment.insert((id, student_id));
            }
        }

        batch_detail(&state, &batch).map(Some)
    }

    async fn delete(&self, id: i32) -> Result<bool, BatchStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        state.enrollment.retain(|(b, _)| *b != id);
        Ok(state.batches.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BatchDetail>, BatchStoreError> {
        let state = self.state.lock().expect("state poisoned");
        match state.batches.get(&id) {
            Some(batch) => batch_detail(&state, batch).map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<BatchDetail>, BatchStoreError> {
        let state = self.state.lock().expect("state poisoned");
        state
            .batches
            .values()
            .map(|batch| batch_detail(&state, batch))
            .collect()
    }

    async fn set_enrollment(
        &self,
        batch_id: i32,
        student_ids: Vec<i32>,
    ) -> Result<(), BatchStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.batches.contains_key(&batch_id) {
            return Err(BatchStoreError::not_found(format!(
                "no batch with id {batch_id}"
            )));
        }
        let missing = state.missing_students(&student_ids);
        if !missing.is_empty() {
            return Err(BatchStoreError::invalid_reference(format!(
                "ids do not resolve to students: {missing:?}"
            )));
        }

        state.enrollment.retain(|(b, _)| *b != batch_id);
        for student_id in student_ids {
            state.enrollment.insert((batch_id, student_id));
        }
        Ok(())
    }
}

#[async_trait]
impl SyllabusStore for InMemoryStore {
    async fn create_chapter(&self, chapter: NewChapter) -> Result<Chapter, SyllabusStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.courses.contains_key(&chapter.course_id()) {
            return Err(SyllabusStoreError::invalid_reference(format!(
                "no course with id {}",
                chapter.course_id()
            )));
        }

        let id = state.alloc_id();
        let sessions = chapter
            .sessions()
            .iter()
            .map(|session| {
                let session_id = state.alloc_id();
                Session {
                    id: session_id,
                    session_name: session.session_name().to_owned(),
                    session_link: session.session_link().to_owned(),
                    chapter_id: id,
                }
            })
            .collect();
        let created = Chapter {
            id,
            chapter_name: chapter.chapter_name().to_owned(),
            course_id: chapter.course_id(),
            sessions,
        };
        state.chapters.insert(id, created.clone());
        Ok(created)
    }

    async fn update_chapter(
        &self,
        id: i32,
        patch: ChapterPatch,
    ) -> Result<Option<Chapter>, SyllabusStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        if !state.chapters.contains_key(&id) {
            return Ok(None);
        }
        if let Some(course_id) = patch.course_id {
            if !state.courses.contains_key(&course_id) {
                return Err(SyllabusStoreError::invalid_reference(format!(
                    "no course with id {course_id}"
                )));
            }
        }

        let chapter = state.chapters.get_mut(&id).expect("chapter checked above");
        if let Some(chapter_name) = patch.chapter_name {
            chapter.chapter_name = chapter_name;
        }
        if let Some(course_id) = patch.course_id {
            chapter.course_id = course_id;
        }
        if let Some(edits) = patch.sessions {
            for edit in edits {
                if let Some(session) = chapter
                    .sessions
                    .iter_mut()
                    .find(|session| session.id == edit.id)
                {
                    if let Some(session_name) = edit.session_name {
                        session.session_name = session_name;
                    }
                    if let Some(session_link) = edit.session_link {
                        session.session_link = session_link;
                    }
                }
            }
        }
        Ok(Some(chapter.clone()))
    }

    async fn delete_chapter(&self, id: i32) -> Result<bool, SyllabusStoreError> {
        let mut state = self.state.lock().expect("state poisoned");
        Ok(state.chapters.remove(&id).is_some())
    }

    async fn find_chapter(&self, id: i32) -> Result<Option<Chapter>, SyllabusStoreError> {
        let state = self.state.lock().expect("state poisoned");
        Ok(state.chapters.get(&id).cloned())
    }

    async fn list_chapters(&self) -> Result<Vec<Chapter>, SyllabusStoreError> {
        let state = self.state.lock().expect("state poisoned");
        Ok(state.chapters.values().cloned().collect())
    }
}
