//! Domain ports for the hexagonal boundary.

mod batch_store;
mod course_store;
mod syllabus_store;
mod user_store;

#[cfg(test)]
pub use batch_store::MockBatchStore;
pub use batch_store::{BatchStore, BatchStoreError};
#[cfg(test)]
pub use course_store::MockCourseStore;
pub use course_store::{CourseStore, CourseStoreError};
#[cfg(test)]
pub use syllabus_store::MockSyllabusStore;
pub use syllabus_store::{SyllabusStore, SyllabusStoreError};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{UserStore, UserStoreError};
