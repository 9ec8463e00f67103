//! Entity repository trait: read access to externally managed records.
//!
//! The core never creates or edits courses, teachers, classrooms, slots,
//! groups, students or the academic calendar; those are owned by the
//! surrounding application. This trait is the read side of the port.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    AcademicCalendar, Classroom, Course, CourseId, GroupId, RoomId, SlotId, Student, StudentGroup,
    StudentId, Teacher, TeacherId, TimeSlot,
};

/// Read-only access to entity records.
///
/// By-id lookups return `RepositoryError::NotFound` on a miss; listings
/// return entities in no particular order (callers sort as needed).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Check if the backing store is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== By-id lookups ====================

    async fn course(&self, id: CourseId) -> RepositoryResult<Course>;

    async fn teacher(&self, id: TeacherId) -> RepositoryResult<Teacher>;

    async fn classroom(&self, id: RoomId) -> RepositoryResult<Classroom>;

    async fn time_slot(&self, id: SlotId) -> RepositoryResult<TimeSlot>;

    async fn student_group(&self, id: GroupId) -> RepositoryResult<StudentGroup>;

    async fn student(&self, id: StudentId) -> RepositoryResult<Student>;

    // ==================== Listings ====================

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>>;

    async fn list_teachers(&self) -> RepositoryResult<Vec<crate::models::Teacher>>;

    async fn list_classrooms(&self) -> RepositoryResult<Vec<Classroom>>;

    async fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>>;

    async fn list_student_groups(&self) -> RepositoryResult<Vec<StudentGroup>>;

    /// Courses assigned to a student group, in no particular order.
    ///
    /// Returns `NotFound` if the group does not exist.
    async fn courses_for_group(&self, group: GroupId) -> RepositoryResult<Vec<Course>>;

    /// Students belonging to a group.
    ///
    /// Returns `NotFound` if the group does not exist.
    async fn students_in_group(&self, group: GroupId) -> RepositoryResult<Vec<Student>>;

    /// A snapshot of academic years, sessions and holidays.
    async fn academic_calendar(&self) -> RepositoryResult<AcademicCalendar>;
}
