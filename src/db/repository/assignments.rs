//! Assignment repository trait: scheduler output storage.
//!
//! Assignments are written only through [`replace_assignments`], the port's
//! transactional unit: the old set for the named groups and the new set swap
//! atomically, so readers never observe a partial regeneration.
//!
//! [`replace_assignments`]: AssignmentRepository::replace_assignments

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Assignment, AssignmentId, GroupId, TeacherId};

/// Storage for generated timetable assignments.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Get a single assignment by ID.
    ///
    /// Returns `NotFound` if no such assignment exists.
    async fn assignment(&self, id: AssignmentId) -> RepositoryResult<Assignment>;

    /// All current assignments.
    async fn assignments(&self) -> RepositoryResult<Vec<Assignment>>;

    /// Assignments belonging to one student group.
    async fn assignments_for_group(&self, group: GroupId) -> RepositoryResult<Vec<Assignment>>;

    /// Assignments taught by one teacher.
    async fn assignments_for_teacher(&self, teacher: TeacherId)
        -> RepositoryResult<Vec<Assignment>>;

    /// Atomically replace the assignments of the named groups.
    ///
    /// Every existing assignment whose group is in `groups` is removed and
    /// `assignments` installed in its place, in one transactional unit.
    /// Incoming ids are ignored; the repository allocates fresh ids. The
    /// generation counter is bumped on success.
    ///
    /// # Returns
    /// The number of assignments installed.
    async fn replace_assignments(
        &self,
        groups: &[GroupId],
        assignments: Vec<Assignment>,
    ) -> RepositoryResult<usize>;

    /// Monotonic counter bumped whenever entities or assignments change.
    ///
    /// In-process caches key their contents on this value and drop them when
    /// it moves.
    async fn generation(&self) -> RepositoryResult<u64>;
}
