//! Class-instance materialiser.
//!
//! Projects weekly assignments onto calendar dates: for every date in the
//! requested range that falls inside an active academic year and a session
//! and is not a holiday, each assignment whose slot weekday matches the date
//! (and which matches the requested scope) yields one `ClassInstance`.
//!
//! Materialisation is a pure function of repository state. Instances are
//! never persisted speculatively; the cache below only memoises results and
//! is dropped whenever the repository generation counter moves.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Datelike;
use parking_lot::RwLock;
use tracing::debug;

use crate::db::repository::{
    AssignmentRepository, EntityRepository, FullRepository, RepositoryResult,
};
use crate::models::{
    Assignment, ClassInstance, DateRange, GroupId, SlotId, StudentId, TeacherId, TimeSlot,
};

/// Which assignments a materialisation request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InstanceScope {
    All,
    Group(GroupId),
    Teacher(TeacherId),
    /// Resolved to the student's group.
    Student(StudentId),
}

/// Materialise the class instances for `range` and `scope`.
///
/// Output order is deterministic: ascending date, then slot grid position,
/// then assignment id.
pub async fn materialise<R: FullRepository>(
    repo: &R,
    range: DateRange,
    scope: InstanceScope,
) -> RepositoryResult<Vec<ClassInstance>> {
    let assignments = load_scoped_assignments(repo, scope).await?;
    let calendar = repo.academic_calendar().await?;
    let slots: HashMap<SlotId, TimeSlot> = repo
        .list_time_slots()
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    // Stable emission order within a date.
    let mut ordered: Vec<&Assignment> = assignments.iter().collect();
    ordered.sort_by_key(|a| {
        let grid = slots.get(&a.slot).map(|s| s.ordering_key());
        (grid, a.id)
    });

    let mut instances = Vec::new();
    for date in range.iter_days() {
        if !calendar.is_teaching_day(date) {
            continue;
        }
        for assignment in &ordered {
            let Some(slot) = slots.get(&assignment.slot) else {
                continue;
            };
            if slot.day == date.weekday() {
                instances.push(ClassInstance {
                    assignment: (*assignment).clone(),
                    date,
                });
            }
        }
    }

    debug!(
        count = instances.len(),
        from = %range.start,
        to = %range.end,
        "materialised class instances"
    );
    Ok(instances)
}

async fn load_scoped_assignments<R: FullRepository>(
    repo: &R,
    scope: InstanceScope,
) -> RepositoryResult<Vec<Assignment>> {
    match scope {
        InstanceScope::All => repo.assignments().await,
        InstanceScope::Group(group) => repo.assignments_for_group(group).await,
        InstanceScope::Teacher(teacher) => repo.assignments_for_teacher(teacher).await,
        InstanceScope::Student(student) => {
            let student = repo.student(student).await?;
            repo.assignments_for_group(student.group).await
        }
    }
}

/// Memo cache for materialised ranges, keyed by the repository generation.
///
/// Entries are shared (`Arc`) so repeated reads of a hot range clone a
/// pointer, not the instance list.
#[derive(Default)]
pub struct InstanceCache {
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    generation: u64,
    entries: HashMap<(DateRange, InstanceScope), Arc<Vec<ClassInstance>>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch from the cache, recomputing through `repo` on miss. A change in
    /// the repository generation invalidates every entry.
    pub async fn get_or_materialise<R: FullRepository>(
        &self,
        repo: &R,
        range: DateRange,
        scope: InstanceScope,
    ) -> RepositoryResult<Arc<Vec<ClassInstance>>> {
        let generation = repo.generation().await?;

        {
            let state = self.state.read();
            if state.generation == generation {
                if let Some(hit) = state.entries.get(&(range, scope)) {
                    return Ok(Arc::clone(hit));
                }
            }
        }

        let computed = Arc::new(materialise(repo, range, scope).await?);

        let mut state = self.state.write();
        if state.generation != generation {
            state.generation = generation;
            state.entries.clear();
        }
        state
            .entries
            .insert((range, scope), Arc::clone(&computed));
        Ok(computed)
    }
}

#[cfg(test)]
#[path = "instances_tests.rs"]
mod instances_tests;
