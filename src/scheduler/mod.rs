//! Constraint-satisfaction timetable scheduler.
//!
//! Entry point is [`regenerate`]: load the entity snapshot for the requested
//! groups, run the deterministic back-tracking search, and commit the result
//! through the repository's transactional unit. On any non-success outcome
//! the repository is left untouched.
//!
//! Regeneration is CPU-bound and must not interleave with another
//! regeneration over overlapping groups; the facade serialises calls.

pub mod search;

use std::collections::HashSet;
use std::time::Instant;

use tracing::{info, warn};

use crate::db::repository::{
    AssignmentRepository, EntityRepository, FullRepository, RepositoryResult,
};
use crate::models::{Assignment, AssignmentId, CourseId, GroupId};

pub use search::{DraftAssignment, ExhaustedReason, PartialReport, SearchInput, SearchOutcome};

/// Result of a regeneration run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    /// The full period count of every requested group was placed and
    /// committed.
    Scheduled { assignment_count: usize },
    /// The search space is exhausted; nothing was committed.
    Unschedulable {
        group: GroupId,
        course: CourseId,
        reason: ExhaustedReason,
    },
    /// The deadline expired mid-search; nothing was committed.
    TimedOut(PartialReport),
}

/// Regenerate the timetables of `group_ids`.
///
/// Existing assignments of groups outside the set are honoured as fixed
/// occupancy. On success the new assignment set atomically replaces the old
/// one for exactly these groups.
///
/// # Arguments
/// * `group_ids` - Groups to regenerate; duplicates are ignored
/// * `deadline` - Optional wall-clock bound for the search
pub async fn regenerate<R: FullRepository>(
    repo: &R,
    group_ids: &[GroupId],
    deadline: Option<Instant>,
) -> RepositoryResult<ScheduleOutcome> {
    let mut seen = HashSet::new();
    let touched: Vec<GroupId> = group_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let mut groups = Vec::with_capacity(touched.len());
    for id in &touched {
        let group = repo.student_group(*id).await?;
        let courses = repo.courses_for_group(*id).await?;
        groups.push((group, courses));
    }

    let slots = repo.list_time_slots().await?;
    let rooms = repo.list_classrooms().await?;
    let teachers = repo.list_teachers().await?;

    let touched_set: HashSet<GroupId> = touched.iter().copied().collect();
    let existing: Vec<Assignment> = repo
        .assignments()
        .await?
        .into_iter()
        .filter(|a| !touched_set.contains(&a.group))
        .collect();

    let input = SearchInput {
        groups,
        slots,
        rooms,
        teachers,
        existing,
    };

    info!(groups = touched.len(), "starting timetable regeneration");
    match search::solve(&input, deadline) {
        SearchOutcome::Complete(drafts) => {
            let assignments: Vec<Assignment> = drafts
                .into_iter()
                .map(|d| Assignment {
                    id: AssignmentId::new(0),
                    group: d.group,
                    course: d.course,
                    teacher: d.teacher,
                    room: d.room,
                    slot: d.slot,
                })
                .collect();
            let assignment_count = repo.replace_assignments(&touched, assignments).await?;
            info!(assignment_count, "regeneration committed");
            Ok(ScheduleOutcome::Scheduled { assignment_count })
        }
        SearchOutcome::Exhausted {
            group,
            course,
            reason,
        } => {
            warn!(%group, %course, %reason, "regeneration unschedulable");
            Ok(ScheduleOutcome::Unschedulable {
                group,
                course,
                reason,
            })
        }
        SearchOutcome::DeadlineExpired(report) => {
            warn!(
                placed = report.periods_placed,
                required = report.periods_required,
                "regeneration deadline expired"
            );
            Ok(ScheduleOutcome::TimedOut(report))
        }
    }
}
