//! Feasibility analyser for timetable generation.
//!
//! Runs a fixed sequence of necessary-condition checks over the entity corpus
//! and reports the first failure. The analyser never attempts a real
//! assignment: a `Feasible` verdict means "may be schedulable" and callers
//! must still handle search failure.
//!
//! Check order (short-circuiting):
//! 1. Resource census (courses, classrooms, teachers, time slots, groups)
//! 2. Group/course coverage
//! 3. Capacity feasibility per assigned course
//! 4. Equipment feasibility per assigned course
//! 5. Qualification feasibility per assigned course
//! 6. Global slot budget
//! 7. Per-group slot budget

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::db::repository::{EntityRepository, FullRepository, RepositoryResult};
use crate::models::{Course, CourseId, GroupId};

/// Reference to the entity that caused an infeasibility verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EntityRef {
    Course(CourseId),
    Group(GroupId),
    /// Corpus-wide failures (empty resource classes, global budget).
    Corpus,
}

/// Why generation cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InfeasibilityReason {
    NoCourses,
    NoClassrooms,
    NoTeachers,
    NoTimeSlots,
    NoStudentGroups,
    GroupWithoutCourses,
    NoRoomWithCapacity,
    NoRoomWithEquipment,
    NoEligibleTeacher,
    SlotBudgetExceeded { required: u32, available: u32 },
    GroupBudgetExceeded { required: u32, available: u32 },
}

impl std::fmt::Display for InfeasibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCourses => write!(f, "no courses defined"),
            Self::NoClassrooms => write!(f, "no classrooms defined"),
            Self::NoTeachers => write!(f, "no teachers defined"),
            Self::NoTimeSlots => write!(f, "no time slots defined"),
            Self::NoStudentGroups => write!(f, "no student groups defined"),
            Self::GroupWithoutCourses => write!(f, "group has no courses assigned"),
            Self::NoRoomWithCapacity => write!(f, "no classroom satisfies the capacity requirement"),
            Self::NoRoomWithEquipment => {
                write!(f, "no classroom satisfies the equipment requirement")
            }
            Self::NoEligibleTeacher => write!(f, "no eligible teacher exists"),
            Self::SlotBudgetExceeded {
                required,
                available,
            } => write!(
                f,
                "required periods ({}) exceed the global slot budget ({})",
                required, available
            ),
            Self::GroupBudgetExceeded {
                required,
                available,
            } => write!(
                f,
                "group needs {} periods but only {} non-break slots exist",
                required, available
            ),
        }
    }
}

/// Analyser verdict.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Feasibility {
    Feasible,
    Infeasible {
        reason: InfeasibilityReason,
        entity: EntityRef,
    },
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible)
    }

    fn infeasible(reason: InfeasibilityReason, entity: EntityRef) -> Self {
        Feasibility::Infeasible { reason, entity }
    }
}

/// Run the full analyser over the current repository state.
pub async fn check<R: FullRepository>(repo: &R) -> RepositoryResult<Feasibility> {
    let courses = repo.list_courses().await?;
    let classrooms = repo.list_classrooms().await?;
    let teachers = repo.list_teachers().await?;
    let time_slots = repo.list_time_slots().await?;
    let mut groups = repo.list_student_groups().await?;
    groups.sort_by_key(|g| g.id);

    // 1. Resource census.
    if courses.is_empty() {
        return verdict(Feasibility::infeasible(
            InfeasibilityReason::NoCourses,
            EntityRef::Corpus,
        ));
    }
    if classrooms.is_empty() {
        return verdict(Feasibility::infeasible(
            InfeasibilityReason::NoClassrooms,
            EntityRef::Corpus,
        ));
    }
    if teachers.is_empty() {
        return verdict(Feasibility::infeasible(
            InfeasibilityReason::NoTeachers,
            EntityRef::Corpus,
        ));
    }
    if time_slots.is_empty() {
        return verdict(Feasibility::infeasible(
            InfeasibilityReason::NoTimeSlots,
            EntityRef::Corpus,
        ));
    }
    if groups.is_empty() {
        return verdict(Feasibility::infeasible(
            InfeasibilityReason::NoStudentGroups,
            EntityRef::Corpus,
        ));
    }

    // 2. Group/course coverage, collecting the assigned-course corpus for the
    // per-course checks below. Only courses some group actually takes need a
    // room or a teacher.
    let mut group_loads: Vec<(GroupId, Vec<Course>)> = Vec::with_capacity(groups.len());
    let mut assigned: BTreeMap<CourseId, Course> = BTreeMap::new();
    for group in &groups {
        let group_courses = repo.courses_for_group(group.id).await?;
        if group_courses.is_empty() {
            return verdict(Feasibility::infeasible(
                InfeasibilityReason::GroupWithoutCourses,
                EntityRef::Group(group.id),
            ));
        }
        for course in &group_courses {
            assigned.entry(course.id).or_insert_with(|| course.clone());
        }
        group_loads.push((group.id, group_courses));
    }

    // 3-5. Per-course resource checks, in assigned-course id order.
    for course in assigned.values() {
        if !classrooms
            .iter()
            .any(|room| room.capacity >= course.min_capacity)
        {
            return verdict(Feasibility::infeasible(
                InfeasibilityReason::NoRoomWithCapacity,
                EntityRef::Course(course.id),
            ));
        }
        if !classrooms.iter().any(|room| room.suits(course)) {
            return verdict(Feasibility::infeasible(
                InfeasibilityReason::NoRoomWithEquipment,
                EntityRef::Course(course.id),
            ));
        }
        if !teachers.iter().any(|t| t.is_eligible_for(course)) {
            return verdict(Feasibility::infeasible(
                InfeasibilityReason::NoEligibleTeacher,
                EntityRef::Course(course.id),
            ));
        }
    }

    let schedulable_slots = time_slots.iter().filter(|s| !s.is_break).count() as u32;

    // 6. Global slot budget over every (group, course) pair.
    let total_required: u32 = group_loads
        .iter()
        .flat_map(|(_, cs)| cs.iter())
        .map(|c| u32::from(c.periods_per_week))
        .sum();
    let total_available = schedulable_slots * groups.len() as u32;
    if total_required > total_available {
        return verdict(Feasibility::infeasible(
            InfeasibilityReason::SlotBudgetExceeded {
                required: total_required,
                available: total_available,
            },
            EntityRef::Corpus,
        ));
    }

    // 7. Per-group budget (tighter than the global check).
    for (group_id, group_courses) in &group_loads {
        let required: u32 = group_courses
            .iter()
            .map(|c| u32::from(c.periods_per_week))
            .sum();
        if required > schedulable_slots {
            return verdict(Feasibility::infeasible(
                InfeasibilityReason::GroupBudgetExceeded {
                    required,
                    available: schedulable_slots,
                },
                EntityRef::Group(*group_id),
            ));
        }
        debug!(group = %group_id, required, schedulable_slots, "group budget ok");
    }

    verdict(Feasibility::Feasible)
}

fn verdict(feasibility: Feasibility) -> RepositoryResult<Feasibility> {
    match &feasibility {
        Feasibility::Feasible => info!("feasibility check passed"),
        Feasibility::Infeasible { reason, entity } => {
            info!(%reason, ?entity, "feasibility check failed")
        }
    }
    Ok(feasibility)
}

#[cfg(test)]
#[path = "feasibility_tests.rs"]
mod feasibility_tests;
