//! End-to-end scheduler behaviour through the facade: feasibility gating,
//! regeneration, materialisation and the global assignment invariants.

mod support;

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::Datelike;

use support::*;
use tas_rust::db::{AssignmentRepository, EntityRepository};
use tas_rust::models::{CourseId, DateRange, GroupId, SlotId};
use tas_rust::scheduler::{ExhaustedReason, ScheduleOutcome};
use tas_rust::services::feasibility::{EntityRef, Feasibility, InfeasibilityReason};
use tas_rust::services::instances::InstanceScope;

#[tokio::test]
async fn trivial_schedule_end_to_end() -> Result<()> {
    let core = trivial_campus();

    assert!(core.check_feasibility().await?.is_feasible());

    let outcome = core.regenerate(&[GroupId::new(1)], None).await?;
    assert_eq!(outcome, ScheduleOutcome::Scheduled { assignment_count: 1 });

    let range = DateRange::new(date(2025, 9, 1), date(2025, 9, 8));
    let instances = core.materialise_instances(range, InstanceScope::All).await?;
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].date, date(2025, 9, 1));
    assert_eq!(instances[0].assignment.course, CourseId::new(1));
    Ok(())
}

#[tokio::test]
async fn capacity_shortfall_fails_feasibility_before_generation() -> Result<()> {
    let core = trivial_campus();
    // Raise the course's capacity demand past the only room.
    core.repository().add_course(course(1, "CS101", 1, 40, "CS"));

    let verdict = core.check_feasibility().await?;
    assert_eq!(
        verdict,
        Feasibility::Infeasible {
            reason: InfeasibilityReason::NoRoomWithCapacity,
            entity: EntityRef::Course(CourseId::new(1)),
        }
    );

    // A caller ignoring the verdict still gets a clean failure.
    let outcome = core.regenerate(&[GroupId::new(1)], None).await?;
    assert_eq!(
        outcome,
        ScheduleOutcome::Unschedulable {
            group: GroupId::new(1),
            course: CourseId::new(1),
            reason: ExhaustedReason::NoRoomFits,
        }
    );
    assert_eq!(core.repository().assignment_count(), 0);
    Ok(())
}

#[tokio::test]
async fn busy_campus_upholds_global_invariants() -> Result<()> {
    let core = busy_campus();
    let outcome = core.regenerate(&all_groups(), None).await?;
    // 2 CS groups x 7 periods + 1 EE group x 5 periods.
    assert_eq!(
        outcome,
        ScheduleOutcome::Scheduled {
            assignment_count: 19
        }
    );

    let repo = core.repository();
    let assignments = repo.assignments().await?;
    let slots: HashMap<SlotId, _> = repo
        .list_time_slots()
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut by_room = HashSet::new();
    let mut by_teacher = HashSet::new();
    let mut by_group = HashSet::new();
    for a in &assignments {
        assert!(by_room.insert((a.slot, a.room)), "room clash");
        assert!(by_teacher.insert((a.slot, a.teacher)), "teacher clash");
        assert!(by_group.insert((a.slot, a.group)), "group clash");
        assert!(!slots[&a.slot].is_break, "break slot used");

        let course = repo.course(a.course).await?;
        let room = repo.classroom(a.room).await?;
        assert!(room.capacity >= course.min_capacity);
        assert!(room.equipment.covers(&course.required_equipment));

        let teacher = repo.teacher(a.teacher).await?;
        assert!(teacher.is_eligible_for(&course));
    }

    // Exactly periods-per-week placements for every (group, course).
    for group_id in all_groups() {
        for course in repo.courses_for_group(group_id).await? {
            let placed = assignments
                .iter()
                .filter(|a| a.group == group_id && a.course == course.id)
                .count();
            assert_eq!(placed, usize::from(course.periods_per_week));
        }
    }
    Ok(())
}

#[tokio::test]
async fn regeneration_is_deterministic() -> Result<()> {
    let normalise = |assignments: &[tas_rust::models::Assignment]| {
        let mut rows: Vec<_> = assignments
            .iter()
            .map(|a| (a.group, a.course, a.teacher, a.room, a.slot))
            .collect();
        rows.sort();
        rows
    };

    let core_a = busy_campus();
    let core_b = busy_campus();
    core_a.regenerate(&all_groups(), None).await?;
    core_b.regenerate(&all_groups(), None).await?;

    let rows_a = normalise(&core_a.repository().assignments().await?);
    let rows_b = normalise(&core_b.repository().assignments().await?);
    assert_eq!(rows_a, rows_b);

    // Regenerating in place reproduces the same schedule.
    core_a.regenerate(&all_groups(), None).await?;
    let rows_again = normalise(&core_a.repository().assignments().await?);
    assert_eq!(rows_a, rows_again);
    Ok(())
}

#[tokio::test]
async fn materialised_instances_respect_calendar_and_weekday() -> Result<()> {
    let core = busy_campus();
    core.regenerate(&all_groups(), None).await?;

    let repo = core.repository();
    let calendar = repo.academic_calendar().await?;
    let slots: HashMap<SlotId, _> = repo
        .list_time_slots()
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    // A range spanning the mid-term holiday week.
    let range = DateRange::new(date(2025, 10, 6), date(2025, 10, 27));
    let instances = core.materialise_instances(range, InstanceScope::All).await?;
    assert!(!instances.is_empty());

    for instance in &instances {
        assert!(calendar.holiday_for(instance.date).is_none());
        assert!(calendar.session_for(instance.date).is_some());
        assert_eq!(slots[&instance.assignment.slot].day, instance.date.weekday());
    }

    // Re-materialisation yields equal output.
    let again = core.materialise_instances(range, InstanceScope::All).await?;
    assert_eq!(instances, again);
    Ok(())
}

#[tokio::test]
async fn partial_regeneration_preserves_other_groups() -> Result<()> {
    let core = busy_campus();
    core.regenerate(&all_groups(), None).await?;
    let before = core.repository().assignments_for_group(GroupId::new(3)).await?;

    core.regenerate(&[GroupId::new(1)], None).await?;
    let after = core.repository().assignments_for_group(GroupId::new(3)).await?;
    assert_eq!(before, after);
    Ok(())
}
