use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Weekday};

use super::*;
use crate::db::LocalRepository;
use crate::models::{
    AcademicSession, AcademicYear, AcademicYearId, Classroom, Course, CourseId, DateRange,
    EquipmentSet, GroupId, Holiday, HolidayId, RoomId, SessionId, SlotId, Student, StudentGroup,
    StudentId, Teacher, TeacherId, TimeSlot,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One group, two weekly classes (Mon 09:00 by teacher 1, Wed 10:00 by
/// teacher 2), autumn session from 2025-09-01, holiday week 2025-10-13.
async fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();

    repo.add_course(Course {
        id: CourseId::new(1),
        code: "CS101".to_string(),
        name: "Intro".to_string(),
        periods_per_week: 2,
        min_capacity: 1,
        max_students: 40,
        required_equipment: EquipmentSet::default(),
        department: "CS".to_string(),
    });
    repo.add_classroom(Classroom {
        id: RoomId::new(1),
        room_number: "A-1".to_string(),
        capacity: 40,
        building: "A".to_string(),
        equipment: EquipmentSet::default(),
    });
    for id in [1i64, 2] {
        repo.add_teacher(Teacher {
            id: TeacherId::new(id),
            name: format!("T{}", id),
            department: "CS".to_string(),
            qualifications: ["CS".to_string()].into_iter().collect(),
        });
    }
    repo.add_time_slot(TimeSlot {
        id: SlotId::new(1),
        day: Weekday::Mon,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        is_break: false,
    });
    repo.add_time_slot(TimeSlot {
        id: SlotId::new(2),
        day: Weekday::Wed,
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        is_break: false,
    });
    repo.add_student_group(
        StudentGroup {
            id: GroupId::new(1),
            name: "CS-1".to_string(),
            department: "CS".to_string(),
            year: 1,
            semester: 1,
        },
        &[CourseId::new(1)],
    );
    repo.add_student(Student {
        id: StudentId::new(1),
        name: "Sam".to_string(),
        group: GroupId::new(1),
    });

    let year = AcademicYearId::new(1);
    repo.add_academic_year(AcademicYear {
        id: year,
        name: "2025/26".to_string(),
        range: DateRange::new(date(2025, 8, 1), date(2026, 6, 1)),
        is_active: true,
    });
    repo.add_session(AcademicSession {
        id: SessionId::new(1),
        year,
        name: "Autumn".to_string(),
        range: DateRange::new(date(2025, 9, 1), date(2025, 12, 20)),
    });
    repo.add_holiday(Holiday {
        id: HolidayId::new(1),
        year,
        name: "Mid-term".to_string(),
        range: DateRange::new(date(2025, 10, 13), date(2025, 10, 18)),
    });

    use crate::db::AssignmentRepository;
    use crate::models::{Assignment, AssignmentId};
    repo.replace_assignments(
        &[GroupId::new(1)],
        vec![
            Assignment {
                id: AssignmentId::new(0),
                group: GroupId::new(1),
                course: CourseId::new(1),
                teacher: TeacherId::new(1),
                room: RoomId::new(1),
                slot: SlotId::new(1),
            },
            Assignment {
                id: AssignmentId::new(0),
                group: GroupId::new(1),
                course: CourseId::new(1),
                teacher: TeacherId::new(2),
                room: RoomId::new(1),
                slot: SlotId::new(2),
            },
        ],
    )
    .await
    .unwrap();

    repo
}

#[tokio::test]
async fn one_week_yields_one_instance_per_matching_weekday() {
    let repo = seeded_repo().await;
    // Week of Mon 2025-09-01: Monday and Wednesday classes.
    let range = DateRange::new(date(2025, 9, 1), date(2025, 9, 8));
    let instances = materialise(&repo, range, InstanceScope::All).await.unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].date, date(2025, 9, 1));
    assert_eq!(instances[0].assignment.slot, SlotId::new(1));
    assert_eq!(instances[1].date, date(2025, 9, 3));
}

#[tokio::test]
async fn holidays_are_skipped() {
    let repo = seeded_repo().await;
    // Holiday week: Mon 2025-10-13 through Fri 2025-10-17.
    let range = DateRange::new(date(2025, 10, 13), date(2025, 10, 20));
    let instances = materialise(&repo, range, InstanceScope::All).await.unwrap();
    assert!(instances.is_empty());

    // The following Monday is a class day again.
    let next = DateRange::new(date(2025, 10, 20), date(2025, 10, 21));
    let instances = materialise(&repo, next, InstanceScope::All).await.unwrap();
    assert_eq!(instances.len(), 1);
}

#[tokio::test]
async fn dates_outside_session_are_skipped() {
    let repo = seeded_repo().await;
    // August is inside the academic year but before the autumn session.
    let range = DateRange::new(date(2025, 8, 4), date(2025, 8, 11));
    let instances = materialise(&repo, range, InstanceScope::All).await.unwrap();
    assert!(instances.is_empty());
}

#[tokio::test]
async fn teacher_scope_filters_assignments() {
    let repo = seeded_repo().await;
    let range = DateRange::new(date(2025, 9, 1), date(2025, 9, 8));
    let instances = materialise(&repo, range, InstanceScope::Teacher(TeacherId::new(2)))
        .await
        .unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].assignment.teacher, TeacherId::new(2));
}

#[tokio::test]
async fn student_scope_resolves_to_group() {
    let repo = seeded_repo().await;
    let range = DateRange::new(date(2025, 9, 1), date(2025, 9, 8));
    let by_student = materialise(&repo, range, InstanceScope::Student(StudentId::new(1)))
        .await
        .unwrap();
    let by_group = materialise(&repo, range, InstanceScope::Group(GroupId::new(1)))
        .await
        .unwrap();
    assert_eq!(by_student, by_group);
    assert_eq!(by_student.len(), 2);
}

#[tokio::test]
async fn materialisation_is_idempotent() {
    let repo = seeded_repo().await;
    let range = DateRange::new(date(2025, 9, 1), date(2025, 9, 29));
    let first = materialise(&repo, range, InstanceScope::All).await.unwrap();
    let second = materialise(&repo, range, InstanceScope::All).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn cache_serves_hits_and_invalidates_on_generation_change() {
    let repo = seeded_repo().await;
    let cache = InstanceCache::new();
    let range = DateRange::new(date(2025, 9, 1), date(2025, 9, 8));

    let first = cache
        .get_or_materialise(&repo, range, InstanceScope::All)
        .await
        .unwrap();
    let second = cache
        .get_or_materialise(&repo, range, InstanceScope::All)
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second), "expected a cache hit");

    // Any repository mutation moves the generation and drops the cache.
    use crate::db::AssignmentRepository;
    repo.replace_assignments(&[GroupId::new(1)], vec![])
        .await
        .unwrap();
    let third = cache
        .get_or_materialise(&repo, range, InstanceScope::All)
        .await
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert!(third.is_empty());
}
