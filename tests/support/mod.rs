//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Weekday};

use tas_rust::config::CoreConfig;
use tas_rust::db::LocalRepository;
use tas_rust::models::{
    AcademicSession, AcademicYear, AcademicYearId, Classroom, Course, CourseId, DateRange,
    EquipmentSet, GroupId, Holiday, HolidayId, RoomId, SessionId, SlotId, Student, StudentGroup,
    StudentId, Teacher, TeacherId, TimeSlot,
};
use tas_rust::TimetableCore;

/// Route core tracing output through the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn course(id: i64, code: &str, periods: u8, min_capacity: u32, department: &str) -> Course {
    Course {
        id: CourseId::new(id),
        code: code.to_string(),
        name: format!("Course {}", code),
        periods_per_week: periods,
        min_capacity,
        max_students: 60,
        required_equipment: EquipmentSet::default(),
        department: department.to_string(),
    }
}

pub fn classroom(id: i64, capacity: u32, equipment: &[&str]) -> Classroom {
    Classroom {
        id: RoomId::new(id),
        room_number: format!("R-{}", id),
        capacity,
        building: "Main".to_string(),
        equipment: EquipmentSet::new(equipment.iter().copied()),
    }
}

pub fn teacher(id: i64, department: &str, qualifications: &[&str]) -> Teacher {
    Teacher {
        id: TeacherId::new(id),
        name: format!("Teacher {}", id),
        department: department.to_string(),
        qualifications: qualifications
            .iter()
            .map(|q| q.to_string())
            .collect::<BTreeSet<String>>(),
    }
}

pub fn slot(id: i64, day: Weekday, hour: u32, minute: u32, is_break: bool) -> TimeSlot {
    TimeSlot {
        id: SlotId::new(id),
        day,
        start_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(hour + 1, minute, 0).unwrap(),
        is_break,
    }
}

pub fn group(id: i64, department: &str) -> StudentGroup {
    StudentGroup {
        id: GroupId::new(id),
        name: format!("{}-{}", department, id),
        department: department.to_string(),
        year: 1,
        semester: 1,
    }
}

pub fn student(id: i64, group: i64) -> Student {
    Student {
        id: StudentId::new(id),
        name: format!("Student {}", id),
        group: GroupId::new(group),
    }
}

/// Installs the 2025/26 academic year with an autumn session starting
/// 2025-09-01 and a one-week holiday from 2025-10-13.
pub fn seed_calendar(repo: &LocalRepository) {
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
        name: "Mid-term break".to_string(),
        range: DateRange::new(date(2025, 10, 13), date(2025, 10, 18)),
    });
}

/// The minimal viable campus of the trivial-schedule scenario: one group,
/// one single-period course, one slot (Mon 09:00), one room, one teacher,
/// three enrolled students.
pub fn trivial_campus() -> TimetableCore<LocalRepository> {
    init_tracing();
    let repo = LocalRepository::new();
    repo.add_course(course(1, "CS101", 1, 1, "CS"));
    repo.add_classroom(classroom(1, 30, &[]));
    repo.add_teacher(teacher(1, "CS", &["CS"]));
    repo.add_time_slot(slot(1, Weekday::Mon, 9, 0, false));
    repo.add_student_group(group(1, "CS"), &[CourseId::new(1)]);
    for id in [1, 2, 3] {
        repo.add_student(student(id, 1));
    }
    seed_calendar(&repo);
    TimetableCore::new(Arc::new(repo), CoreConfig::default())
}

/// A fuller campus: two departments, three groups, shared lab resources.
pub fn busy_campus() -> TimetableCore<LocalRepository> {
    init_tracing();
    let repo = LocalRepository::new();

    repo.add_course(course(1, "CS101", 3, 20, "CS"));
    repo.add_course(course(2, "CS102", 2, 20, "CS"));
    let mut lab = course(3, "CS110L", 2, 20, "CS");
    lab.required_equipment = EquipmentSet::new(["computer"]);
    repo.add_course(lab);
    repo.add_course(course(4, "EE101", 3, 25, "EE"));
    repo.add_course(course(5, "EE120", 2, 25, "EE"));

    repo.add_classroom(classroom(1, 30, &["whiteboard"]));
    repo.add_classroom(classroom(2, 40, &["smart-whiteboard"]));
    repo.add_classroom(classroom(3, 25, &["computer lab", "projector"]));

    repo.add_teacher(teacher(1, "CS", &["CS"]));
    repo.add_teacher(teacher(2, "CS", &["CS"]));
    repo.add_teacher(teacher(3, "EE", &["EE"]));
    repo.add_teacher(teacher(4, "Admin", &[]));

    let mut slot_id = 0i64;
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        for hour in [9u32, 10, 11, 14] {
            slot_id += 1;
            repo.add_time_slot(slot(slot_id, day, hour, 0, false));
        }
        // Lunch break each day.
        slot_id += 1;
        repo.add_time_slot(TimeSlot {
            id: SlotId::new(slot_id),
            day,
            start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            is_break: true,
        });
    }

    let cs_courses = [CourseId::new(1), CourseId::new(2), CourseId::new(3)];
    let ee_courses = [CourseId::new(4), CourseId::new(5)];
    repo.add_student_group(group(1, "CS"), &cs_courses);
    repo.add_student_group(group(2, "CS"), &cs_courses);
    repo.add_student_group(group(3, "EE"), &ee_courses);

    let mut student_id = 0i64;
    for group_id in [1i64, 2, 3] {
        for _ in 0..4 {
            student_id += 1;
            repo.add_student(student(student_id, group_id));
        }
    }

    seed_calendar(&repo);
    TimetableCore::new(Arc::new(repo), CoreConfig::default())
}

pub fn all_groups() -> Vec<GroupId> {
    vec![GroupId::new(1), GroupId::new(2), GroupId::new(3)]
}
