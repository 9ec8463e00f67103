//! Externally managed entity records.
//!
//! These are the typed inputs the core operates on: courses, teachers,
//! classrooms, weekly time slots, student groups and students. They are plain
//! value records joined by ids; any traversal goes through the repository
//! port, never an in-memory pointer graph.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::define_id_type;
use crate::models::equipment::EquipmentSet;

define_id_type!(i64, CourseId);
define_id_type!(i64, TeacherId);
define_id_type!(i64, RoomId);
define_id_type!(i64, SlotId);
define_id_type!(i64, GroupId);
define_id_type!(i64, StudentId);

/// A course as offered to one or more student groups.
///
/// `periods_per_week` is how many distinct weekly slots the scheduler must
/// reserve for every group taking the course. `min_capacity` and
/// `required_equipment` restrict which classrooms qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    /// Unique course code, e.g. "CS101".
    pub code: String,
    pub name: String,
    /// Weekly period count, expected in 1..=10.
    pub periods_per_week: u8,
    /// Smallest acceptable room capacity.
    pub min_capacity: u32,
    /// Enrolment ceiling; informational for the core.
    pub max_students: u32,
    pub required_equipment: EquipmentSet,
    pub department: String,
}

/// A teaching staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub department: String,
    /// Subject areas this teacher may teach. Empty = wild-card: eligible for
    /// any course.
    pub qualifications: BTreeSet<String>,
}

impl Teacher {
    /// Whether this teacher may be assigned to `course`.
    pub fn is_eligible_for(&self, course: &Course) -> bool {
        self.qualifications.is_empty() || self.qualifications.contains(&course.department)
    }
}

/// A physical classroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: RoomId,
    pub room_number: String,
    pub capacity: u32,
    pub building: String,
    pub equipment: EquipmentSet,
}

impl Classroom {
    /// Whether this room can host `course` (capacity and equipment).
    pub fn suits(&self, course: &Course) -> bool {
        self.capacity >= course.min_capacity && self.equipment.covers(&course.required_equipment)
    }
}

/// One weekly slot in the timetable grid.
///
/// Break slots exist in the grid (lunch, recess) but are never scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_break: bool,
}

impl TimeSlot {
    /// Stable grid position: weekday index, then start time.
    pub fn ordering_key(&self) -> (u32, NaiveTime) {
        (self.day.num_days_from_monday(), self.start_time)
    }
}

/// A cohort of students sharing an identical course load and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGroup {
    pub id: GroupId,
    pub name: String,
    pub department: String,
    pub year: u16,
    pub semester: u8,
}

impl StudentGroup {
    /// Stable processing order for regeneration.
    pub fn ordering_key(&self) -> (&str, u16, u8, GroupId) {
        (self.department.as_str(), self.year, self.semester, self.id)
    }
}

/// A student; the core only needs identity and group membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub group: GroupId,
}
