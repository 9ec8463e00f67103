//! Schedule outputs and attendance records.
//!
//! An [`Assignment`] is the generator's output: a confirmed
//! (group, course, teacher, room, slot) tuple. A [`ClassInstance`] is an
//! assignment projected onto a concrete calendar date; its identity is the
//! `(assignment, date)` pair and it is never speculatively persisted.
//! Attendance state is captured by single-use [`AttendanceToken`]s and
//! immutable [`AttendanceRecord`]s.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;
use crate::models::entities::{CourseId, GroupId, RoomId, SlotId, StudentId, TeacherId};

define_id_type!(i64, AssignmentId);

/// A confirmed weekly placement of one course period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub group: GroupId,
    pub course: CourseId,
    pub teacher: TeacherId,
    pub room: RoomId,
    pub slot: SlotId,
}

/// Identity of a class instance: an assignment on a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassInstanceId {
    pub assignment: AssignmentId,
    pub date: NaiveDate,
}

impl std::fmt::Display for ClassInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.assignment, self.date)
    }
}

/// A dated occurrence of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInstance {
    pub assignment: Assignment,
    pub date: NaiveDate,
}

impl ClassInstance {
    pub fn id(&self) -> ClassInstanceId {
        ClassInstanceId {
            assignment: self.assignment.id,
            date: self.date,
        }
    }
}

/// Attendance status of a student at one class instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }
}

/// A single-use, time-bounded scan credential tied to one student.
///
/// A student has at most one active token; issuing a new one supersedes any
/// prior token. The nonce is an opaque URL-safe string, stable across
/// serialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceToken {
    pub student: StudentId,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl AttendanceToken {
    /// Expired at or after `expires_at`; valid strictly before it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// An immutable attendance record for one (student, class instance) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student: StudentId,
    pub instance: ClassInstanceId,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
    pub marker: TeacherId,
}
