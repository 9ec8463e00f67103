//! Attendance token and capture engine.
//!
//! Students carry a single-use, time-bounded token; a faculty scanner submits
//! the token nonce against a concrete class instance. The engine validates
//! the token, the instance, the marker and the student's membership, then
//! marks the student present or late depending on where the scan falls inside
//! the instance's slot window. A batch sweep fills in `absent` records once
//! the window has closed.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::db::repository::{
    AssignmentRepository, AttendanceRepository, EntityRepository, FullRepository, RepositoryError,
};
use crate::models::{
    Assignment, AttendanceRecord, AttendanceStatus, AttendanceToken, ClassInstanceId, StudentId,
    TeacherId, TimeSlot,
};

/// Arrivals up to this many minutes after slot start are `present`.
pub const LATE_GRACE_MINUTES: i64 = 15;

/// Tokens live this long after issuance unless consumed first.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Random bytes per nonce (256 bits; the contract requires ≥128).
pub const NONCE_BYTES: usize = 32;

/// Successful scan classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScanOutcome {
    Present,
    /// Whole minutes after slot start, floored.
    Late { minutes_late: i64 },
}

/// Attendance engine errors; each variant is a distinct protocol rejection.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("token not found")]
    TokenMissing,

    #[error("token has expired")]
    TokenExpired,

    #[error("token was already used")]
    TokenConsumed,

    #[error("class has not started yet (starts at {starts_at})")]
    NotYetStarted { starts_at: DateTime<Utc> },

    #[error("class has ended (ended at {ended_at})")]
    Ended { ended_at: DateTime<Utc> },

    #[error("attendance already marked for this class")]
    AlreadyMarked,

    #[error("marker is not allowed to mark this class")]
    UnauthorisedMarker,

    #[error("student is not a member of this class's group")]
    WrongGroup,

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AttendanceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AttendanceError::NotFound(msg),
            RepositoryError::Conflict(_) => AttendanceError::AlreadyMarked,
            other => AttendanceError::Repository(other),
        }
    }
}

/// Issue a fresh token for `student`, superseding any active one.
pub async fn issue_token<R: FullRepository>(
    repo: &R,
    student: StudentId,
    now: DateTime<Utc>,
) -> Result<AttendanceToken, AttendanceError> {
    repo.student(student).await?;

    let token = AttendanceToken {
        student,
        nonce: generate_nonce(),
        issued_at: now,
        expires_at: now + Duration::hours(TOKEN_TTL_HOURS),
        consumed: false,
    };
    repo.put_token(token.clone()).await?;

    debug!(%student, expires_at = %token.expires_at, "issued attendance token");
    Ok(token)
}

/// URL-safe opaque nonce: 256 random bits, hex-encoded. Stable across
/// serialisation.
fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Process one scan: `(nonce, instance, marker)` at time `now`.
///
/// The validation sequence is fixed; the record write and token consumption
/// at the end are one atomic repository step, so a scan either fully lands or
/// leaves no trace.
pub async fn scan<R: FullRepository>(
    repo: &R,
    config: &CoreConfig,
    nonce: &str,
    instance: ClassInstanceId,
    marker: TeacherId,
    now: DateTime<Utc>,
) -> Result<ScanOutcome, AttendanceError> {
    // 1. Token: present, unconsumed, unexpired, for a known student.
    let token = repo
        .token_by_nonce(nonce)
        .await?
        .ok_or(AttendanceError::TokenMissing)?;
    if token.consumed {
        return Err(AttendanceError::TokenConsumed);
    }
    if token.is_expired(now) {
        return Err(AttendanceError::TokenExpired);
    }
    let student = repo.student(token.student).await?;

    // 2. The class instance must exist.
    let (assignment, slot) = resolve_instance(repo, &instance).await?;

    // 3. Marker: the assigned teacher, or a repository-authorised role.
    if marker != assignment.teacher && !repo.is_authorised_marker(marker).await? {
        warn!(%marker, instance = %instance, "scan rejected: unauthorised marker");
        return Err(AttendanceError::UnauthorisedMarker);
    }

    // 4. Group membership.
    if student.group != assignment.group {
        return Err(AttendanceError::WrongGroup);
    }

    // 5. The slot window on the instance's date, boundaries inclusive.
    let (start, end) = config.slot_window(instance.date, &slot);
    if now < start {
        return Err(AttendanceError::NotYetStarted { starts_at: start });
    }
    if now > end {
        return Err(AttendanceError::Ended { ended_at: end });
    }

    // 6. Late past the grace period.
    let minutes_late = (now - start).num_minutes();
    let outcome = if now > start + Duration::minutes(LATE_GRACE_MINUTES) {
        ScanOutcome::Late { minutes_late }
    } else {
        ScanOutcome::Present
    };
    let status = match outcome {
        ScanOutcome::Present => AttendanceStatus::Present,
        ScanOutcome::Late { .. } => AttendanceStatus::Late,
    };

    // 7-8. Record + consume, atomically. A duplicate surfaces as Conflict
    // and maps to AlreadyMarked, leaving the token usable.
    let record = AttendanceRecord {
        student: token.student,
        instance,
        status,
        marked_at: now,
        marker,
    };
    repo.commit_scan(record, nonce).await?;

    info!(
        student = %token.student,
        instance = %instance,
        status = status.as_str(),
        "attendance captured"
    );
    Ok(outcome)
}

/// Create `absent` records for every group member of `instance` without an
/// existing record. Runs only at or after the window end; earlier calls are
/// a no-op. Idempotent: re-running never downgrades present/late records and
/// never duplicates.
///
/// # Returns
/// The number of records created.
pub async fn sweep_absences<R: FullRepository>(
    repo: &R,
    config: &CoreConfig,
    instance: ClassInstanceId,
    now: DateTime<Utc>,
) -> Result<usize, AttendanceError> {
    let (assignment, slot) = resolve_instance(repo, &instance).await?;

    let (_, end) = config.slot_window(instance.date, &slot);
    if now < end {
        debug!(instance = %instance, "absence sweep before window end; skipping");
        return Ok(0);
    }

    let students = repo.students_in_group(assignment.group).await?;
    let marked: std::collections::HashSet<StudentId> = repo
        .records_for_instance(&instance)
        .await?
        .into_iter()
        .map(|r| r.student)
        .collect();

    let absences: Vec<AttendanceRecord> = students
        .iter()
        .filter(|s| !marked.contains(&s.id))
        .map(|s| AttendanceRecord {
            student: s.id,
            instance,
            status: AttendanceStatus::Absent,
            marked_at: now,
            marker: assignment.teacher,
        })
        .collect();

    let created = repo.append_absences(absences).await?;
    info!(instance = %instance, created, "absence sweep finished");
    Ok(created)
}

/// Resolve a class-instance id against the current timetable and calendar.
///
/// The instance exists iff its assignment exists, the slot weekday matches
/// the date, and the date is a teaching day. Anything else is `NotFound`:
/// instances are derived, never stored, so there is nothing else to consult.
async fn resolve_instance<R: FullRepository>(
    repo: &R,
    instance: &ClassInstanceId,
) -> Result<(Assignment, TimeSlot), AttendanceError> {
    use chrono::Datelike;

    let assignment = repo.assignment(instance.assignment).await?;
    let slot = repo.time_slot(assignment.slot).await?;

    let calendar = repo.academic_calendar().await?;
    if slot.day != instance.date.weekday() || !calendar.is_teaching_day(instance.date) {
        return Err(AttendanceError::NotFound(format!(
            "Class instance {} not found",
            instance
        )));
    }

    Ok((assignment, slot))
}

#[cfg(test)]
#[path = "attendance_tests.rs"]
mod attendance_tests;
