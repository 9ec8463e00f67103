//! Attendance repository trait: tokens and append-only records.
//!
//! Attendance records are immutable once written; the only conditional write
//! is the scan commit, which inserts the record and consumes the token as one
//! atomic step.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{AttendanceRecord, AttendanceToken, ClassInstanceId, TeacherId};

/// Storage for attendance tokens and records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Store a freshly issued token, superseding any prior active token for
    /// the same student.
    async fn put_token(&self, token: AttendanceToken) -> RepositoryResult<()>;

    /// Look up a token by its nonce. Superseded tokens do not resolve.
    async fn token_by_nonce(&self, nonce: &str) -> RepositoryResult<Option<AttendanceToken>>;

    /// Atomically insert an attendance record and consume the token.
    ///
    /// Fails with `Conflict` when a record for the same
    /// (student, class instance) pair already exists; in that case the token
    /// is left untouched.
    async fn commit_scan(&self, record: AttendanceRecord, nonce: &str) -> RepositoryResult<()>;

    /// All records for one class instance.
    async fn records_for_instance(
        &self,
        instance: &ClassInstanceId,
    ) -> RepositoryResult<Vec<AttendanceRecord>>;

    /// Insert absence records, skipping any (student, instance) pair that
    /// already has a record of any status.
    ///
    /// # Returns
    /// The number of records actually inserted.
    async fn append_absences(&self, records: Vec<AttendanceRecord>) -> RepositoryResult<usize>;

    /// Whether `marker` holds a role allowed to mark attendance for classes
    /// it does not teach. The role model is opaque to the core.
    async fn is_authorised_marker(&self, marker: TeacherId) -> RepositoryResult<bool>;
}
