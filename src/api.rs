//! In-process API surface of the core.
//!
//! [`TimetableCore`] bundles a repository handle with the deployment
//! configuration and the core's only in-process state: the regeneration lock
//! and the generation-keyed instance cache. Everything else lives in the
//! repository. The HTTP layer, authentication and entity CRUD belong to the
//! surrounding application and call in through this facade.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::config::CoreConfig;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{
    AttendanceToken, ClassInstance, ClassInstanceId, DateRange, GroupId, StudentId, TeacherId,
};
use crate::scheduler::{self, ScheduleOutcome};
use crate::services::attendance::{self, AttendanceError, ScanOutcome};
use crate::services::feasibility::{self, Feasibility};
use crate::services::instances::{InstanceCache, InstanceScope};

/// Error type for facade operations that are not attendance-specific.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => CoreError::NotFound(msg),
            other => CoreError::Repository(other),
        }
    }
}

/// The core engine: feasibility, regeneration, materialisation, attendance.
pub struct TimetableCore<R: FullRepository> {
    repo: Arc<R>,
    config: CoreConfig,
    /// Regenerations are exclusive: two runs over overlapping groups must
    /// never interleave, so all runs are serialised here.
    regen_lock: Mutex<()>,
    instances: InstanceCache,
}

impl<R: FullRepository> TimetableCore<R> {
    pub fn new(repo: Arc<R>, config: CoreConfig) -> Self {
        Self {
            repo,
            config,
            regen_lock: Mutex::new(()),
            instances: InstanceCache::new(),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Prove or disprove the necessary conditions for generation.
    pub async fn check_feasibility(&self) -> Result<Feasibility, CoreError> {
        Ok(feasibility::check(self.repo.as_ref()).await?)
    }

    /// Regenerate the timetables of `groups`, atomically replacing their
    /// assignments on success. `deadline` bounds the search.
    pub async fn regenerate(
        &self,
        groups: &[GroupId],
        deadline: Option<Instant>,
    ) -> Result<ScheduleOutcome, CoreError> {
        let _guard = self.regen_lock.lock().await;
        Ok(scheduler::regenerate(self.repo.as_ref(), groups, deadline).await?)
    }

    /// Materialise class instances for a date range and scope. Results are
    /// cached per repository generation.
    pub async fn materialise_instances(
        &self,
        range: DateRange,
        scope: InstanceScope,
    ) -> Result<Vec<ClassInstance>, CoreError> {
        let instances = self
            .instances
            .get_or_materialise(self.repo.as_ref(), range, scope)
            .await?;
        Ok(instances.as_ref().clone())
    }

    /// Issue a fresh single-use attendance token for `student`.
    pub async fn issue_token(
        &self,
        student: StudentId,
        now: DateTime<Utc>,
    ) -> Result<AttendanceToken, AttendanceError> {
        attendance::issue_token(self.repo.as_ref(), student, now).await
    }

    /// Validate one scan against the instance's slot window and record the
    /// student present or late.
    pub async fn scan(
        &self,
        nonce: &str,
        instance: ClassInstanceId,
        marker: TeacherId,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, AttendanceError> {
        attendance::scan(
            self.repo.as_ref(),
            &self.config,
            nonce,
            instance,
            marker,
            now,
        )
        .await
    }

    /// Create absence records for unmarked group members of `instance`.
    pub async fn sweep_absences(
        &self,
        instance: ClassInstanceId,
        now: DateTime<Utc>,
    ) -> Result<usize, AttendanceError> {
        attendance::sweep_absences(self.repo.as_ref(), &self.config, instance, now).await
    }
}
