//! Persistence port and bundled implementations.
//!
//! The core depends only on the narrow trait surface in [`repository`]; the
//! in-memory implementation in [`repositories`] backs unit tests and local
//! development.

pub mod repositories;
pub mod repository;

pub use repositories::LocalRepository;
pub use repository::{
    AssignmentRepository, AttendanceRepository, EntityRepository, FullRepository, RepositoryError,
    RepositoryResult,
};
