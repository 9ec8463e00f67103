//! Repository trait definitions for the core's persistence port.
//!
//! This module provides a collection of focused repository traits that
//! abstract storage operations. By splitting responsibilities across multiple
//! traits, implementations can be more focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`entities`]: Read access to externally managed entity records
//! - [`assignments`]: Atomic batch replacement of scheduler output
//! - [`attendance`]: Token storage and append-only attendance records
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let groups = repo.list_student_groups().await?;
//!     let current = repo.generation().await?;
//!     Ok(())
//! }
//! ```

pub mod assignments;
pub mod attendance;
pub mod entities;
pub mod error;

// Re-export error types
pub use error::{RepositoryError, RepositoryResult};

// Re-export all traits
pub use assignments::AssignmentRepository;
pub use attendance::AttendanceRepository;
pub use entities::EntityRepository;

/// Composite trait bound for a complete repository implementation.
///
/// This trait is automatically implemented for any type that implements all
/// three repository traits. Use it as a convenient bound when a service needs
/// the whole port.
pub trait FullRepository: EntityRepository + AssignmentRepository + AttendanceRepository {}

// Blanket implementation: any type implementing all three traits automatically implements FullRepository
impl<T> FullRepository for T where
    T: EntityRepository + AssignmentRepository + AttendanceRepository
{
}
