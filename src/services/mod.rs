//! High-level services over the repository port.
//!
//! - [`feasibility`]: necessary-condition analysis before generation
//! - [`instances`]: projection of weekly assignments onto calendar dates
//! - [`attendance`]: token issuance, scan protocol and absence sweep

pub mod attendance;
pub mod feasibility;
pub mod instances;

pub use attendance::{AttendanceError, ScanOutcome, LATE_GRACE_MINUTES, TOKEN_TTL_HOURS};
pub use feasibility::{EntityRef, Feasibility, InfeasibilityReason};
pub use instances::{InstanceCache, InstanceScope};
