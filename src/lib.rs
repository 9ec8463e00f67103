//! # TAS Core
//!
//! Core engine of a multi-group academic timetable and attendance system.
//!
//! This crate implements the two stateful subsystems of the product: a
//! constraint-satisfaction timetable generator and a time-windowed attendance
//! capture engine, together with the entity model and repository port they
//! share. HTTP routing, user management and persistence backends live in the
//! surrounding application; the core calls out only through the repository
//! traits and is driven only through [`api::TimetableCore`].
//!
//! ## Features
//!
//! - **Feasibility Analysis**: ordered necessary-condition checks that name
//!   the first offending entity
//! - **Timetable Generation**: deterministic depth-first back-tracking over
//!   (slot, room, teacher) triples with global conflict maps
//! - **Class Instances**: lazy projection of weekly assignments onto calendar
//!   dates, honouring sessions and holidays
//! - **Attendance Capture**: single-use tokens, a strict scan protocol with a
//!   15-minute grace period, and an idempotent absence sweep
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: typed entity, calendar and schedule records
//! - [`db`]: repository traits and the in-memory implementation
//! - [`scheduler`]: the back-tracking search and regeneration orchestration
//! - [`services`]: feasibility, materialisation and attendance engines
//! - [`api`]: the in-process facade
//! - [`config`]: TOML-backed deployment configuration

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod scheduler;
pub mod services;

pub use api::{CoreError, TimetableCore};
