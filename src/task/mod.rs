//! # Task Model
//!
//! Input types for the planner: runnable tasks with their grouping,
//! provenance, dependency, and runtime-history attributes.
//!
//! Tasks arrive from the persistence layer already validated (ids unique,
//! dependency graph acyclic); the planner reads them and never writes
//! them back.

/// Core task types, enums, and data structures.
///
/// Defines the [`Task`] input record along with its provenance
/// classification ([`Requester`]), dependency references, and runtime
/// statistics.
pub mod types;

pub use types::*;
