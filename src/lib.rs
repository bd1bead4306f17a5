//! # Dispatch Planner
//!
//! The task planner core of a continuous-integration orchestration
//! service. The planner takes a flat list of runnable tasks destined for
//! a single execution pool (a *distro*) and produces the ordered dispatch
//! sequence that workers in that pool drain.
//!
//! ## Architecture Overview
//!
//! The system consists of three modules:
//!
//! - **[`task`]**: the task input model with grouping, provenance, and
//!   runtime-history attributes
//! - **[`distro`]**: worker-pool configuration, including the planner's
//!   tuning factors
//! - **[`planner`]**: grouping, scoring, and ordering of scheduling units
//!
//! ## Features
//!
//! ### 🧩 Grouping
//! - **Task groups**: user-declared ordered clusters stay together
//! - **Version grouping**: optionally fold a whole version into one unit
//! - **Dependency fan-in**: dependents travel with their upstream tasks
//! - **Merge-on-collision**: overlapping groups collapse into one unit
//!
//! ### 📊 Scoring
//! - **Multi-factor ranking**: user priority, queue age, expected
//!   runtime, dependency fan-out, and provenance reconciled into one
//!   integer rank
//! - **Provenance tiers**: commit queue over patches over mainline, with
//!   a freshness bonus for recent mainline builds
//! - **Per-task averaging**: large units cannot crowd out focused ones on
//!   volume alone
//!
//! ### 🔁 Determinism
//! - **Pure computation**: no I/O, no error channel, no shared state
//! - **Stable ordering**: identical inputs produce identical dispatch
//!   sequences
//! - **Exactly-once dispatch**: a task referenced by several units is
//!   emitted from the best-ranked one only
//!
//! ## Quick Start
//!
//! ```rust
//! use dispatch_planner::distro::Distro;
//! use dispatch_planner::planner::prepare_tasks_for_planning;
//! use dispatch_planner::task::Task;
//!
//! let distro = Distro {
//!     id: "ubuntu2204-small".to_string(),
//!     ..Distro::default()
//! };
//! let tasks = vec![
//!     Task {
//!         id: "compile".to_string(),
//!         num_dependents: 1,
//!         ..Task::default()
//!     },
//!     Task {
//!         id: "lint".to_string(),
//!         ..Task::default()
//!     },
//! ];
//!
//! let ordered = prepare_tasks_for_planning(&distro, &tasks).export();
//! assert_eq!(ordered.len(), 2);
//! ```

/// Worker-pool configuration consumed by the planner.
///
/// Carries the [`PlannerSettings`] tuning factors that weight the
/// scoring function.
pub mod distro;

/// Grouping, scoring, and ordering of scheduling units.
///
/// The planner's entry point is [`prepare_tasks_for_planning`], which
/// assembles a [`TaskPlan`] ready to be flattened into a dispatch
/// sequence.
pub mod planner;

/// Task input model.
///
/// Defines the [`Task`] record the persistence layer hands to the
/// planner, along with provenance classification and runtime statistics.
pub mod task;

// Re-export the externally consumed surface.
pub use distro::{Distro, PlannerSettings, SettingsError};
pub use planner::{prepare_tasks_for_planning, TaskPlan};
pub use task::{Dependency, DurationStats, Requester, Task};
