//! # Distro Configuration
//!
//! A distro describes a class of interchangeable worker machines that
//! share configuration, including the tuning factors the planner uses to
//! score scheduling units. The planner only reads this configuration; it
//! is loaded and persisted elsewhere.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A class of interchangeable worker machines sharing configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Distro {
    /// Distro identifier, e.g. `ubuntu2204-small`.
    pub id: String,
    /// Tuning factors for the planner's scoring function.
    #[serde(default)]
    pub planner_settings: PlannerSettings,
}

/// Tuning factors for the planner's scoring function.
///
/// Every factor defaults to 1, which leaves the corresponding term of the
/// score unweighted; a partially specified configuration document
/// deserializes to working weights.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlannerSettings {
    /// Fold all tasks of a version into one scheduling unit.
    #[serde(default)]
    pub group_versions: bool,
    /// Weight for the patch-provenance contribution.
    #[serde(default = "default_factor")]
    pub patch_factor: i64,
    /// Weight for per-task queue age of patch units.
    #[serde(default = "default_factor")]
    pub patch_time_in_queue_factor: i64,
    /// Weight for commit-queue and merge-queue provenance.
    #[serde(default = "default_factor")]
    pub commit_queue_factor: i64,
    /// Weight for the freshness bonus on mainline units younger than a
    /// week.
    #[serde(default = "default_factor")]
    pub mainline_time_in_queue_factor: i64,
    /// Additive bonus for units containing a stepback-activated task.
    #[serde(default = "default_factor")]
    pub stepback_task_factor: i64,
    /// Multiplier for units containing a generator task.
    #[serde(default = "default_factor")]
    pub generate_task_factor: i64,
    /// Weight for per-task expected runtime.
    #[serde(default = "default_factor")]
    pub expected_runtime_factor: i64,
}

fn default_factor() -> i64 {
    1
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            group_versions: false,
            patch_factor: 1,
            patch_time_in_queue_factor: 1,
            commit_queue_factor: 1,
            mainline_time_in_queue_factor: 1,
            stepback_task_factor: 1,
            generate_task_factor: 1,
            expected_runtime_factor: 1,
        }
    }
}

impl PlannerSettings {
    /// Whether tasks sharing a version should be folded into one unit.
    pub fn should_group_versions(&self) -> bool {
        self.group_versions
    }

    /// Check the factors for values that would break scoring.
    ///
    /// Rank values must stay strictly positive; negative factors can push
    /// a unit's score to zero or below.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [
            ("patch_factor", self.patch_factor),
            ("patch_time_in_queue_factor", self.patch_time_in_queue_factor),
            ("commit_queue_factor", self.commit_queue_factor),
            (
                "mainline_time_in_queue_factor",
                self.mainline_time_in_queue_factor,
            ),
            ("stepback_task_factor", self.stepback_task_factor),
            ("generate_task_factor", self.generate_task_factor),
            ("expected_runtime_factor", self.expected_runtime_factor),
        ] {
            if value < 0 {
                return Err(SettingsError::NegativeFactor { name, value });
            }
        }

        Ok(())
    }
}

/// Errors in planner configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("planner factor `{name}` must be non-negative, got {value}")]
    NegativeFactor { name: &'static str, value: i64 },
}
