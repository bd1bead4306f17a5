use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Activation tag set on tasks that were turned on by automatic stepback
/// bisection while hunting for the commit that introduced a regression.
pub const STEPBACK_TASK_ACTIVATOR: &str = "stepback";

/// A runnable task as handed to the planner by the persistence layer.
///
/// The planner treats tasks as opaque beyond the fields used for grouping
/// and scoring; everything else about a task (its commands, its logs, its
/// execution state) lives outside the planner core.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Identifier of the version (release/build group) the task belongs to.
    /// All tasks triggered by the same upstream commit or patch share one.
    pub version: String,
    /// Build variant the task runs under.
    pub build_variant: String,
    /// Owning project identifier.
    pub project: String,
    /// Name of the user-declared task group; empty when the task is not
    /// part of a task group.
    pub task_group: String,
    /// Position of this task within its task group (0 when ungrouped).
    pub task_group_order: i64,
    /// User-supplied priority bias.
    pub priority: i64,
    /// Number of other tasks that transitively depend on this one.
    pub num_dependents: i64,
    /// Upstream tasks this task depends on.
    pub depends_on: Vec<Dependency>,
    /// Provenance of the task.
    pub requester: Requester,
    /// Whether the task dynamically generates further tasks when it runs.
    pub generate_task: bool,
    /// Tag identifying what activated the task.
    pub activated_by: String,
    /// When the task was activated, if it has been.
    pub activated_time: Option<DateTime<Utc>>,
    /// When the task was ingested into the system, if recorded.
    pub ingest_time: Option<DateTime<Utc>>,
    /// Historical runtime statistics for the task.
    pub expected_duration: DurationStats,
}

impl Task {
    /// Whether the task belongs to a user-declared task group.
    pub fn in_task_group(&self) -> bool {
        !self.task_group.is_empty()
    }

    /// Composite cache key for the task's group. Combines group name,
    /// build variant, project, and version so that same-named groups from
    /// different versions do not collapse into one scheduling unit.
    pub fn task_group_key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.task_group, self.build_variant, self.project, self.version
        )
    }

    /// Whether the task was activated by stepback bisection.
    pub fn is_stepback_activated(&self) -> bool {
        self.activated_by == STEPBACK_TASK_ACTIVATOR
    }

    /// How long the task has been waiting in the queue, measured from its
    /// activation time, falling back to its ingest time. Tasks with
    /// neither timestamp have waited zero.
    pub fn queue_wait(&self, now: DateTime<Utc>) -> Duration {
        self.activated_time
            .or(self.ingest_time)
            .map(|since| now - since)
            .unwrap_or_else(Duration::zero)
    }
}

/// Reference to an upstream task that must run before the referencing one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    pub task_id: String,
}

impl Dependency {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}

/// Provenance of a task: what kind of event requested it.
///
/// The planner recognizes three equivalence classes. Patch-like requesters
/// are proposed changes not yet merged; commit-queue requesters (including
/// the merge-queue variant) validate a change immediately before merge;
/// everything else is treated as mainline.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Requester {
    /// Normal history of the default branch.
    #[default]
    #[serde(rename = "gitter_request")]
    Mainline,
    /// A patch submitted directly by a user.
    #[serde(rename = "patch_request")]
    Patch,
    /// A patch created from a GitHub pull request.
    #[serde(rename = "github_pull_request")]
    GithubPullRequest,
    /// A change being validated by the commit queue before merging.
    #[serde(rename = "merge_test")]
    CommitQueue,
    /// A change being validated by the GitHub merge queue.
    #[serde(rename = "github_merge_request")]
    GithubMergeQueue,
    /// A downstream build triggered by another project.
    #[serde(rename = "trigger_request")]
    Trigger,
    /// A version created manually, outside normal tracking.
    #[serde(rename = "ad_hoc")]
    AdHoc,
}

impl Requester {
    /// True for requesters originating from a proposed, unmerged change.
    pub fn is_patch(&self) -> bool {
        matches!(self, Requester::Patch | Requester::GithubPullRequest)
    }

    pub fn is_commit_queue(&self) -> bool {
        matches!(self, Requester::CommitQueue)
    }

    pub fn is_github_merge_queue(&self) -> bool {
        matches!(self, Requester::GithubMergeQueue)
    }
}

/// Runtime statistics for a task, produced by the historical runtime
/// aggregator. The planner only reads the average; the deviation travels
/// with it for consumers that surface confidence intervals.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DurationStats {
    #[serde(with = "duration_ns", rename = "average_ns")]
    pub average: Duration,
    #[serde(with = "duration_ns", rename = "std_dev_ns")]
    pub std_dev: Duration,
}

impl Default for DurationStats {
    fn default() -> Self {
        Self {
            average: Duration::zero(),
            std_dev: Duration::zero(),
        }
    }
}

/// Serde helpers encoding a `chrono::Duration` as whole nanoseconds.
pub(crate) mod duration_ns {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_nanoseconds().unwrap_or(i64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::nanoseconds(i64::deserialize(deserializer)?))
    }
}
