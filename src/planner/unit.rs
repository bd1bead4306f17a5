use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::distro::{Distro, PlannerSettings};
use crate::planner::plan::TaskList;
use crate::task::Task;

/// A group of related tasks the planner schedules as a single object.
///
/// Units represent task groups, tasks pulled together with their
/// dependents, or all the tasks of a version. Tasks within a unit are
/// unique by id. Units are mutated only while the cache assembles them;
/// ranking and export treat them as read-only.
#[derive(Debug)]
pub struct Unit {
    tasks: BTreeMap<String, Task>,
    distro: Option<Arc<Distro>>,
    id: OnceCell<String>,
    rank: OnceCell<i64>,
}

impl Unit {
    /// Construct a unit containing a single task.
    pub fn new(task: Task) -> Self {
        let mut unit = Self {
            tasks: BTreeMap::new(),
            distro: None,
            id: OnceCell::new(),
            rank: OnceCell::new(),
        };
        unit.add(task);
        unit
    }

    /// Cache a task in the unit. Adding a task with an already-present id
    /// leaves the unit unchanged.
    pub fn add(&mut self, task: Task) {
        self.tasks.entry(task.id.clone()).or_insert(task);
    }

    /// Store the distro whose settings score this unit. The cache never
    /// exports a unit that has not been given a distro.
    pub fn set_distro(&mut self, distro: &Arc<Distro>) {
        self.distro = Some(Arc::clone(distro));
    }

    pub fn distro(&self) -> Option<&Arc<Distro>> {
        self.distro.as_ref()
    }

    /// The tasks in the unit, in task-id order.
    pub fn export(&self) -> TaskList {
        self.tasks.values().cloned().collect()
    }

    /// Ids of the tasks in the unit, in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stable identity of the unit: SHA-1 over the sorted task ids, hex
    /// encoded. Memoized on first use, and a pure function of the task id
    /// set, so insertion order never changes it.
    pub fn id(&self) -> &str {
        self.id.get_or_init(|| {
            let mut hasher = Sha1::new();
            for id in self.tasks.keys() {
                hasher.update(id.as_bytes());
            }
            format!("{:x}", hasher.finalize())
        })
    }

    /// Point value used to order units against each other; higher values
    /// dispatch first. Memoized: the unit is scored once, from an
    /// aggregate snapshot taken at first call.
    ///
    /// Larger units, units that have waited longer, and units with longer
    /// expected runtimes generally score higher, with task priority
    /// acting as a multiplier throughout.
    pub fn rank_value(&self) -> i64 {
        *self.rank.get_or_init(|| self.snapshot(Utc::now()).value())
    }

    /// Aggregate the unit's tasks into the statistics the scoring
    /// function consumes.
    pub(crate) fn snapshot(&self, now: DateTime<Utc>) -> UnitSnapshot {
        let mut info = UnitSnapshot {
            settings: self
                .distro
                .as_ref()
                .map(|d| d.planner_settings.clone())
                .unwrap_or_default(),
            ..UnitSnapshot::default()
        };

        for task in self.tasks.values() {
            if task.requester.is_commit_queue() || task.requester.is_github_merge_queue() {
                info.contains_in_commit_queue = true;
            } else if task.requester.is_patch() {
                info.contains_in_patch = true;
            }

            info.contains_non_group_tasks |= !task.in_task_group();
            info.contains_generate_task |= task.generate_task;
            info.contains_stepback_task |= task.is_stepback_activated();

            info.time_in_queue = info.time_in_queue + task.queue_wait(now);
            info.expected_runtime = info.expected_runtime + task.expected_duration.average;
            info.total_priority += task.priority;
            info.num_deps += task.num_dependents;
            info.task_ids.push(task.id.clone());
        }

        info
    }
}

/// Aggregated statistics for one unit, the input to the scoring function.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UnitSnapshot {
    /// Ids of the tasks in the unit.
    pub task_ids: Vec<String>,
    /// Planner settings of the unit's distro.
    pub settings: PlannerSettings,
    /// Sum of the durations the tasks are expected to take.
    #[serde(with = "crate::task::types::duration_ns", rename = "expected_runtime_ns")]
    pub expected_runtime: Duration,
    /// Sum of the durations the tasks have waited in the queue.
    #[serde(with = "crate::task::types::duration_ns", rename = "time_in_queue_ns")]
    pub time_in_queue: Duration,
    /// Sum of the priority values of the tasks.
    pub total_priority: i64,
    /// Total number of tasks depending on tasks in the unit.
    pub num_deps: i64,
    /// The unit contains a commit-queue or merge-queue task.
    pub contains_in_commit_queue: bool,
    /// The unit contains a patch task.
    pub contains_in_patch: bool,
    /// The unit contains at least one task outside any task group.
    pub contains_non_group_tasks: bool,
    /// The unit contains a generator task.
    pub contains_generate_task: bool,
    /// The unit contains a task activated by stepback.
    pub contains_stepback_task: bool,
}

impl Default for UnitSnapshot {
    fn default() -> Self {
        Self {
            task_ids: Vec::new(),
            settings: PlannerSettings::default(),
            expected_runtime: Duration::zero(),
            time_in_queue: Duration::zero(),
            total_priority: 0,
            num_deps: 0,
            contains_in_commit_queue: false,
            contains_in_patch: false,
            contains_non_group_tasks: false,
            contains_generate_task: false,
            contains_stepback_task: false,
        }
    }
}

impl UnitSnapshot {
    /// Score the unit. All arithmetic is 64-bit integer; per-task terms
    /// are averaged over the unit length so large units cannot crowd out
    /// focused ones on volume alone, and multiplied by the priority so
    /// the priority knob stays effective against the other factors.
    pub fn value(&self) -> i64 {
        let mut value: i64 = 0;

        let length = self.task_ids.len() as i64;
        let mut priority = 1 + (self.total_priority / length);

        if !self.contains_non_group_tasks {
            // A pure task-group unit gets a bump so its tasks sort
            // together even when they are also scheduled in a version.
            priority += length;
        }
        if self.contains_generate_task {
            // Generators gate further tasks, so people wait on them twice.
            priority *= self.settings.generate_task_factor;
        }

        if self.contains_in_patch && !self.contains_in_commit_queue {
            value += priority * self.settings.patch_factor;
            // Patches that have waited longer go first: people are
            // watching the results, and FIFO feels fair here.
            value += priority
                * self.settings.patch_time_in_queue_factor
                * (self.time_in_queue.num_minutes() / length);
        } else if self.contains_in_commit_queue {
            priority += 200;
            value += priority * self.settings.commit_queue_factor;
        } else {
            // Recent mainline builds get a freshness bonus so older
            // builds do not run first.
            let avg_lifetime = self.time_in_queue / length as i32;

            let mut mainline_priority: i64 = 0;
            if avg_lifetime < Duration::days(7) {
                mainline_priority += self.settings.mainline_time_in_queue_factor
                    * (Duration::days(7) - avg_lifetime).num_hours();
            }
            if self.contains_stepback_task {
                mainline_priority += self.settings.stepback_task_factor;
            }

            value += priority * mainline_priority;
        }

        // The task count sorts multi-task units above one-offs; the
        // priority is the base everything else scales from.
        value += length;
        value += priority;

        value += priority * (self.num_deps / length);
        value += priority
            * self.settings.expected_runtime_factor
            * (self.expected_runtime.num_minutes() / length);

        value
    }
}
