use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;

use crate::planner::unit::Unit;
use crate::task::Task;

/// A sortable list of tasks, ordering the members of one unit for
/// dispatch.
///
/// The ordering preserves user-declared task-group sequence first, then
/// runs blockers before leaves, then higher priorities, then longer
/// expected runtimes so long work does not stretch the makespan by
/// running last. The sort is stable, so ties keep their task-id order
/// from the unit.
#[derive(Debug, Clone, Default)]
pub struct TaskList(Vec<Task>);

impl TaskList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    /// Sort into dispatch order.
    pub fn sort(&mut self) {
        self.0.sort_by(Self::dispatch_order);
    }

    fn dispatch_order(a: &Task, b: &Task) -> Ordering {
        a.task_group_order
            .cmp(&b.task_group_order)
            .then_with(|| b.num_dependents.cmp(&a.num_dependents))
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| {
                b.expected_duration
                    .average
                    .cmp(&a.expected_duration.average)
            })
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self(tasks)
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TaskList {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An ordered collection of scheduling units: the planner's output.
///
/// Units are sorted by descending rank and flattened into a deduplicated
/// task sequence; a task referenced by several units dispatches from the
/// best-ranked one.
#[derive(Debug, Default)]
pub struct TaskPlan {
    units: Vec<Unit>,
}

impl TaskPlan {
    pub(crate) fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    /// Number of units in the plan.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Ids of every task in every unit, including duplicates across
    /// units.
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        for unit in &self.units {
            out.extend(unit.keys());
        }
        out
    }

    /// Sort the units by rank and flatten them into the dispatch
    /// sequence.
    ///
    /// Each task id appears exactly once: the first (highest-ranked) unit
    /// containing a task wins, and later occurrences are skipped. The
    /// sort is stable, so equally ranked units keep their cache order and
    /// the output is deterministic for identical inputs.
    pub fn export(mut self) -> Vec<Task> {
        self.units
            .sort_by_cached_key(|unit| Reverse(unit.rank_value()));

        let mut seen = HashSet::new();
        let mut output = Vec::new();
        for unit in self.units {
            let mut tasks = unit.export();
            tasks.sort();
            for task in tasks {
                if !seen.insert(task.id.clone()) {
                    continue;
                }

                output.push(task);
            }
        }

        output
    }
}
