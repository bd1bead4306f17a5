//! # Task Planner
//!
//! Turns a flat batch of runnable tasks destined for one distro into an
//! ordered dispatch sequence.
//!
//! ## Core Components
//!
//! - **[`Unit`]**: a group of tasks the planner schedules as one object
//! - **[`UnitCache`]**: alias-keyed collection of units with
//!   merge-on-collision
//! - **[`TaskPlan`]**: rank-ordered units, flattened to a deduplicated
//!   task sequence
//! - **[`prepare_tasks_for_planning`]**: the two-pass assembly tying them
//!   together
//!
//! ## Grouping Disciplines
//!
//! Tasks are folded into units under three overlapping disciplines whose
//! memberships can transitively collapse together:
//!
//! 1. **Task groups**: user-declared ordered clusters, keyed by the
//!    composite group key so same-named groups of different versions stay
//!    apart
//! 2. **Versions**: all tasks of one version, when the distro enables
//!    version grouping
//! 3. **Dependency fan-in**: a task that depends on another task in the
//!    batch joins the dependency's unit, so dependents travel with their
//!    upstream
//!
//! ## Guarantees
//!
//! Planning is a pure synchronous computation: no I/O, no error channel,
//! no shared state between calls. Empty or malformed batches produce an
//! empty plan. Each input task id appears exactly once in the exported
//! sequence, and identical inputs produce identical output.

use std::sync::Arc;

use tracing::debug;

use crate::distro::Distro;
use crate::task::Task;

/// Scheduling unit construction and rank scoring.
pub mod unit;

/// Alias-keyed unit collection with merge-on-collision.
pub mod cache;

/// Inter-unit ordering and dispatch flattening.
pub mod plan;


pub use cache::UnitCache;
pub use plan::{TaskList, TaskPlan};
pub use unit::Unit;

/// Group a batch of tasks for a distro into scheduling units and return
/// them as a [`TaskPlan`].
///
/// The first pass folds each task into units under the grouping
/// disciplines: its task group (aliased by the composite group key and
/// the task's own id), its version when the distro groups versions, or a
/// unit of its own. The second pass pulls each dependent task into the
/// units of the dependencies that are present in the batch; dependencies
/// outside the batch are ignored, since they belong to another pool or
/// are already satisfied.
pub fn prepare_tasks_for_planning(distro: &Distro, tasks: &[Task]) -> TaskPlan {
    debug!(
        distro = %distro.id,
        tasks = tasks.len(),
        "grouping tasks into scheduling units"
    );

    let distro = Arc::new(distro.clone());
    let mut cache = UnitCache::new();

    for t in tasks {
        let slot = if t.in_task_group() {
            let slot = cache.create(t.task_group_key(), t.clone());
            cache.alias_existing(t.id.clone(), slot);
            cache.add_when(
                distro.planner_settings.should_group_versions(),
                t.version.clone(),
                t.clone(),
            );
            slot
        } else if distro.planner_settings.should_group_versions() {
            let slot = cache.create(t.version.clone(), t.clone());
            cache.alias_existing(t.id.clone(), slot);
            slot
        } else {
            cache.create(t.id.clone(), t.clone())
        };
        cache.unit_mut(slot).set_distro(&distro);
    }

    for t in tasks {
        for dep in &t.depends_on {
            cache.add_when(cache.exists(&dep.task_id), dep.task_id.clone(), t.clone());
        }
    }

    let plan = cache.export();
    debug!(distro = %distro.id, units = plan.len(), "planned scheduling units");

    plan
}
