use std::collections::{HashMap, HashSet};

use crate::planner::plan::TaskPlan;
use crate::planner::unit::Unit;
use crate::task::Task;

/// Associative collection of scheduling units keyed by alias.
///
/// A unit may be registered under several aliases at once: its task-group
/// key, the owning version, each member task's id, and the ids of tasks
/// its members depend on. Units live in an arena and aliases map to arena
/// slots, so adding a task through any alias mutates the one shared unit
/// and the task becomes visible through every alias.
///
/// A cache belongs to a single planning call and is consumed by
/// [`UnitCache::export`].
#[derive(Debug, Default)]
pub struct UnitCache {
    units: Vec<Unit>,
    index: HashMap<String, usize>,
}

impl UnitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any unit is registered under the key.
    pub fn exists(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of distinct units in the cache.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Register a task under the alias, returning the slot of the unit it
    /// landed in. If the alias already names a unit, the task is added to
    /// that unit; otherwise a new unit is created around the task.
    pub fn create(&mut self, id: impl Into<String>, task: Task) -> usize {
        let id = id.into();
        if let Some(&slot) = self.index.get(&id) {
            self.units[slot].add(task);
            return slot;
        }

        let slot = self.units.len();
        self.units.push(Unit::new(task));
        self.index.insert(id, slot);
        slot
    }

    /// Conditional form of [`UnitCache::create`]; a no-op when `cond` is
    /// false.
    pub fn add_when(&mut self, cond: bool, id: impl Into<String>, task: Task) {
        if !cond {
            return;
        }

        self.create(id, task);
    }

    /// Register an existing unit under an additional alias. If the alias
    /// already names a different unit, the tasks of `slot`'s unit are
    /// copied into the incumbent instead and the alias keeps pointing at
    /// it; `slot`'s unit stays reachable through its other aliases.
    pub fn alias_existing(&mut self, id: impl Into<String>, slot: usize) {
        let id = id.into();
        match self.index.get(&id) {
            Some(&existing) if existing != slot => {
                for task in self.units[slot].export() {
                    self.units[existing].add(task);
                }
            }
            Some(_) => {}
            None => {
                self.index.insert(id, slot);
            }
        }
    }

    pub fn unit(&self, slot: usize) -> &Unit {
        &self.units[slot]
    }

    pub fn unit_mut(&mut self, slot: usize) -> &mut Unit {
        &mut self.units[slot]
    }

    /// Produce a plan of unique units.
    ///
    /// Units are emitted in creation order, each distinct identity at
    /// most once; units that were never given a distro are skipped, as
    /// they cannot be scored.
    pub fn export(self) -> TaskPlan {
        let mut seen = HashSet::new();
        let mut units = Vec::new();

        for unit in self.units {
            if unit.distro().is_none() {
                continue;
            }
            if !seen.insert(unit.id().to_string()) {
                continue;
            }

            units.push(unit);
        }

        TaskPlan::new(units)
    }
}
