//! End-to-end planning scenarios: literal task batches through
//! `prepare_tasks_for_planning` and the exported dispatch order.

use chrono::{Duration, Utc};
use dispatch_planner::distro::{Distro, PlannerSettings};
use dispatch_planner::planner::prepare_tasks_for_planning;
use dispatch_planner::task::{Dependency, Requester, Task, STEPBACK_TASK_ACTIVATOR};
use std::collections::HashSet;

fn make_distro(settings: PlannerSettings) -> Distro {
    Distro {
        id: "ubuntu2204-small".to_string(),
        planner_settings: settings,
    }
}

fn make_task(id: &str) -> Task {
    Task {
        id: id.to_string(),
        version: "v1".to_string(),
        build_variant: "ubuntu2204".to_string(),
        project: "server".to_string(),
        ..Task::default()
    }
}

fn exported_ids(distro: &Distro, tasks: &[Task]) -> Vec<String> {
    prepare_tasks_for_planning(distro, tasks)
        .export()
        .into_iter()
        .map(|t| t.id)
        .collect()
}

#[test]
fn test_empty_batch_produces_empty_plan() {
    let distro = make_distro(PlannerSettings::default());
    let plan = prepare_tasks_for_planning(&distro, &[]);

    assert!(plan.is_empty());
    assert!(plan.export().is_empty());
}

#[test]
fn test_task_group_members_dispatch_in_declared_order() {
    let distro = make_distro(PlannerSettings::default());
    let tasks = vec![
        Task {
            task_group: "g".to_string(),
            task_group_order: 1,
            ..make_task("a")
        },
        Task {
            task_group: "g".to_string(),
            task_group_order: 0,
            ..make_task("b")
        },
    ];

    let plan = prepare_tasks_for_planning(&distro, &tasks);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.units()[0].keys(), vec!["a", "b"]);

    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn test_version_grouping_folds_grouped_and_ungrouped_tasks_together() {
    let distro = make_distro(PlannerSettings {
        group_versions: true,
        ..PlannerSettings::default()
    });
    let tasks = vec![
        Task {
            task_group: "g".to_string(),
            ..make_task("a")
        },
        make_task("b"),
    ];

    let plan = prepare_tasks_for_planning(&distro, &tasks);
    let merged = plan
        .units()
        .iter()
        .find(|unit| unit.len() == 2)
        .expect("version unit holding both tasks");
    assert_eq!(merged.keys(), vec!["a", "b"]);

    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids.len(), 2);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 2);
}

#[test]
fn test_dependents_travel_with_their_dependencies() {
    let distro = make_distro(PlannerSettings::default());
    let tasks = vec![
        Task {
            num_dependents: 1,
            ..make_task("d")
        },
        Task {
            depends_on: vec![Dependency::new("d")],
            ..make_task("t")
        },
    ];

    let plan = prepare_tasks_for_planning(&distro, &tasks);
    let joint = plan
        .units()
        .iter()
        .find(|unit| unit.len() == 2)
        .expect("dependency unit holding both tasks");
    assert_eq!(joint.keys(), vec!["d", "t"]);

    // The blocker dispatches before its dependent, and both exactly once.
    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids, vec!["d", "t"]);
}

#[test]
fn test_dependencies_outside_the_batch_are_ignored() {
    let distro = make_distro(PlannerSettings::default());
    let tasks = vec![Task {
        depends_on: vec![Dependency::new("not-here")],
        ..make_task("t")
    }];

    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids, vec!["t"]);
}

#[test]
fn test_commit_queue_outranks_mainline() {
    let distro = make_distro(PlannerSettings {
        commit_queue_factor: 10,
        ..PlannerSettings::default()
    });
    let tasks = vec![
        make_task("mainline"),
        Task {
            requester: Requester::CommitQueue,
            ..make_task("merge")
        },
    ];

    let plan = prepare_tasks_for_planning(&distro, &tasks);
    let rank_of = |id: &str| {
        plan.units()
            .iter()
            .find(|unit| unit.keys() == vec![id.to_string()])
            .expect("unit for task")
            .rank_value()
    };
    assert!(rank_of("merge") > rank_of("mainline"));

    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids, vec!["merge", "mainline"]);
}

#[test]
fn test_older_patches_dispatch_first() {
    let now = Utc::now();
    let distro = make_distro(PlannerSettings::default());
    let tasks = vec![
        Task {
            requester: Requester::Patch,
            activated_time: Some(now - Duration::minutes(10)),
            ..make_task("young")
        },
        Task {
            requester: Requester::Patch,
            activated_time: Some(now - Duration::minutes(30)),
            ..make_task("old")
        },
    ];

    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids, vec!["old", "young"]);
}

#[test]
fn test_stepback_tasks_outrank_plain_mainline() {
    let now = Utc::now();
    let distro = make_distro(PlannerSettings {
        stepback_task_factor: 5,
        ..PlannerSettings::default()
    });
    let tasks = vec![
        Task {
            activated_time: Some(now - Duration::hours(1)),
            ..make_task("plain")
        },
        Task {
            activated_time: Some(now - Duration::hours(1)),
            activated_by: STEPBACK_TASK_ACTIVATOR.to_string(),
            ..make_task("bisect")
        },
    ];

    let ids = exported_ids(&distro, &tasks);
    assert_eq!(ids, vec!["bisect", "plain"]);
}

#[test]
fn test_every_task_dispatches_exactly_once() {
    let now = Utc::now();
    let distro = make_distro(PlannerSettings {
        group_versions: true,
        ..PlannerSettings::default()
    });

    // A mixed batch: a task group, an ungrouped task in the same version,
    // a dependent crossing into another version, and a patch.
    let tasks = vec![
        Task {
            task_group: "g".to_string(),
            task_group_order: 0,
            ..make_task("compile")
        },
        Task {
            task_group: "g".to_string(),
            task_group_order: 1,
            num_dependents: 1,
            ..make_task("archive")
        },
        make_task("lint"),
        Task {
            version: "v2".to_string(),
            depends_on: vec![Dependency::new("archive")],
            ..make_task("smoke")
        },
        Task {
            requester: Requester::Patch,
            priority: 8,
            activated_time: Some(now - Duration::minutes(45)),
            ..make_task("patch-check")
        },
    ];

    let ids = exported_ids(&distro, &tasks);

    assert_eq!(ids.len(), tasks.len());
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), tasks.len());
    for task in &tasks {
        assert!(ids.contains(&task.id), "missing {}", task.id);
    }
}

#[test]
fn test_identical_inputs_produce_identical_plans() {
    let distro = make_distro(PlannerSettings {
        group_versions: true,
        ..PlannerSettings::default()
    });
    let tasks = vec![
        Task {
            task_group: "g".to_string(),
            priority: 4,
            ..make_task("a")
        },
        Task {
            priority: 2,
            num_dependents: 3,
            ..make_task("b")
        },
        Task {
            version: "v2".to_string(),
            depends_on: vec![Dependency::new("b")],
            ..make_task("c")
        },
    ];

    let first = exported_ids(&distro, &tasks);
    let second = exported_ids(&distro, &tasks);
    assert_eq!(first, second);
}
