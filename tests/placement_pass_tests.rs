use std::io::Write;

use scheduler_core::*;
use scheduler_dispatcher::{SelectStrategy, StrategyHandle};
use worker_select::app::{load_tasks, load_workers};
use worker_select::{PlacementDecision, PlacementPass, PlacementSummary};

const WORKERS_JSON: &str = r#"[
    {"identity": "localhost0", "tier": "t1", "version": "v1", "total_capacity": 1},
    {"identity": "localhost1", "tier": "t1", "version": "v1", "total_capacity": 2},
    {"identity": "localhost2", "tier": "t2", "version": "v1", "total_capacity": 3},
    {"identity": "localhost3", "tier": "t2", "version": "v1", "total_capacity": 4,
     "running_task_ids": ["already-running"],
     "running_availability_groups": ["replica-a"],
     "last_completed_at": "2024-01-01T00:00:00Z"}
]"#;

const TASKS_JSON: &str = r#"[
    {"id": "task-1", "task_type": "noop", "dataset": "ds1"},
    {"id": "task-2", "task_type": "noop", "dataset": "ds1", "availability_group": "replica-a"},
    {"id": "task-3", "task_type": "index_kafka", "dataset": "ds2", "required_capacity": 2}
]"#;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_load_inputs_from_files() {
    let workers_file = write_temp(WORKERS_JSON);
    let tasks_file = write_temp(TASKS_JSON);

    let workers = load_workers(workers_file.path()).await.unwrap();
    let tasks = load_tasks(tasks_file.path()).await.unwrap();

    assert_eq!(workers.len(), 4);
    assert_eq!(workers["localhost3"].used_capacity(), 1);
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[2].required_capacity, 2);
}

#[tokio::test]
async fn test_invalid_inputs_are_rejected_at_load() {
    let zero_capacity = write_temp(
        r#"[{"identity": "localhost0", "tier": "t1", "version": "v1", "total_capacity": 0}]"#,
    );
    assert!(load_workers(zero_capacity.path()).await.is_err());

    let invalid_task = write_temp(
        r#"[{"id": "task-1", "task_type": "noop", "dataset": "ds1", "required_capacity": 0}]"#,
    );
    assert!(load_tasks(invalid_task.path()).await.is_err());
}

#[tokio::test]
async fn test_tier_aware_pass_over_loaded_inputs() {
    let workers = load_workers(write_temp(WORKERS_JSON).path()).await.unwrap();
    let tasks = load_tasks(write_temp(TASKS_JSON).path()).await.unwrap();

    let behavior = BehaviorConfig::from_json_str(
        r#"{
            "selectStrategy": {
                "type": "equalDistributionWithTierSpec",
                "workerTierSpec": {
                    "strong": true,
                    "tierMap": {"noop": {"defaultTier": "t2", "tiers": null}}
                }
            }
        }"#,
    )
    .unwrap();
    let strategy = SelectStrategy::from_behavior(&behavior);

    let report = PlacementPass::new(&strategy, RunnerConfig::default(), workers).run(&tasks);

    assert_eq!(report.strategy, "EqualDistributionWithTierSpec");
    assert_eq!(
        report.decisions,
        vec![
            // t2 内: localhost2 0/3 优于 localhost3 1/4
            PlacementDecision::Assigned {
                task_id: "task-1".to_string(),
                worker: "localhost2".to_string(),
            },
            // localhost3 占用了 replica-a，localhost2 已为 1/3
            PlacementDecision::Assigned {
                task_id: "task-2".to_string(),
                worker: "localhost2".to_string(),
            },
            // index_kafka 没有Tier规则且需要2个槽位:
            // 只有 localhost1(0/2) 与 localhost3(1/4) 满足
            PlacementDecision::Assigned {
                task_id: "task-3".to_string(),
                worker: "localhost1".to_string(),
            },
        ]
    );
    assert_eq!(report.summary, PlacementSummary { assigned: 3, pending: 0 });
}

#[tokio::test]
async fn test_strong_tier_leaves_tasks_pending() {
    let workers = load_workers(write_temp(WORKERS_JSON).path()).await.unwrap();
    let handle = StrategyHandle::default();
    handle
        .reload_from_json(
            r#"{
                "selectStrategy": {
                    "type": "equalDistributionWithTierSpec",
                    "workerTierSpec": {"strong": true, "tierMap": {"noop": {"defaultTier": "t3"}}}
                }
            }"#,
        )
        .unwrap();

    let strategy = handle.current();
    let tasks = vec![
        TaskDescriptor::new("task-1", "noop", "ds1"),
        TaskDescriptor::new("task-2", "other", "ds1"),
    ];
    let pass = PlacementPass::new(&*strategy, RunnerConfig::default(), workers);
    let report = pass.run(&tasks);

    assert_eq!(report.decisions[0].worker(), None);
    assert_eq!(report.decisions[1].worker(), Some("localhost2"));
    assert_eq!(report.summary, PlacementSummary { assigned: 1, pending: 1 });
}

#[test]
fn test_pass_never_overcommits_a_worker() {
    let workers = build_worker_set(vec![
        WorkerRecord::new("a", "t1", "v1", 2),
        WorkerRecord::new("b", "t1", "v1", 3),
    ])
    .unwrap();
    let strategy = SelectStrategy::default();
    let mut pass = PlacementPass::new(&strategy, RunnerConfig::default(), workers);

    let decisions: Vec<PlacementDecision> = (0..8)
        .map(|i| pass.place(&TaskDescriptor::new(&format!("task-{i}"), "noop", "ds1")))
        .collect();

    let assigned = decisions.iter().filter(|d| d.worker().is_some()).count();
    assert_eq!(assigned, 5);
    assert!(pass
        .workers()
        .values()
        .all(|worker| worker.used_capacity() <= worker.total_capacity()));
    assert_eq!(pass.summary().pending, 3);
}

#[test]
fn test_multi_slot_tasks_never_overcommit() {
    let workers = build_worker_set(vec![WorkerRecord::new("w", "t1", "v1", 3)]).unwrap();
    let strategy = SelectStrategy::default();
    let mut pass = PlacementPass::new(&strategy, RunnerConfig::default(), workers);

    let two_slots =
        |id: &str| TaskDescriptor::new(id, "index_kafka", "ds1").with_required_capacity(2);

    let first = pass.place(&two_slots("a"));
    let second = pass.place(&two_slots("b"));
    let third = pass.place(&TaskDescriptor::new("c", "noop", "ds1"));

    assert_eq!(first.worker(), Some("w"));
    // 只剩1个槽位，放不下第二个2槽位任务
    assert_eq!(second.worker(), None);
    assert_eq!(third.worker(), Some("w"));

    let worker = &pass.workers()["w"];
    assert_eq!(worker.used_capacity(), 3);
    assert_eq!(worker.remaining_capacity(), 0);
    assert_eq!(pass.summary(), &PlacementSummary { assigned: 2, pending: 1 });
}
