use shardplan::config::loader::{load_and_validate, load_from_path};
use shardplan::errors::ShardplanError;
use shardplan_test_utils::builders::{PlanBuilder, TaskBuilder};

fn write_plan(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("Shardplan.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_and_validates_a_well_formed_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plan(
        &dir,
        r#"
[config]
nodes = 2

[task.produce]
[[task.produce.compute]]
node = 0
offset = [0]
range = [10]

[task.consume]
after = ["produce"]
[[task.consume.compute]]
node = 1
offset = [0]
range = [10]
[[task.consume.pull]]
buffer = 0
source_node = 0
source_task = "produce"
node = 1
offset = [0]
range = [10]
"#,
    );

    let plan = load_and_validate(&path).unwrap();
    assert_eq!(plan.config.nodes, 2);
    assert_eq!(plan.task.len(), 2);
    assert_eq!(plan.task["consume"].pull.len(), 1);
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plan(&dir, "[task.broken\nnodes = ");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ShardplanError::TomlError(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ShardplanError::IoError(_)));
}

#[test]
fn empty_plan_is_rejected() {
    let err = PlanBuilder::new().try_build().unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn dependency_cycles_are_rejected() {
    let err = PlanBuilder::new()
        .with_task(
            "a",
            TaskBuilder::new().after("b").compute(0, &[0], &[1]).build(),
        )
        .with_task(
            "b",
            TaskBuilder::new().after("a").compute(0, &[0], &[1]).build(),
        )
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::DagCycle(_)));
}

#[test]
fn unknown_dependency_is_rejected() {
    let err = PlanBuilder::new()
        .with_task(
            "a",
            TaskBuilder::new().after("ghost").compute(0, &[0], &[1]).build(),
        )
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn compute_node_out_of_range_is_rejected() {
    let err = PlanBuilder::new()
        .nodes(2)
        .with_task("a", TaskBuilder::new().compute(2, &[0], &[1]).build())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn duplicate_compute_node_is_rejected() {
    let err = PlanBuilder::new()
        .nodes(2)
        .with_task(
            "a",
            TaskBuilder::new()
                .compute(1, &[0], &[8])
                .compute(1, &[8], &[8])
                .build(),
        )
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn empty_chunk_is_rejected() {
    let err = PlanBuilder::new()
        .with_task("a", TaskBuilder::new().compute(0, &[0], &[0]).build())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn task_without_commands_is_rejected() {
    let err = PlanBuilder::new()
        .with_task("a", TaskBuilder::new().build())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn pull_from_non_ancestor_is_rejected() {
    // "b" is unrelated to "a", so it cannot serve a transfer for it.
    let err = PlanBuilder::new()
        .nodes(2)
        .with_task("a", TaskBuilder::new().compute(0, &[0], &[1]).build())
        .with_task(
            "b",
            TaskBuilder::new()
                .compute(1, &[0], &[1])
                .pull(0, 0, "a", Some(1), &[0], &[1])
                .build(),
        )
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn pull_without_consuming_command_is_rejected() {
    // Pull targets node 0 but the task only computes on node 1.
    let err = PlanBuilder::new()
        .nodes(2)
        .with_task("p", TaskBuilder::new().compute(0, &[0], &[1]).build())
        .with_task(
            "c",
            TaskBuilder::new()
                .after("p")
                .compute(1, &[0], &[1])
                .pull(0, 0, "p", Some(0), &[0], &[1])
                .build(),
        )
        .try_build()
        .unwrap_err();
    assert!(matches!(err, ShardplanError::PlanError(_)));
}

#[test]
fn transitive_ancestor_may_serve_pulls() {
    // a -> b -> c; c pulls from a.
    let plan = PlanBuilder::new()
        .nodes(2)
        .with_task("a", TaskBuilder::new().compute(0, &[0], &[4]).build())
        .with_task(
            "b",
            TaskBuilder::new().after("a").compute(0, &[0], &[4]).build(),
        )
        .with_task(
            "c",
            TaskBuilder::new()
                .after("b")
                .compute(1, &[0], &[4])
                .pull(0, 0, "a", Some(1), &[0], &[4])
                .build(),
        )
        .try_build();
    assert!(plan.is_ok());
}
