mod common;

use common::{assert_pull_await_bijection, assert_span_invariant, the_command};
use shardplan::engine::build_command_graph;
use shardplan::graph::CommandPayload;
use shardplan::region::Subrange;
use shardplan::types::{NodeId, TaskId, MASTER_NODE};
use shardplan_test_utils::builders::{PlanBuilder, TaskBuilder};

#[test]
fn producer_consumer_pull_roundtrip() {
    // Task "consume" needs [0, 10) of buffer 0, produced on node 0 by task
    // "produce", but computes on node 1.
    let plan = PlanBuilder::new()
        .nodes(2)
        .with_task("produce", TaskBuilder::new().compute(0, &[0], &[10]).build())
        .with_task(
            "consume",
            TaskBuilder::new()
                .after("produce")
                .compute(1, &[0], &[10])
                .pull(0, 0, "produce", Some(1), &[0], &[10])
                .build(),
        )
        .build();

    let cdag = build_command_graph(&plan).unwrap();

    // Task ids follow plan order (sorted by name): "consume" = 0,
    // "produce" = 1.
    let consume = TaskId(0);
    let produce = TaskId(1);
    assert_span_invariant(&cdag, consume);
    assert_span_invariant(&cdag, produce);
    assert_pull_await_bijection(&cdag);
    assert_eq!(cdag.command_count(), 4);

    let producer_cmd = the_command(&cdag, |c| {
        matches!(c.payload, CommandPayload::Compute { .. }) && c.node == NodeId(0)
    });
    let consumer_cmd = the_command(&cdag, |c| {
        matches!(c.payload, CommandPayload::Compute { .. }) && c.node == NodeId(1)
    });
    let pull = the_command(&cdag, |c| matches!(c.payload, CommandPayload::Pull { .. }));
    let await_pull = cdag.sync_counterpart(pull).unwrap();

    let consume_span = cdag.span(consume).unwrap();
    let produce_span = cdag.span(produce).unwrap();

    // Pull immediately before the consuming compute on the requesting side.
    assert!(cdag.graph().find_edge(consume_span.begin, pull).is_some());
    assert!(cdag.graph().find_edge(pull, consumer_cmd).is_some());

    // Await immediately next to the producing compute on the source side.
    assert!(cdag.graph().find_edge(produce_span.begin, await_pull).is_some());
    assert!(cdag.graph().find_edge(await_pull, producer_cmd).is_some());

    // Parent span ordered before child span.
    assert!(cdag
        .graph()
        .find_edge(produce_span.end, consume_span.begin)
        .is_some());

    match cdag.vertex(pull).unwrap().command().unwrap().payload {
        CommandPayload::Pull {
            source, region, ..
        } => {
            assert_eq!(source, NodeId(0));
            assert_eq!(region, Subrange::d1(0, 10).to_box());
        }
        _ => unreachable!(),
    }
}

#[test]
fn master_access_consumer_pulls_onto_the_master() {
    // Task "gather" reads the whole buffer on the master node; the data was
    // produced on node 1.
    let plan = PlanBuilder::new()
        .nodes(2)
        .with_task("produce", TaskBuilder::new().compute(1, &[0], &[10]).build())
        .with_task(
            "gather",
            TaskBuilder::new()
                .after("produce")
                .master_access()
                .pull(0, 1, "produce", None, &[0], &[10])
                .build(),
        )
        .build();

    let cdag = build_command_graph(&plan).unwrap();

    let pull = the_command(&cdag, |c| matches!(c.payload, CommandPayload::Pull { .. }));
    let master_cmd = the_command(&cdag, |c| {
        matches!(c.payload, CommandPayload::MasterAccess)
    });
    let producer_cmd = the_command(&cdag, |c| {
        matches!(c.payload, CommandPayload::Compute { .. })
    });

    // A master-access consumer means the transfer lands on the master node.
    assert_eq!(cdag.vertex(pull).unwrap().command().unwrap().node, MASTER_NODE);
    assert!(cdag.graph().find_edge(pull, master_cmd).is_some());

    let await_pull = cdag.sync_counterpart(pull).unwrap();
    assert!(cdag.graph().find_edge(await_pull, producer_cmd).is_some());
    assert_eq!(
        cdag.vertex(await_pull).unwrap().command().unwrap().node,
        NodeId(1)
    );
}

#[test]
fn shared_parent_children_synthesize_in_one_round() {
    let plan = PlanBuilder::new()
        .nodes(2)
        .with_task("parent", TaskBuilder::new().compute(0, &[0], &[32]).build())
        .with_task(
            "a",
            TaskBuilder::new().after("parent").compute(0, &[0], &[16]).build(),
        )
        .with_task(
            "b",
            TaskBuilder::new().after("parent").compute(1, &[16], &[16]).build(),
        )
        .build();

    let cdag = build_command_graph(&plan).unwrap();

    // Ids in name order: a = 0, b = 1, parent = 2.
    let parent_span = cdag.span(TaskId(2)).unwrap();
    for child in [TaskId(0), TaskId(1)] {
        let child_span = cdag.span(child).unwrap();
        assert!(
            cdag.graph()
                .find_edge(parent_span.end, child_span.begin)
                .is_some(),
            "child span must be ordered after the parent span"
        );
        assert_span_invariant(&cdag, child);
    }
    assert_eq!(cdag.command_count(), 3);
}
