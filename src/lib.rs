// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod export;
pub mod graph;
pub mod logging;
pub mod region;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::PlanFile;
use crate::export::{export_command_graph, export_task_graph, TracingSink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan loading + validation
/// - the synthesis engine
/// - diagnostic graph export
pub fn run(args: CliArgs) -> Result<()> {
    let plan = load_and_validate(&args.plan)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(());
    }

    // Pre-synthesis snapshot of the dependency structure, for diagnostics.
    let (tdag, _ids) = engine::build_task_graph(&plan)?;
    let cdag = engine::build_command_graph(&plan)?;

    let mut sink = TracingSink;
    export_task_graph(&tdag, &mut sink);
    export_command_graph(&cdag, &mut sink);

    if args.emit_dot {
        println!("{}", export::command_graph_dot(&cdag));
    }

    info!(
        tasks = plan.task.len(),
        commands = cdag.command_count(),
        "synthesis finished"
    );
    Ok(())
}

/// Simple dry-run output: print tasks, dependencies and declared commands.
fn print_dry_run(plan: &PlanFile) {
    println!("shardplan dry-run");
    println!("  config.nodes = {}", plan.config.nodes);
    println!();

    println!("tasks ({}):", plan.task.len());
    for (name, task) in plan.task.iter() {
        println!("  - {name}");
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        for c in task.compute.iter() {
            println!(
                "      compute: node {} offset {:?} range {:?}",
                c.node, c.offset, c.range
            );
        }
        if task.master_access {
            println!("      master_access: true");
        }
        for p in task.pull.iter() {
            println!(
                "      pull: buffer {} from node {} (task '{}')",
                p.buffer, p.source_node, p.source_task
            );
        }
    }

    debug!("dry-run complete (no synthesis)");
}
