//! Runs the spec §8 testable-property battery against an already-generated
//! world snapshot. Exit code 0 if every property holds, 1 otherwise.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use world_core::orchestrator::run_all_checks;
use world_core::snapshot::WorldSnapshot;
use world_core::World;

#[derive(Parser, Debug)]
#[command(name = "worldgen-validate", about = "Check a world snapshot against the testable-property battery")]
struct Args {
    /// Path to a JSON snapshot written by worldgen-cli.
    input: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match validate(&args.input) {
        Ok(true) => {
            eprintln!("all properties hold");
            ExitCode::from(0)
        }
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn validate(input: &str) -> Result<bool> {
    let json = fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let snapshot = WorldSnapshot::from_json(&json).context("parsing snapshot")?;
    let world = World::from_snapshot(snapshot).context("reconstructing world from snapshot")?;

    let microplate_parent = derive_microplate_parents(&world);
    let report = run_all_checks(&world.topo, &world.tiles, world.plates.len(), &microplate_parent, world.params.climate_grid_size);

    if report.ok() {
        Ok(true)
    } else {
        for failure in &report.failures {
            eprintln!("FAIL: {failure}");
        }
        eprintln!("{} of {} properties failed", report.failures.len(), 10);
        Ok(false)
    }
}

fn derive_microplate_parents(world: &World) -> Vec<(i32, i32)> {
    let mut seen = std::collections::HashSet::new();
    let mut pairs = Vec::new();
    for tile in &world.tiles {
        if tile.microplate_id < 0 {
            continue;
        }
        if seen.insert(tile.microplate_id) {
            pairs.push((tile.microplate_id, tile.plate_id));
        }
    }
    pairs
}
