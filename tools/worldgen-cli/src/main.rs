//! Batch orchestrator runner (spec §6): generates a world from CLI-supplied
//! parameters, streams stage progress to stderr, and writes the resulting
//! snapshot to disk. Exit codes follow spec §6: 0 success, 2 validation
//! failure after retries, 3 cancellation, 4 invalid parameters.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use world_core::error::WorldError;
use world_core::orchestrator::GlobalParams;
use world_core::{new_world_with_progress, World};

#[derive(Parser, Debug)]
#[command(name = "worldgen-cli", about = "Generate a planetary world and write its snapshot to disk")]
struct Args {
    /// Goldberg polyhedron resolution (tile count = 10n^2 + 2).
    #[arg(long, default_value = "40")]
    resolution: usize,

    /// RNG seed driving the whole run.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of tectonic plates.
    #[arg(long, default_value = "12")]
    plate_count: usize,

    /// Fraction of plates seeded as continental.
    #[arg(long, default_value = "0.4")]
    continental_ratio: f32,

    /// Climate grid resolution; must be one of 32, 64, 128.
    #[arg(long, default_value = "64")]
    climate_grid_size: usize,

    /// Output path for the JSON snapshot.
    #[arg(short, long, default_value = "world.json")]
    output: String,
}

fn run(args: Args) -> std::result::Result<World, WorldError> {
    let params = GlobalParams {
        resolution: args.resolution,
        seed: args.seed,
        plate_count: args.plate_count,
        continental_ratio: args.continental_ratio,
        climate_grid_size: args.climate_grid_size,
        ..GlobalParams::default()
    };

    new_world_with_progress(params, |event| {
        eprintln!(
            "[{}] {:?} {}/{} ({:.1?})",
            event.stage, event.state, event.tiles_done, event.tiles_total, event.elapsed
        );
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    let output = args.output.clone();

    match run(args) {
        Ok(world) => match write_snapshot(&world, &output) {
            Ok(()) => {
                eprintln!("wrote {} tiles to {output}", world.tiles.len());
                ExitCode::from(0)
            }
            Err(e) => {
                eprintln!("error writing snapshot: {e:#}");
                ExitCode::from(2)
            }
        },
        Err(WorldError::InvalidParameter { field, reason }) => {
            eprintln!("invalid parameter `{field}`: {reason}");
            ExitCode::from(4)
        }
        Err(WorldError::Cancelled { stage }) => {
            eprintln!("cancelled during stage `{stage}`");
            ExitCode::from(3)
        }
        Err(e) => {
            eprintln!("generation failed: {e}");
            ExitCode::from(2)
        }
    }
}

fn write_snapshot(world: &World, output: &str) -> Result<()> {
    let json = world.to_snapshot().to_json().context("serializing snapshot")?;
    fs::write(output, json).with_context(|| format!("writing {output}"))?;
    Ok(())
}
