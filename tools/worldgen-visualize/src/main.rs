//! PNG export of a generated world (spec §6): equirectangular projection of
//! one per-tile layer — elevation, plate id, biome, or Koppen class — onto
//! a raster image via the `image` crate, the same way the teacher's own
//! `tools/visualize` rasterizes height fields.

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::{Rgb, RgbImage};
use world_core::snapshot::WorldSnapshot;
use world_core::tile::Tile;
use world_core::World;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Layer {
    Elevation,
    Plate,
    Biome,
    Koppen,
}

#[derive(Parser, Debug)]
#[command(name = "worldgen-visualize", about = "Render a world snapshot layer to PNG")]
struct Args {
    /// Path to a JSON snapshot written by worldgen-cli.
    input: String,

    /// Output PNG path.
    #[arg(short, long, default_value = "world.png")]
    output: String,

    #[arg(short, long, value_enum, default_value_t = Layer::Elevation)]
    layer: Layer,

    #[arg(long, default_value = "1024")]
    width: u32,

    #[arg(long, default_value = "512")]
    height: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let json = fs::read_to_string(&args.input).with_context(|| format!("reading {}", args.input))?;
    let snapshot = WorldSnapshot::from_json(&json).context("parsing snapshot")?;
    let world = World::from_snapshot(snapshot).context("reconstructing world from snapshot")?;

    let mut img = RgbImage::new(args.width, args.height);
    for py in 0..args.height {
        let lat = std::f64::consts::FRAC_PI_2 - (py as f64 + 0.5) / args.height as f64 * std::f64::consts::PI;
        for px in 0..args.width {
            let lon = (px as f64 + 0.5) / args.width as f64 * 2.0 * std::f64::consts::PI - std::f64::consts::PI;
            let t = world.topo.tile_at(lat, lon);
            let color = pixel_color(&world.tiles[t as usize], args.layer);
            img.put_pixel(px, py, color);
        }
    }

    img.save(&args.output).with_context(|| format!("writing {}", args.output))?;
    eprintln!("wrote {}x{} image to {}", args.width, args.height, args.output);
    Ok(())
}

fn pixel_color(tile: &Tile, layer: Layer) -> Rgb<u8> {
    match layer {
        Layer::Elevation => elevation_color(tile.elevation_m),
        Layer::Plate => id_color(tile.plate_id),
        Layer::Biome => id_color(tile.biome_id as i32),
        Layer::Koppen => id_color(tile.koppen as i32),
    }
}

/// Blue-to-green-to-brown-to-white ramp, clamped at +/- 6000 m.
fn elevation_color(elevation_m: f32) -> Rgb<u8> {
    let t = (elevation_m / 6000.0).clamp(-1.0, 1.0);
    if t < 0.0 {
        let depth = (-t * 255.0) as u8;
        Rgb([0, 0, 128u8.saturating_add(255 - depth)])
    } else if t < 0.5 {
        let s = (t / 0.5 * 255.0) as u8;
        Rgb([40, 120 + s / 2, 40])
    } else {
        let s = ((t - 0.5) / 0.5 * 255.0) as u8;
        Rgb([120 + s / 3, 90 + s / 3, 60 + s / 3])
    }
}

/// Deterministic distinct-ish color from any small integer id, via the same
/// FNV-style mixing the RNG module uses for labels.
fn id_color(id: i32) -> Rgb<u8> {
    if id < 0 {
        return Rgb([20, 20, 20]);
    }
    let h = world_core::rng::deterministic_hash(&id);
    Rgb([(h & 0xFF) as u8, ((h >> 8) & 0xFF) as u8, ((h >> 16) & 0xFF) as u8])
}
