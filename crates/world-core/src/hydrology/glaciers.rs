//! Fjords and glaciers (spec §4.7): high-latitude coastal tiles seed
//! tapered inland valley traces (fjords), while glacial ice itself is
//! grown via several flood-fill passes whose latitude/elevation gates
//! loosen on each successive pass, so the coldest highest tiles freeze
//! first and the ice sheet grows outward from them.

use crate::kernel::flood::{fractal_flood_fill, FillSeed};
use crate::rng::{deterministic_hash, WorldRng};
use crate::tile::{Tile, TileFlags};
use crate::topology::{TileId, Topology};

const FJORD_MIN_ABS_LAT: f64 = 55.0;
const FJORD_TRACE_LEN: usize = 6;
const FJORD_PEAK_ICE_M: f32 = 80.0;

/// (min abs latitude, min elevation) gate per pass, loosest last so the
/// coldest/highest tiles always freeze in the first pass regardless of
/// later passes' wider reach.
const GLACIER_PASSES: [(f64, f32); 4] = [(85.0, 2500.0), (75.0, 1500.0), (65.0, 500.0), (55.0, 0.0)];
const GLACIER_SEED_GATE_MARGIN: f64 = 5.0;

pub fn trace_glaciers(topo: &Topology, tiles: &mut [Tile], rng: &mut WorldRng) {
    trace_fjords(topo, tiles);
    grow_glacier_ice(topo, tiles, rng);
}

/// Trace a tapered inland valley from every high-latitude coastal tile,
/// stepping to the highest unvisited land neighbor each hop (steepest
/// ascent), which traces the valley walls a glacier would have carved on
/// its way down to the sea.
fn trace_fjords(topo: &Topology, tiles: &mut [Tile]) {
    let candidates: Vec<TileId> = (0..tiles.len() as u32)
        .filter(|&t| {
            let tile = &tiles[t as usize];
            tile.is_land() && tile.flags.contains(TileFlags::COASTAL) && tile.lat.abs() >= FJORD_MIN_ABS_LAT
        })
        .collect();

    for start in candidates {
        let mut path = vec![start];
        let mut visited = vec![false; tiles.len()];
        visited[start as usize] = true;
        let mut cur = start;
        let mut cur_elev = tiles[cur as usize].elevation_m;

        for _ in 1..FJORD_TRACE_LEN {
            let next = topo
                .neighbors(cur)
                .iter()
                .copied()
                .filter(|&nb| !visited[nb as usize] && tiles[nb as usize].is_land())
                .max_by(|&a, &b| tiles[a as usize].elevation_m.partial_cmp(&tiles[b as usize].elevation_m).unwrap());

            match next {
                Some(nb) if tiles[nb as usize].elevation_m > cur_elev => {
                    visited[nb as usize] = true;
                    path.push(nb);
                    cur = nb;
                    cur_elev = tiles[cur as usize].elevation_m;
                }
                _ => break,
            }
        }

        let len = path.len();
        for (i, &t) in path.iter().enumerate() {
            let taper = 1.0 - (i as f32 / len.max(1) as f32);
            tiles[t as usize].ice_thickness = tiles[t as usize].ice_thickness.max(FJORD_PEAK_ICE_M * taper);
            tiles[t as usize].flags.insert(TileFlags::HAS_GLACIER);
        }
    }
}

/// Grow ice sheets via successive flood-fill passes, each gated by a
/// latitude/elevation threshold that loosens pass over pass.
fn grow_glacier_ice(topo: &Topology, tiles: &mut [Tile], rng: &mut WorldRng) {
    let mut fork = rng.fork("hydrology::glaciers");

    for &(min_abs_lat, min_elevation) in GLACIER_PASSES.iter() {
        let pass_seed = fork.next_u64();

        let seed_tiles: Vec<TileId> = (0..tiles.len() as u32)
            .filter(|&t| {
                let tile = &tiles[t as usize];
                tile.lat.abs() >= min_abs_lat && tile.elevation_m >= min_elevation && !tile.flags.contains(TileFlags::HAS_GLACIER)
            })
            .collect();

        if seed_tiles.is_empty() {
            continue;
        }

        let seeds: Vec<FillSeed> =
            seed_tiles.iter().enumerate().map(|(i, &t)| FillSeed { tile: t, owner: i as i32, weight: 1.0 }).collect();

        let eligible_min_lat = min_abs_lat - GLACIER_SEED_GATE_MARGIN;
        let eligible = |t: TileId| tiles[t as usize].lat.abs() >= eligible_min_lat;
        let score_fn = |t: TileId, _owner: i32| (deterministic_hash(&(t, pass_seed)) % 100_000) as f64 / 100_000.0;

        let result = fractal_flood_fill(topo, &seeds, seed_tiles.len(), eligible, score_fn, 0.1);

        for (t, &owner) in result.owners.iter().enumerate() {
            if owner >= 0 {
                tiles[t].flags.insert(TileFlags::HAS_GLACIER);
                tiles[t].ice_thickness = tiles[t].ice_thickness.max(200.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;
    use crate::topology::Topology;

    fn make_tiles(topo: &Topology) -> Vec<Tile> {
        (0..topo.tile_count())
            .map(|t| {
                let pos = topo.position(t as u32);
                Tile::new(pos, false, 0)
            })
            .collect()
    }

    #[test]
    fn polar_tiles_freeze_before_equatorial_ones() {
        let topo = Topology::build(6).unwrap();
        let mut tiles = make_tiles(&topo);
        for t in tiles.iter_mut() {
            t.flags.insert(TileFlags::LAND);
            t.elevation_m = 3000.0;
        }
        let mut rng = WorldRng::seed(11);
        trace_glaciers(&topo, &mut tiles, &mut rng);

        let polar_frozen = tiles.iter().any(|t| t.lat.abs() > 80.0 && t.flags.contains(TileFlags::HAS_GLACIER));
        let equatorial_frozen = tiles.iter().any(|t| t.lat.abs() < 10.0 && t.flags.contains(TileFlags::HAS_GLACIER));
        assert!(polar_frozen);
        assert!(!equatorial_frozen);
    }

    #[test]
    fn deterministic_for_same_seed() {
        let topo = Topology::build(5).unwrap();
        let run = || {
            let mut tiles = make_tiles(&topo);
            for t in tiles.iter_mut() {
                t.flags.insert(TileFlags::LAND);
                t.elevation_m = 3000.0;
            }
            let mut rng = WorldRng::seed(9);
            trace_glaciers(&topo, &mut tiles, &mut rng);
            tiles.iter().map(|t| t.flags.contains(TileFlags::HAS_GLACIER)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
