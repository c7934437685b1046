//! Lake filling (spec §4.7): every non-ice land tile with a positive
//! `lake_driver` seeds a fractal flood fill sized `ceil(driver / scale)`
//! tiles, claiming neighboring land and converting the claimed tiles into a
//! lake.

use crate::kernel::flood::{fractal_flood_fill, FillSeed};
use crate::rng::{deterministic_hash, WorldRng};
use crate::tile::{Tile, TileFlags};
use crate::topology::Topology;

const LAKE_SIZE_SCALE: f32 = 4.0;

pub fn fill_lakes(topo: &Topology, tiles: &mut [Tile], rng: &mut WorldRng) {
    let mut fork = rng.fork("hydrology::lakes");
    let pass_seed = fork.next_u64();

    let drivers: Vec<(u32, f32)> = tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_land() && t.ice_thickness <= 0.0 && t.lake_driver > 0.0)
        .map(|(t, tile)| (t as u32, tile.lake_driver))
        .collect();

    let seeds: Vec<FillSeed> = drivers
        .iter()
        .enumerate()
        .map(|(owner, &(tile, driver))| FillSeed {
            tile,
            owner: owner as i32,
            weight: (driver / LAKE_SIZE_SCALE).ceil() as f64,
        })
        .collect();

    if seeds.is_empty() {
        return;
    }

    let total_tiles: usize = seeds.iter().map(|s| s.weight.ceil() as usize).sum();
    let eligible = |t: u32| tiles[t as usize].is_land() && tiles[t as usize].ice_thickness <= 0.0;
    let score_fn = |t: u32, _owner: i32| (deterministic_hash(&(t, pass_seed)) % 100_000) as f64 / 100_000.0;

    let result = fractal_flood_fill(topo, &seeds, total_tiles, eligible, score_fn, 0.1);

    for (t, &owner) in result.owners.iter().enumerate() {
        if owner >= 0 {
            tiles[t].flags.insert(TileFlags::HAS_LAKE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;

    #[test]
    fn pit_tile_becomes_a_lake() {
        let topo = Topology::build(4).unwrap();
        let n = topo.tile_count();
        let mut tiles: Vec<Tile> = (0..n).map(|_| Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0)).collect();
        for t in tiles.iter_mut() {
            t.flags.insert(TileFlags::LAND);
        }
        tiles[0].lake_driver = 20.0;
        let mut rng = WorldRng::seed(5);
        fill_lakes(&topo, &mut tiles, &mut rng);
        assert!(tiles[0].flags.contains(TileFlags::HAS_LAKE));
    }

    #[test]
    fn no_drivers_means_no_lakes() {
        let topo = Topology::build(3).unwrap();
        let n = topo.tile_count();
        let mut tiles: Vec<Tile> = (0..n).map(|_| Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0)).collect();
        for t in tiles.iter_mut() {
            t.flags.insert(TileFlags::LAND);
        }
        let mut rng = WorldRng::seed(5);
        fill_lakes(&topo, &mut tiles, &mut rng);
        assert!(tiles.iter().all(|t| !t.flags.contains(TileFlags::HAS_LAKE)));
    }
}
