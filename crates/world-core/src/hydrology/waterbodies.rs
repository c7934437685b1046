//! Final waterbody pass (spec §4.7): every maximal connected component of
//! water tiles (ocean or lake) gets a stable id, its member tile list, and
//! its perimeter (every member tile with at least one land neighbor).

use crate::buffers::BufferPool;
use crate::kernel::flood::simple_bfs;
use crate::tile::{Tile, TileFlags, Waterbody, WaterbodyId};
use crate::topology::{TileId, Topology};

fn is_water(tiles: &[Tile], t: TileId) -> bool {
    let tile = &tiles[t as usize];
    !tile.is_land() || tile.flags.contains(TileFlags::HAS_LAKE)
}

pub fn collect_waterbodies(topo: &Topology, tiles: &mut [Tile], pool: &BufferPool) -> Vec<Waterbody> {
    let n = tiles.len();
    let mut assigned = pool.rent_bool(n);
    let mut waterbodies = Vec::new();
    let mut next_id: WaterbodyId = 0;

    for start in 0..n as u32 {
        if assigned[start as usize] || !is_water(tiles, start) {
            continue;
        }

        let component = simple_bfs(topo, &[start], |t| is_water(tiles, t), None, pool);
        for &t in &component {
            assigned[t as usize] = true;
        }

        let is_lake = tiles[start as usize].flags.contains(TileFlags::HAS_LAKE);
        let perimeter: Vec<TileId> = component
            .iter()
            .copied()
            .filter(|&t| topo.neighbors(t).iter().any(|&nb| !is_water(tiles, nb)))
            .collect();

        for &t in &component {
            tiles[t as usize].waterbody_id = Some(next_id);
        }

        waterbodies.push(Waterbody { id: next_id, tiles: component, perimeter, is_lake });
        next_id += 1;
    }

    pool.return_bool(assigned);
    waterbodies
}
