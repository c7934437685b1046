//! River tracing and carving (spec §4.7): starting from high-accumulation
//! land tiles whose steepest-descent path never reaches water, an A*
//! search toward the nearest water or coastal tile finds a route penalized
//! by elevation gain; the path is then carved to a monotonically
//! non-increasing elevation profile and flagged as a river, with high-flow
//! channels additionally widening onto their banks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::sphere::great_circle_distance_rad;
use crate::tile::{Tile, TileFlags};
use crate::topology::{TileId, Topology};

const SOURCE_PERCENTILE: f32 = 0.97;
const MIN_SOURCE_FLOW: f32 = 2.0;
const MAX_DESCENT_STEPS: usize = 64;
const WIDEN_FLOW_THRESHOLD: f32 = 30.0;

struct HeapEntry {
    priority: f64,
    cost: f64,
    tile: TileId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.tile == other.tile
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on priority via reversed comparison; tie-break by tile id
        // for determinism regardless of insertion order.
        other.priority.partial_cmp(&self.priority).unwrap().then_with(|| other.tile.cmp(&self.tile))
    }
}

fn is_water(tiles: &[Tile], t: TileId) -> bool {
    let tile = &tiles[t as usize];
    !tile.is_land() || tile.flags.contains(TileFlags::HAS_LAKE)
}

fn edge_cost(tiles: &[Tile], from: TileId, to: TileId) -> f64 {
    let gain = (tiles[to as usize].elevation_m - tiles[from as usize].elevation_m).max(0.0) as f64;
    1.0 + gain * 0.01
}

/// A* from `source` toward any water tile, using great-circle distance to
/// `hint` as an admissible heuristic (actual edge costs are always >= 1.0
/// per hop, so distance in hop-equivalents never overestimates).
fn astar_to_water(topo: &Topology, tiles: &[Tile], source: TileId, hint: TileId) -> Option<Vec<TileId>> {
    let n = topo.tile_count();
    let mut best_cost = vec![f64::INFINITY; n];
    let mut came_from = vec![u32::MAX; n];
    let hint_pos = topo.position(hint);

    let heuristic = |t: TileId| great_circle_distance_rad(topo.position(t), hint_pos);

    let mut heap = BinaryHeap::new();
    best_cost[source as usize] = 0.0;
    heap.push(HeapEntry { priority: heuristic(source), cost: 0.0, tile: source });

    while let Some(HeapEntry { cost, tile, .. }) = heap.pop() {
        if cost > best_cost[tile as usize] {
            continue;
        }
        if is_water(tiles, tile) {
            let mut path = vec![tile];
            let mut cur = tile;
            while came_from[cur as usize] != u32::MAX {
                cur = came_from[cur as usize];
                path.push(cur);
            }
            path.reverse();
            return Some(path);
        }
        for &nb in topo.neighbors(tile) {
            let next_cost = cost + edge_cost(tiles, tile, nb);
            if next_cost < best_cost[nb as usize] {
                best_cost[nb as usize] = next_cost;
                came_from[nb as usize] = tile;
                heap.push(HeapEntry { priority: next_cost + heuristic(nb), cost: next_cost, tile: nb });
            }
        }
    }
    None
}

fn descent_reaches_water(topo: &Topology, tiles: &[Tile], source: TileId) -> bool {
    let mut cur = source;
    for _ in 0..MAX_DESCENT_STEPS {
        if is_water(tiles, cur) {
            return true;
        }
        let dir = tiles[cur as usize].river_flow_dir;
        if dir < 0 {
            return false;
        }
        let neighbors = topo.neighbors(cur);
        let idx = dir as usize;
        if idx >= neighbors.len() {
            return false;
        }
        cur = neighbors[idx];
    }
    false
}

fn widen(topo: &Topology, tiles: &mut [Tile], t: TileId) {
    if tiles[t as usize].flow_accumulation < WIDEN_FLOW_THRESHOLD {
        return;
    }
    for &nb in topo.neighbors(t).to_vec().iter() {
        if tiles[nb as usize].is_land() {
            tiles[nb as usize].flags.insert(TileFlags::HAS_RIVER);
        }
    }
}

fn mark_river_path_from_descent(topo: &Topology, tiles: &mut [Tile], source: TileId) {
    let mut cur = source;
    for _ in 0..MAX_DESCENT_STEPS {
        tiles[cur as usize].flags.insert(TileFlags::HAS_RIVER);
        widen(topo, tiles, cur);
        if is_water(tiles, cur) {
            break;
        }
        let dir = tiles[cur as usize].river_flow_dir;
        if dir < 0 {
            break;
        }
        let neighbors = topo.neighbors(cur);
        let idx = dir as usize;
        if idx >= neighbors.len() {
            break;
        }
        cur = neighbors[idx];
    }
}

/// Carve a path's elevation to be non-increasing from source to mouth,
/// then flag every land tile on it as a river (and widen high-flow
/// stretches onto their banks).
fn carve_and_flag_path(topo: &Topology, tiles: &mut [Tile], path: &[TileId]) {
    if path.is_empty() {
        return;
    }
    let mut ceiling = tiles[path[0] as usize].elevation_m;
    for &t in path {
        if tiles[t as usize].is_land() {
            if tiles[t as usize].elevation_m > ceiling {
                tiles[t as usize].elevation_m = ceiling;
            }
            ceiling = ceiling.min(tiles[t as usize].elevation_m);
            tiles[t as usize].flags.insert(TileFlags::HAS_RIVER);
            widen(topo, tiles, t);
        } else {
            ceiling = ceiling.min(tiles[t as usize].elevation_m);
        }
    }
}

/// Carve rivers for every land tile whose flow accumulation clears the
/// 97th-percentile threshold (spec §4.7): if its existing downhill chain
/// already reaches water, flag that chain; otherwise route an A* search to
/// the nearest water tile and carve the result monotonic.
pub fn carve_rivers(topo: &Topology, tiles: &mut [Tile]) {
    let mut land_flows: Vec<f32> = tiles.iter().filter(|t| t.is_land()).map(|t| t.flow_accumulation).collect();
    if land_flows.is_empty() {
        return;
    }
    land_flows.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let idx = ((land_flows.len() as f32 - 1.0) * SOURCE_PERCENTILE).round() as usize;
    let threshold = land_flows[idx.min(land_flows.len() - 1)].max(MIN_SOURCE_FLOW);

    let water_tiles: Vec<TileId> = (0..tiles.len() as u32).filter(|&t| is_water(tiles, t)).collect();
    if water_tiles.is_empty() {
        return;
    }

    let sources: Vec<TileId> =
        (0..tiles.len() as u32).filter(|&t| tiles[t as usize].is_land() && tiles[t as usize].flow_accumulation >= threshold).collect();

    for source in sources {
        if descent_reaches_water(topo, tiles, source) {
            mark_river_path_from_descent(topo, tiles, source);
            continue;
        }
        let source_pos = topo.position(source);
        let hint = water_tiles
            .iter()
            .copied()
            .min_by(|&a, &b| {
                let da = great_circle_distance_rad(source_pos, topo.position(a));
                let db = great_circle_distance_rad(source_pos, topo.position(b));
                da.partial_cmp(&db).unwrap()
            })
            .unwrap();
        if let Some(path) = astar_to_water(topo, tiles, source, hint) {
            carve_and_flag_path(topo, tiles, &path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;
    use crate::topology::Topology;

    fn make_tiles(topo: &Topology) -> Vec<Tile> {
        (0..topo.tile_count()).map(|_| Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0)).collect()
    }

    #[test]
    fn high_flow_source_reaches_water_and_is_flagged() {
        let topo = Topology::build(5).unwrap();
        let mut tiles = make_tiles(&topo);
        for t in tiles.iter_mut() {
            t.flags.insert(TileFlags::LAND);
            t.elevation_m = 500.0;
        }
        // Pick a water tile far from the source so the A* search has real
        // work to do.
        let water = topo.tile_count() / 2;
        tiles[water].flags.remove(TileFlags::LAND);
        tiles[water].elevation_m = -10.0;

        let source = 0u32;
        tiles[source as usize].flow_accumulation = 1000.0;

        carve_rivers(&topo, &mut tiles);
        assert!(tiles[source as usize].flags.contains(TileFlags::HAS_RIVER));
    }

    #[test]
    fn no_water_on_planet_is_a_no_op() {
        let topo = Topology::build(3).unwrap();
        let mut tiles = make_tiles(&topo);
        for t in tiles.iter_mut() {
            t.flags.insert(TileFlags::LAND);
            t.flow_accumulation = 100.0;
        }
        carve_rivers(&topo, &mut tiles);
        assert!(tiles.iter().all(|t| !t.flags.contains(TileFlags::HAS_RIVER)));
    }
}
