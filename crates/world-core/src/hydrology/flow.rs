//! Flow accumulation (spec §4.7): land tiles process in descending
//! elevation order, each transferring its accumulated flow (not adding to
//! it) onto its single strictly-lowest neighbor; a tile with no
//! strictly-lower neighbor is a local sink candidate for the lake pass.

use crate::tile::Tile;
use crate::topology::Topology;

pub fn compute_flow_accumulation(topo: &Topology, tiles: &mut [Tile]) {
    let n = tiles.len();
    for t in tiles.iter_mut() {
        t.flow_accumulation = if t.is_land() { 1.0 } else { 0.0 };
        t.river_flow_dir = -1;
        t.lake_driver = 0.0;
    }

    let mut order: Vec<u32> = (0..n as u32).filter(|&t| tiles[t as usize].is_land()).collect();
    order.sort_by(|&a, &b| tiles[b as usize].elevation_m.partial_cmp(&tiles[a as usize].elevation_m).unwrap());

    for &t in &order {
        let elevation = tiles[t as usize].elevation_m;
        let neighbors = topo.neighbors(t).to_vec();

        let mut lowest_idx: Option<usize> = None;
        let mut lowest_elevation = elevation;
        for (i, &nb) in neighbors.iter().enumerate() {
            let nb_elev = tiles[nb as usize].elevation_m;
            if nb_elev < lowest_elevation {
                lowest_elevation = nb_elev;
                lowest_idx = Some(i);
            }
        }

        match lowest_idx {
            Some(idx) => {
                tiles[t as usize].river_flow_dir = idx as i32;
                let accum = tiles[t as usize].flow_accumulation;
                let target = neighbors[idx];
                tiles[target as usize].flow_accumulation = accum;
            }
            None => {
                tiles[t as usize].lake_driver = tiles[t as usize].flow_accumulation;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;
    use crate::tile::TileFlags;

    fn land(elevation_m: f32) -> Tile {
        let mut t = Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0);
        t.flags.insert(TileFlags::LAND);
        t.elevation_m = elevation_m;
        t
    }

    #[test]
    fn pit_tile_records_a_lake_driver() {
        let topo = Topology::build(4).unwrap();
        let n = topo.tile_count();
        let mut tiles: Vec<Tile> = (0..n).map(|_| land(100.0)).collect();
        // Make tile 0 a local pit: every neighbor strictly higher.
        for &nb in topo.neighbors(0) {
            tiles[nb as usize].elevation_m = 500.0;
        }
        compute_flow_accumulation(&topo, &mut tiles);
        assert!(tiles[0].lake_driver > 0.0);
        assert_eq!(tiles[0].river_flow_dir, -1);
    }

    #[test]
    fn flow_transfers_by_assignment_not_addition() {
        let topo = Topology::build(4).unwrap();
        let n = topo.tile_count();
        let mut tiles: Vec<Tile> = (0..n).map(|_| land(1000.0)).collect();

        // `d` is the strictly-lowest neighbor of two tributaries; if flow
        // were summed onto it, it would end up at 1.0 (own) + 1.0 + 1.0 =
        // 3.0. Assignment means only the last-processed tributary's value
        // survives.
        let d = 0u32;
        tiles[d as usize].elevation_m = 0.0;
        let neighbors = topo.neighbors(d).to_vec();
        assert!(neighbors.len() >= 2);
        tiles[neighbors[0] as usize].elevation_m = 100.0;
        tiles[neighbors[1] as usize].elevation_m = 100.0;

        compute_flow_accumulation(&topo, &mut tiles);
        assert_eq!(tiles[d as usize].flow_accumulation, 1.0);
    }
}
