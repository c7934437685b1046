//! Continental shelves (spec §4.6): from every coastal land tile, three
//! depth layers stamp outward across ocean tiles belonging to the same
//! plate, masked by noise so the shelf edge isn't a perfect ring.

use crate::noise::Expr;
use crate::rng::WorldRng;
use crate::tile::{CrustKind, PlateId};
use crate::topology::{TileId, Topology};

const SHELF_LAYERS: [(u32, f32); 3] = [(2, -100.0), (4, -200.0), (7, -500.0)];

pub fn stamp_shelves(
    topo: &Topology,
    plate_id: &[PlateId],
    crust_kind: &[CrustKind],
    coastal: &[bool],
    elevation_m: &mut [f32],
    rng: &mut WorldRng,
) {
    let mut fork = rng.fork("features::shelves");
    let mask = Expr::leaf(fork.next_u64() as u32, 0.6, 3, 5.0);

    let coastline: Vec<TileId> = (0..topo.tile_count() as u32).filter(|&t| coastal[t as usize]).collect();
    if coastline.is_empty() {
        return;
    }

    for &(radius, depth) in SHELF_LAYERS.iter() {
        let n = topo.tile_count();
        let mut visited = vec![false; n];
        let mut frontier: Vec<TileId> = Vec::new();
        for &c in &coastline {
            if !visited[c as usize] {
                visited[c as usize] = true;
                frontier.push(c);
            }
        }

        let mut hop = 0u32;
        while !frontier.is_empty() && hop < radius {
            let mut next_frontier = Vec::new();
            for &t in &frontier {
                let t_plate = plate_id[t as usize];
                for &nb in topo.neighbors(t) {
                    if visited[nb as usize] {
                        continue;
                    }
                    let is_ocean = crust_kind[nb as usize] != CrustKind::Continental || elevation_m[nb as usize] <= 0.0;
                    if plate_id[nb as usize] != t_plate || !is_ocean {
                        continue;
                    }
                    visited[nb as usize] = true;
                    let p = topo.position(nb);
                    if mask.eval(p) > -0.3 {
                        elevation_m[nb as usize] = elevation_m[nb as usize].max(depth);
                    }
                    next_frontier.push(nb);
                }
            }
            frontier = next_frontier;
            hop += 1;
        }
    }
}
