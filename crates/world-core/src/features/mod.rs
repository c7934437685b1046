//! Surface features (spec §4.6): coastal flagging, hotspots, volcanism,
//! continental shelves, and ancient relict uplifts, run in that order once
//! tectonics has produced plate/crust/elevation data. Rock typing lives in
//! this module's directory for grounding but runs later, after climate —
//! see `rocks::assign_rock_types`, called directly from the crate root.

mod ancient;
mod hotspots;
mod rocks;
mod shelves;
mod volcanism;

pub use ancient::scatter_ancient_uplifts;
pub use hotspots::trace_hotspots;
pub use rocks::assign_rock_types;
pub use shelves::stamp_shelves;
pub use volcanism::spawn_volcanoes;

use crate::rng::WorldRng;
use crate::tile::{Hotspot, Plate, Tile, TileFlags, Volcano, VolcanoId};
use crate::topology::Topology;

/// Flag every land tile with at least one ocean (or below-sea-level)
/// neighbor as coastal. Must run before shelves (which expands from the
/// coastline) and before glacier fjord tracing (spec §4.7), both of which
/// read `TileFlags::COASTAL`.
pub fn mark_coastal_tiles(topo: &Topology, tiles: &mut [Tile]) {
    let n = tiles.len();
    let mut coastal = vec![false; n];
    for t in 0..n as u32 {
        if !tiles[t as usize].is_land() {
            continue;
        }
        if topo.neighbors(t).iter().any(|&nb| !tiles[nb as usize].is_land()) {
            coastal[t as usize] = true;
        }
    }
    for (t, tile) in tiles.iter_mut().enumerate() {
        tile.flags.set(TileFlags::COASTAL, coastal[t]);
    }
}

pub struct FeaturesOutput {
    pub hotspots: Vec<Hotspot>,
    pub volcanoes: Vec<Volcano>,
}

/// Run every features-stage sub-pass except rock typing, which is deferred
/// to after climate (spec §4.6, §5 stage ordering).
pub fn run_features(topo: &Topology, plates: &[Plate], tiles: &mut [Tile], rng: &mut WorldRng) -> FeaturesOutput {
    mark_coastal_tiles(topo, tiles);

    let n = tiles.len();
    let plate_id: Vec<i32> = tiles.iter().map(|t| t.plate_id).collect();
    let mut elevation_m: Vec<f32> = tiles.iter().map(|t| t.elevation_m).collect();
    let boundary_kind: Vec<_> = tiles.iter().map(|t| t.boundary_kind).collect();
    let crust_kind: Vec<_> = tiles.iter().map(|t| t.crust_kind).collect();
    let crust_age: Vec<f32> = tiles.iter().map(|t| t.crust_age).collect();
    let coastal: Vec<bool> = tiles.iter().map(|t| t.flags.contains(TileFlags::COASTAL)).collect();

    let mut fork = rng.fork("features");
    let (hotspots, mut volcanoes) = trace_hotspots(topo, &plate_id, plates, &mut fork);

    let mut next_volcano_id: VolcanoId = volcanoes.len() as VolcanoId;
    let boundary_volcanoes = spawn_volcanoes(topo, &boundary_kind, &crust_kind, &mut next_volcano_id, &mut fork);
    volcanoes.extend(boundary_volcanoes);

    stamp_shelves(topo, &plate_id, &crust_kind, &coastal, &mut elevation_m, &mut fork);
    scatter_ancient_uplifts(topo, &crust_kind, &crust_age, &mut elevation_m, &mut fork);

    for (t, tile) in tiles.iter_mut().enumerate() {
        tile.elevation_m = elevation_m[t];
    }
    for h in &hotspots {
        for &t in &h.track {
            tiles[t as usize].feature_kind = crate::tile::FeatureKind::Hotspot;
        }
    }
    for v in &volcanoes {
        tiles[v.tile as usize].feature_kind = crate::tile::FeatureKind::Volcano;
    }

    debug_assert_eq!(tiles.len(), n);
    FeaturesOutput { hotspots, volcanoes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;

    #[test]
    fn coastal_flag_only_touches_land_adjacent_to_ocean() {
        let topo = Topology::build(4).unwrap();
        let n = topo.tile_count();
        let mut tiles: Vec<Tile> = (0..n).map(|_| Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0)).collect();
        tiles[0].flags.insert(TileFlags::LAND);

        mark_coastal_tiles(&topo, &mut tiles);
        assert!(tiles[0].flags.contains(TileFlags::COASTAL));
        for &nb in topo.neighbors(0) {
            assert!(!tiles[nb as usize].flags.contains(TileFlags::COASTAL));
        }
    }

    #[test]
    fn all_land_world_has_no_coastal_tiles() {
        let topo = Topology::build(3).unwrap();
        let n = topo.tile_count();
        let mut tiles: Vec<Tile> = (0..n).map(|_| Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0)).collect();
        for t in tiles.iter_mut() {
            t.flags.insert(TileFlags::LAND);
        }
        mark_coastal_tiles(&topo, &mut tiles);
        assert!(tiles.iter().all(|t| !t.flags.contains(TileFlags::COASTAL)));
    }
}
