//! Rock typing (spec §4.6): a sequential rule cascade assigns every tile a
//! first-pass `RockType` from its tectonic and climate context, then a
//! brush-stamped province pass spreads a handful of dominant types across
//! their neighborhoods so outcrops read as regions rather than single-tile
//! noise. Runs after climate (it reads `rain_*_mm`) and is invoked directly
//! from the crate root rather than from `features::run_features`.

use crate::buffers::BufferPool;
use crate::kernel::flood::simple_bfs;
use crate::rng::WorldRng;
use crate::tile::{CrustKind, FeatureKind, RockType, Tile};
use crate::topology::Topology;

const PROVINCE_COUNT_PER_TILE: f64 = 1.0 / 500.0;

fn classify_one(tile: &Tile, rng: &mut WorldRng) -> RockType {
    if !tile.is_land() {
        return RockType::SeaFloorSediment;
    }
    if tile.ice_thickness > 0.0 {
        return RockType::GlacialTill;
    }
    if tile.flow_accumulation > 0.0 && tile.elevation_m < 50.0 {
        return RockType::Alluvium;
    }
    if tile.organic > 0.6 {
        return RockType::Peat;
    }

    match tile.feature_kind {
        FeatureKind::Volcano | FeatureKind::Hotspot => {
            let pool = [RockType::Basalt, RockType::Andesite, RockType::Rhyolite, RockType::Obsidian, RockType::Pumice, RockType::Tuff];
            return pool[rng.next_index(pool.len())];
        }
        FeatureKind::OrogenyBelt | FeatureKind::AncientOrogeny | FeatureKind::AncientUplift => {
            let pool = [RockType::Slate, RockType::Phyllite, RockType::Schist, RockType::Gneiss, RockType::Marble, RockType::Quartzite, RockType::Amphibolite, RockType::Eclogite];
            return pool[rng.next_index(pool.len())];
        }
        _ => {}
    }

    if tile.crust_kind == CrustKind::Continental {
        let annual_rain = tile.rain_jan_mm + tile.rain_jul_mm;
        if annual_rain < 300.0 {
            let pool = [RockType::Evaporite, RockType::Chert, RockType::Dolomite, RockType::Chalk];
            pool[rng.next_index(pool.len())]
        } else if annual_rain > 1500.0 {
            let pool = [RockType::Shale, RockType::Sandstone, RockType::Mudstone, RockType::Coal, RockType::Limestone];
            pool[rng.next_index(pool.len())]
        } else if tile.crust_age > 500.0 {
            RockType::Granite
        } else {
            let pool = [RockType::Sandstone, RockType::Siltstone, RockType::Conglomerate, RockType::Limestone];
            pool[rng.next_index(pool.len())]
        }
    } else if tile.crust_age > 120.0 {
        RockType::Gabbro
    } else if tile.crust_age > 250.0 {
        RockType::Peridotite
    } else {
        RockType::Basalt
    }
}

/// Rule-cascade first pass: every tile's context fully determines a
/// category-weighted random draw, so the output is deterministic for a
/// given rng stream but still varied within a category.
fn classify_pass(tiles: &mut [Tile], rng: &mut WorldRng) {
    for tile in tiles.iter_mut() {
        tile.rock_type = classify_one(tile, rng);
    }
}

/// Province pass: pick a handful of seed tiles and flood their rock type
/// out across same-category neighbors so a region reads as one outcrop
/// instead of tile-by-tile noise.
fn province_pass(topo: &Topology, tiles: &mut [Tile], rng: &mut WorldRng, pool: &BufferPool) {
    let n = tiles.len();
    let count = ((n as f64) * PROVINCE_COUNT_PER_TILE).round().max(1.0) as usize;

    for _ in 0..count {
        let seed = rng.next_index(n) as u32;
        let seed_kind = tiles[seed as usize].rock_type;
        let seed_land = tiles[seed as usize].is_land();
        let region = simple_bfs(
            topo,
            &[seed],
            |t| tiles[t as usize].is_land() == seed_land,
            Some(40),
            pool,
        );
        for &t in &region {
            tiles[t as usize].rock_type = seed_kind;
        }
    }
}

pub fn assign_rock_types(topo: &Topology, tiles: &mut [Tile], rng: &mut WorldRng, pool: &BufferPool) {
    let mut fork = rng.fork("features::rocks");
    classify_pass(tiles, &mut fork);
    province_pass(topo, tiles, &mut fork, pool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;

    fn make_tiles(topo: &Topology) -> Vec<Tile> {
        (0..topo.tile_count()).map(|_| Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0)).collect()
    }

    #[test]
    fn every_tile_gets_assigned() {
        let topo = Topology::build(4).unwrap();
        let mut tiles = make_tiles(&topo);
        for t in tiles.iter_mut() {
            t.flags.insert(crate::tile::TileFlags::LAND);
            t.crust_kind = CrustKind::Continental;
        }
        let mut rng = WorldRng::seed(9);
        let pool = BufferPool::new();
        assign_rock_types(&topo, &mut tiles, &mut rng, &pool);
        assert!(tiles.iter().all(|t| t.rock_type != RockType::Unassigned));
    }

    #[test]
    fn ocean_tiles_get_sea_floor_sediment_by_default() {
        let topo = Topology::build(3).unwrap();
        let mut tiles = make_tiles(&topo);
        let mut rng = WorldRng::seed(5);
        let pool = BufferPool::new();
        assign_rock_types(&topo, &mut tiles, &mut rng, &pool);
        assert!(tiles.iter().any(|t| t.rock_type == RockType::SeaFloorSediment));
    }

    #[test]
    fn deterministic_for_same_seed() {
        let topo = Topology::build(4).unwrap();
        let run = || {
            let mut tiles = make_tiles(&topo);
            for t in tiles.iter_mut() {
                t.flags.insert(crate::tile::TileFlags::LAND);
                t.crust_kind = CrustKind::Continental;
            }
            let mut rng = WorldRng::seed(11);
            let pool = BufferPool::new();
            assign_rock_types(&topo, &mut tiles, &mut rng, &pool);
            tiles.into_iter().map(|t| t.rock_type).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
