//! Planetary world synthesis engine (spec §1-§2): a deterministic pipeline
//! over a hex-sphere tiling — tectonics, surface features, hydrology,
//! climate, and biomes — driven by [`new_world`] and its progress-reporting
//! sibling [`new_world_with_progress`].
//!
//! Every stage reads fields earlier stages wrote and owns only the fields
//! it writes (spec §5); a single [`WorldRng`] root, forked per stage by
//! label, makes the whole run reproducible bit-for-bit from `params.seed`
//! (spec §8 property 1).

pub mod biomes;
pub mod buffers;
pub mod climate;
pub mod error;
pub mod features;
pub mod hydrology;
pub mod kernel;
pub mod noise;
pub mod orchestrator;
pub mod plates;
pub mod rng;
pub mod snapshot;
pub mod sphere;
pub mod tile;
pub mod topology;

use buffers::BufferPool;
use error::{WorldError, WorldResult};
use kernel::stamper::{stamp, Falloff, StampAction};
use orchestrator::{
    ConstraintManager, GlobalParams, LockValue, Orchestrator, ProgressEvent, StageOutcome,
};
use plates::run_tectonics;
use rng::WorldRng;
use tile::{
    BoundaryKind, Hotspot, LockLevel, LockableProperty, OrogenyRecord, Plate, Tile, TileFlags,
    TileId, Volcano, Waterbody,
};
use topology::Topology;

pub use error::Diagnostic;

/// The full generated world: topology, per-tile fields, and every object
/// table a later UI or export step needs (spec §3, §6).
pub struct World {
    pub params: GlobalParams,
    pub topo: Topology,
    pub tiles: Vec<Tile>,
    pub plates: Vec<Plate>,
    pub orogenies: Vec<OrogenyRecord>,
    pub hotspots: Vec<Hotspot>,
    pub volcanoes: Vec<Volcano>,
    pub waterbodies: Vec<Waterbody>,
    pub constraints: ConstraintManager,
    pub diagnostics: Vec<Diagnostic>,
}

impl World {
    /// Land tiles as a fraction of the total (spec §8 S1 "land fraction").
    pub fn land_fraction(&self) -> f64 {
        let land = self.tiles.iter().filter(|t| t.is_land()).count();
        land as f64 / self.tiles.len() as f64
    }

    pub fn to_snapshot(&self) -> snapshot::WorldSnapshot {
        snapshot::WorldSnapshot {
            version: snapshot::SNAPSHOT_VERSION,
            params: self.params.clone(),
            tiles: self.tiles.clone(),
            plates: self.plates.clone(),
            orogenies: self.orogenies.clone(),
            hotspots: self.hotspots.clone(),
            volcanoes: self.volcanoes.clone(),
            waterbodies: self.waterbodies.clone(),
        }
    }

    /// Rebuild a `World` from a snapshot, reconstructing topology (pure
    /// function of `resolution`) rather than persisting it (spec §6).
    pub fn from_snapshot(snapshot: snapshot::WorldSnapshot) -> WorldResult<Self> {
        let topo = Topology::build(snapshot.params.resolution)?;
        if topo.tile_count() != snapshot.tiles.len() {
            return Err(WorldError::InternalAssertion {
                stage: "snapshot",
                tile: None,
                field: "tiles",
                reason: format!(
                    "topology has {} tiles but snapshot has {}",
                    topo.tile_count(),
                    snapshot.tiles.len()
                ),
            });
        }
        Ok(World {
            params: snapshot.params,
            topo,
            tiles: snapshot.tiles,
            plates: snapshot.plates,
            orogenies: snapshot.orogenies,
            hotspots: snapshot.hotspots,
            volcanoes: snapshot.volcanoes,
            waterbodies: snapshot.waterbodies,
            constraints: ConstraintManager::new(),
            diagnostics: Vec::new(),
        })
    }
}

/// Generate a world from scratch with no progress reporting and no locked
/// properties (spec §6 `new_world(params)`).
pub fn new_world(params: GlobalParams) -> WorldResult<World> {
    new_world_with_progress(params, |_| {})
}

const STAGE_ORDER: [&str; 5] = ["tectonics", "features", "hydrology", "climate", "biomes"];

/// Generate a world from scratch, streaming a `{stage, state, tiles_done,
/// tiles_total, elapsed}` progress event after every stage transition, with
/// no locked properties carried in.
pub fn new_world_with_progress(
    params: GlobalParams,
    on_progress: impl FnMut(ProgressEvent),
) -> WorldResult<World> {
    new_world_with_constraints(params, ConstraintManager::new(), on_progress)
}

/// Generate a world, honoring every lock already recorded in `constraints`
/// (spec §4.9, §8 S3/S4): a fully-locked plate id survives a tectonics
/// rerun, and a locked river source whose every neighbor is higher raises a
/// `ConstraintConflict` that fails the hydrology stage rather than silently
/// carving a river uphill. The returned `World.constraints` is the same
/// manager, so callers can inspect or extend it and feed it into another
/// run (spec §6 `run(stages)`).
pub fn new_world_with_constraints(
    params: GlobalParams,
    constraints: ConstraintManager,
    mut on_progress: impl FnMut(ProgressEvent),
) -> WorldResult<World> {
    params.validate()?;
    let topo = Topology::build(params.resolution)?;
    let n = topo.tile_count();
    let flags = params.stage_flags;

    let mut orch = Orchestrator::new(STAGE_ORDER.to_vec());
    let mut base_rng = WorldRng::seed(params.seed);
    let mut diagnostics = Vec::new();
    let pool = BufferPool::new();

    let tectonics = match orch.run_stage(0, n, |_| run_tectonics(&topo, &params, &mut base_rng, &constraints, &pool), &mut on_progress) {
        StageOutcome::Completed(out) => out,
        StageOutcome::Failed(e) => return Err(e),
        StageOutcome::Skipped => unreachable!("tectonics is never skipped"),
    };
    diagnostics.extend(tectonics.diagnostics.iter().cloned());

    let mut tiles: Vec<Tile> = (0..n as u32)
        .map(|t| {
            let mut tile = Tile::new(topo.position(t), topo.is_pentagon[t as usize], topo.face_id[t as usize]);
            tile.plate_id = tectonics.plate_id[t as usize];
            tile.microplate_id = tectonics.microplate_id[t as usize];
            tile.crust_kind = tectonics.crust_kind[t as usize];
            tile.crust_age = tectonics.crust_age[t as usize];
            tile.boundary_kind = tectonics.boundary_kind[t as usize];
            tile.elevation_m = tectonics.elevation_m[t as usize];
            tile.flags.set(TileFlags::PENTAGON, topo.is_pentagon[t as usize]);
            tile.flags.set(TileFlags::BOUNDARY, tile.boundary_kind != BoundaryKind::None);
            tile.flags.set(TileFlags::LAND, plates::is_land(tile.elevation_m, params.sea_level_m));
            tile
        })
        .collect();

    let mut hotspots = Vec::new();
    let mut volcanoes = Vec::new();

    if flags.features {
        let outcome = orch.run_stage(
            1,
            n,
            |_| {
                let out = features::run_features(&topo, &tectonics.plates, &mut tiles, &mut base_rng);
                apply_coastal_boost(&topo, &params, &mut tiles, &mut base_rng);
                Ok::<_, WorldError>(out)
            },
            &mut on_progress,
        );
        match outcome {
            StageOutcome::Completed(out) => {
                hotspots = out.hotspots;
                volcanoes = out.volcanoes;
            }
            StageOutcome::Failed(e) => return Err(e),
            StageOutcome::Skipped => {}
        }
    } else {
        orch.mark_skipped(1);
    }

    let mut waterbodies = Vec::new();
    if flags.hydrology {
        let outcome = orch.run_stage(
            2,
            n,
            |_| {
                let out = hydrology::run_hydrology(&topo, &mut tiles, &mut base_rng, &pool);
                check_river_source_locks(&topo, &tiles, &constraints)?;
                Ok::<_, WorldError>(out)
            },
            &mut on_progress,
        );
        match outcome {
            StageOutcome::Completed(out) => waterbodies = out.waterbodies,
            StageOutcome::Failed(e) => return Err(e),
            StageOutcome::Skipped => {}
        }
    } else {
        orch.mark_skipped(2);
    }

    if flags.climate {
        let outcome = orch.run_stage(
            3,
            n,
            |_| {
                let grid = climate::build_climate_grid(&tiles, params.climate_grid_size, &mut base_rng);
                climate::sample_onto_tiles(&grid, &mut tiles);
                for tile in tiles.iter_mut() {
                    tile.koppen = climate::classify_koppen(tile.temp_jan_c, tile.temp_jul_c, tile.rain_jan_mm, tile.rain_jul_mm);
                }
                features::assign_rock_types(&topo, &mut tiles, &mut base_rng, &pool);
                Ok::<_, WorldError>(())
            },
            &mut on_progress,
        );
        if let StageOutcome::Failed(e) = outcome {
            return Err(e);
        }
    } else {
        orch.mark_skipped(3);
    }

    if flags.biomes {
        let outcome = orch.run_stage(
            4,
            n,
            |_| {
                assign_biomes(&mut tiles, &mut base_rng);
                Ok::<_, WorldError>(())
            },
            &mut on_progress,
        );
        if let StageOutcome::Failed(e) = outcome {
            return Err(e);
        }
    } else {
        orch.mark_skipped(4);
    }

    let microplate_parent = derive_microplate_parents(&tiles);
    let report = orchestrator::run_all_checks(&topo, &tiles, tectonics.plates.len(), &microplate_parent, params.climate_grid_size);
    for failure in &report.failures {
        diagnostics.push(Diagnostic::warning("verify", failure.clone()));
        eprintln!("[verify] {failure}");
    }

    Ok(World {
        params,
        topo,
        tiles,
        plates: tectonics.plates,
        orogenies: tectonics.orogenies,
        hotspots,
        volcanoes,
        waterbodies,
        constraints,
        diagnostics,
    })
}

/// Every distinct `(microplate_id, plate_id)` pair observed on a tile,
/// standing in for the `Vec<Microplate>` parent table (spec §8 property 5):
/// containment is structural by construction, so the tile array itself is
/// the source of truth rather than a separately threaded id table.
fn derive_microplate_parents(tiles: &[Tile]) -> Vec<(i32, i32)> {
    let mut seen = std::collections::HashSet::new();
    let mut pairs = Vec::new();
    for tile in tiles {
        if tile.microplate_id < 0 {
            continue;
        }
        if seen.insert(tile.microplate_id) {
            pairs.push((tile.microplate_id, tile.plate_id));
        }
    }
    pairs
}

/// Raise elevation near every coastal tile within a randomly-drawn radius
/// (spec §6 `coastal_boost_range`/`coastal_boost_height`), giving coastlines
/// more relief than the base tectonic elevation alone produces.
fn apply_coastal_boost(topo: &Topology, params: &GlobalParams, tiles: &mut [Tile], rng: &mut WorldRng) {
    let mut fork = rng.fork("coastal_boost");
    let radius = fork.next_range(params.coastal_boost_range.0 as f64, params.coastal_boost_range.1 as f64).round().max(0.0) as u32;
    if radius == 0 {
        return;
    }
    let centers: Vec<u32> = (0..topo.tile_count() as u32).filter(|&t| tiles[t as usize].flags.contains(TileFlags::COASTAL)).collect();
    if centers.is_empty() {
        return;
    }
    let mut field: Vec<f64> = tiles.iter().map(|t| t.elevation_m as f64).collect();
    stamp(topo, &mut field, &centers, radius, params.coastal_boost_height as f64, Falloff::Smoothstep, StampAction::Add);
    for (tile, &e) in tiles.iter_mut().zip(field.iter()) {
        tile.elevation_m = e as f32;
    }
}

fn assign_biomes(tiles: &mut [Tile], rng: &mut WorldRng) {
    let mut fork = rng.fork("biomes");
    for tile in tiles.iter_mut() {
        if !tile.is_land() {
            continue;
        }
        let weights = biomes::holdridge_flora_weights(
            tile.pos,
            tile.temp_jan_c,
            tile.temp_jul_c,
            tile.rain_jan_mm,
            tile.rain_jul_mm,
            &noise::Fbm::new(fork.next_u64() as u32, 0.6, 3, 4.0),
        );
        tile.flora_forest = weights.forest;
        tile.flora_grass = weights.grass;
        tile.flora_shrub = weights.shrub;
        tile.flora_desert = weights.desert;
        let (biome_id, variant) = biomes::assign_biome(tile);
        tile.biome_id = biome_id;
        tile.biome_variant = variant;
    }
}

/// Check every locked river source against its current neighbor
/// elevations, failing the hydrology stage with a `ConstraintConflict` the
/// first time one lacks a descending neighbor (spec §8 S4).
fn check_river_source_locks(topo: &Topology, tiles: &[Tile], constraints: &ConstraintManager) -> WorldResult<()> {
    for (&(tile, property), _level) in constraints.all_locks() {
        if property != LockableProperty::RiverSource {
            continue;
        }
        let tile_elevation = tiles[tile as usize].elevation_m as f64;
        let neighbor_elevations: Vec<f64> = topo.neighbors(tile).iter().map(|&nb| tiles[nb as usize].elevation_m as f64).collect();
        if let Some(report) = constraints.check_river_source_conflict(tile, tile_elevation, &neighbor_elevations) {
            return Err(WorldError::ConstraintConflict {
                tile: report.tile,
                property: "river_source",
                reason: report.reason,
                suggested_actions: report.suggested_actions,
            });
        }
    }
    Ok(())
}

/// Apply a fully-locked plate id to every tile in `region`, honoring the
/// lock through a subsequent `new_world`/tectonics rerun (spec §8 S3).
pub fn lock_plate_region(constraints: &mut ConstraintManager, region: &[TileId], plate_id: i32) {
    for &t in region {
        constraints.apply_lock(t, LockableProperty::Plate, LockLevel::FullyLocked, LockValue::Id(plate_id), 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_world_generates_without_error() {
        let params = GlobalParams { resolution: 4, plate_count: 4, climate_grid_size: 32, ..GlobalParams::default() };
        let world = new_world(params).unwrap();
        assert_eq!(world.tiles.len(), 10 * 4 * 4 + 2);
        assert!(world.land_fraction() >= 0.0 && world.land_fraction() <= 1.0);
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let params = GlobalParams { resolution: 3, plate_count: 3, climate_grid_size: 32, ..GlobalParams::default() };
        let a = new_world(params.clone()).unwrap();
        let b = new_world(params).unwrap();
        let elev_a: Vec<f32> = a.tiles.iter().map(|t| t.elevation_m).collect();
        let elev_b: Vec<f32> = b.tiles.iter().map(|t| t.elevation_m).collect();
        assert_eq!(elev_a, elev_b);
    }

    #[test]
    fn snapshot_roundtrips_through_world() {
        let params = GlobalParams { resolution: 3, plate_count: 3, climate_grid_size: 32, ..GlobalParams::default() };
        let world = new_world(params).unwrap();
        let snapshot = world.to_snapshot();
        let json = snapshot.to_json().unwrap();
        let restored_snapshot = snapshot::WorldSnapshot::from_json(&json).unwrap();
        let restored = World::from_snapshot(restored_snapshot).unwrap();
        assert_eq!(restored.tiles.len(), world.tiles.len());
    }

    #[test]
    fn invalid_parameters_are_rejected_before_any_tile_work() {
        let params = GlobalParams { resolution: 0, ..GlobalParams::default() };
        assert!(matches!(new_world(params), Err(WorldError::InvalidParameter { .. })));
    }

    #[test]
    fn locked_plate_region_survives_a_tectonics_rerun() {
        let params = GlobalParams { resolution: 4, plate_count: 4, climate_grid_size: 32, ..GlobalParams::default() };
        let mut constraints = ConstraintManager::new();
        let region: Vec<TileId> = (0..20).collect();
        lock_plate_region(&mut constraints, &region, 0);
        let world = new_world_with_constraints(params, constraints, |_| {}).unwrap();
        for &t in &region {
            assert_eq!(world.tiles[t as usize].plate_id, 0);
        }
    }

    #[test]
    fn river_source_lock_without_descending_neighbor_is_a_conflict() {
        let topo = Topology::build(3).unwrap();
        let mut tiles: Vec<Tile> = (0..topo.tile_count()).map(|_| Tile::new(sphere::Vec3::new(1.0, 0.0, 0.0), false, 0)).collect();
        for tile in tiles.iter_mut() {
            tile.elevation_m = 500.0;
        }
        tiles[0].elevation_m = 100.0;

        let mut constraints = ConstraintManager::new();
        constraints.apply_lock(0, LockableProperty::RiverSource, LockLevel::FullyLocked, LockValue::Id(1), 0.0);

        let result = check_river_source_locks(&topo, &tiles, &constraints);
        assert!(matches!(result, Err(WorldError::ConstraintConflict { .. })));
    }

    #[test]
    fn river_source_lock_with_descending_neighbor_is_no_conflict() {
        let topo = Topology::build(3).unwrap();
        let mut tiles: Vec<Tile> = (0..topo.tile_count()).map(|_| Tile::new(sphere::Vec3::new(1.0, 0.0, 0.0), false, 0)).collect();
        for tile in tiles.iter_mut() {
            tile.elevation_m = 500.0;
        }
        tiles[0].elevation_m = 100.0;
        let nb = topo.neighbors(0)[0];
        tiles[nb as usize].elevation_m = 50.0;

        let mut constraints = ConstraintManager::new();
        constraints.apply_lock(0, LockableProperty::RiverSource, LockLevel::FullyLocked, LockValue::Id(1), 0.0);

        assert!(check_river_source_locks(&topo, &tiles, &constraints).is_ok());
    }
}
