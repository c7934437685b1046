//! Orogeny stamping (spec §4.5 step 8): each contiguous boundary run of one
//! class gets traced into a spine, then stamped with a class-specific
//! uplift profile — convergent boundaries get a main belt plus foothills,
//! divergent boundaries a rift trench plus raised shoulders, and transform
//! boundaries a narrow fault ridge.

use crate::buffers::BufferPool;
use crate::kernel::flood::simple_bfs;
use crate::kernel::stamper::{stamp, stamp_orogeny_spine, Falloff, StampAction};
use crate::tile::{BoundaryKind, OrogenyId, OrogenyRecord, PlateId};
use crate::topology::{TileId, Topology};

/// Trace contiguous runs of a single boundary kind into spines via BFS,
/// so a single mountain belt is stamped once along its whole length rather
/// than tile-by-tile.
fn trace_spines(topo: &Topology, boundary_kind: &[BoundaryKind], kind: BoundaryKind, pool: &BufferPool) -> Vec<Vec<TileId>> {
    let n = topo.tile_count();
    let mut visited = pool.rent_bool(n);
    let mut spines = Vec::new();

    for t in 0..n as u32 {
        if visited[t as usize] || boundary_kind[t as usize] != kind {
            continue;
        }
        let spine = simple_bfs(topo, &[t], |nb| boundary_kind[nb as usize] == kind, None, pool);
        for &s in &spine {
            visited[s as usize] = true;
        }
        spines.push(spine);
    }

    pool.return_bool(visited);
    spines
}

/// Stamp uplift for every boundary spine and return the generated
/// [`OrogenyRecord`]s alongside the mutated elevation field (meters).
pub fn stamp_orogenies(
    topo: &Topology,
    plate_id: &[PlateId],
    boundary_kind: &[BoundaryKind],
    elevation_m: &mut [f32],
    pool: &BufferPool,
) -> Vec<OrogenyRecord> {
    let n = topo.tile_count();
    let mut elevation_f64: Vec<f64> = elevation_m.iter().map(|&e| e as f64).collect();
    let mut records = Vec::new();
    let mut next_id: OrogenyId = 0;

    for (kind, main_radius, peak_uplift, falloff) in [
        (BoundaryKind::Convergent, 3u32, 2500.0f64, Falloff::Smoothstep),
        (BoundaryKind::Divergent, 2u32, -1500.0f64, Falloff::Linear),
        (BoundaryKind::Transform, 1u32, 600.0f64, Falloff::Exponential(2.0)),
    ] {
        for spine in trace_spines(topo, boundary_kind, kind, pool) {
            if spine.is_empty() {
                continue;
            }
            stamp_orogeny_spine(topo, &mut elevation_f64, &spine, main_radius, peak_uplift, falloff);

            if kind == BoundaryKind::Convergent {
                // Foothills: a wider, gentler secondary ring beyond the main belt.
                stamp(topo, &mut elevation_f64, &spine, main_radius + 3, peak_uplift * 0.25, Falloff::Linear, StampAction::Add);
            } else if kind == BoundaryKind::Divergent {
                // Raised shoulders flanking the rift trench.
                stamp(topo, &mut elevation_f64, &spine, main_radius + 2, peak_uplift.abs() * 0.2, Falloff::Linear, StampAction::Add);
            }

            let severity: Vec<(TileId, f32)> = spine.iter().map(|&t| (t, peak_uplift.abs() as f32)).collect();
            let parent_boundary_plate = spine.first().map(|&t| plate_id[t as usize]).unwrap_or(-1);
            records.push(OrogenyRecord { id: next_id, parent_boundary_plate, spine, severity });
            next_id += 1;
        }
    }

    for t in 0..n {
        elevation_m[t] = elevation_f64[t] as f32;
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plates::{boundaries::classify_boundaries, fill::major_fill, seed::seed_plates, velocity::random_velocity};
    use crate::rng::WorldRng;

    #[test]
    fn convergent_spines_raise_elevation() {
        let topo = Topology::build(8).unwrap();
        let mut rng = WorldRng::seed(55);
        let seeds = seed_plates(&topo, 6, 0.4, &mut rng).unwrap();
        let plate_id: Vec<PlateId> = major_fill(&topo, &seeds, 0.1, &mut rng).unwrap();
        let velocities: Vec<(f64, f64)> = (0..seeds.len()).map(|_| random_velocity(&mut rng)).collect();
        let kinds = classify_boundaries(&topo, &plate_id, &velocities, 0.525);

        let mut elevation = vec![0.0f32; topo.tile_count()];
        let pool = BufferPool::new();
        let records = stamp_orogenies(&topo, &plate_id, &kinds, &mut elevation, &pool);

        for r in &records {
            for &(t, _) in &r.severity {
                // A stamped spine tile should have moved away from zero.
                assert_ne!(elevation[t as usize], 0.0);
            }
        }
    }
}
