//! Crust age (spec §4.5 step 6): age grows with geodesic distance from the
//! nearest divergent boundary, blocked from crossing plate edges, and
//! saturates at `1.0` (normalized "ancient crust" age).

use crate::rng::WorldRng;
use crate::sphere::great_circle_distance_rad;
use crate::tile::{BoundaryKind, PlateId};
use crate::topology::{TileId, Topology};

use crate::kernel::dijkstra::weighted_cost_field;

/// Compute normalized crust age per tile. Divergent-boundary tiles are the
/// zero-age sources; the field propagates outward weighted by great-circle
/// distance times `crust_age_spread`, blocked at plate boundaries by an
/// infinite edge cost. Tiles unreachable from any divergent boundary (e.g.
/// a plate with no divergent edge) default to fully-aged crust (`1.0`).
pub fn compute_crust_age(
    topo: &Topology,
    plate_id: &[PlateId],
    boundary_kind: &[BoundaryKind],
    crust_age_spread: f32,
    rng: &mut WorldRng,
) -> Vec<f32> {
    let n = topo.tile_count();

    let mut divergent_tiles: Vec<TileId> =
        (0..n as u32).filter(|&t| boundary_kind[t as usize] == BoundaryKind::Divergent).collect();
    // Fisher-Yates shuffle the source order so ties in the Dijkstra frontier
    // are broken in a deterministic-but-decorrelated way rather than by
    // raw tile id order alone.
    let mut fork = rng.fork("plates::crust_age");
    let len = divergent_tiles.len();
    for i in (1..len).rev() {
        let j = fork.next_index(i + 1);
        divergent_tiles.swap(i, j);
    }

    if divergent_tiles.is_empty() {
        return vec![1.0; n];
    }

    let sources: Vec<(TileId, f64)> = divergent_tiles.iter().map(|&t| (t, 0.0)).collect();

    let edge_cost = |from: TileId, to: TileId| -> f64 {
        if plate_id[from as usize] != plate_id[to as usize] {
            return f64::INFINITY;
        }
        let a = topo.position(from);
        let b = topo.position(to);
        great_circle_distance_rad(a, b) * crust_age_spread as f64
    };

    let dist = weighted_cost_field(topo, &sources, edge_cost, |_, _| {});

    dist.into_iter()
        .map(|d| if d.is_finite() { (d as f32).min(1.0) } else { 1.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plates::{boundaries::classify_boundaries, fill::major_fill, seed::seed_plates, velocity::random_velocity};
    use crate::tile::PlateId;

    #[test]
    fn divergent_tiles_have_zero_age_and_ages_are_bounded() {
        let topo = Topology::build(8).unwrap();
        let mut rng = WorldRng::seed(33);
        let seeds = seed_plates(&topo, 6, 0.4, &mut rng).unwrap();
        let plate_id: Vec<PlateId> = major_fill(&topo, &seeds, 0.1, &mut rng).unwrap();
        let velocities: Vec<(f64, f64)> = (0..seeds.len()).map(|_| random_velocity(&mut rng)).collect();
        let kinds = classify_boundaries(&topo, &plate_id, &velocities, 0.525);
        let ages = compute_crust_age(&topo, &plate_id, &kinds, 2.5, &mut rng);

        for (t, &k) in kinds.iter().enumerate() {
            if k == BoundaryKind::Divergent {
                assert_eq!(ages[t], 0.0);
            }
        }
        assert!(ages.iter().all(|&a| (0.0..=1.0).contains(&a)));
    }
}
