//! Boundary classification (spec §4.5 step 5): every cross-plate edge votes
//! convergent, divergent, or transform based on the relative motion of the
//! two plates at that edge; a tile's boundary kind is the majority vote
//! among its cross-plate edges, with ties (no class reaching
//! `voting_threshold`) resolved to transform.

use crate::tile::{BoundaryKind, PlateId};
use crate::topology::{TileId, Topology};

use super::velocity::is_boundary_tile;

/// Classify one edge (spec §4.5 step 5): project the relative velocity of
/// the two plates onto the edge direction. A near-zero projection means
/// the plates are sliding past each other (Transform); a negative
/// projection means `b` is closing on `a` (Convergent); a positive one
/// means they're pulling apart (Divergent).
fn classify_edge(
    topo: &Topology,
    a: TileId,
    b: TileId,
    velocities: &[(f64, f64)],
    plate_id: &[PlateId],
) -> BoundaryKind {
    const TRANSFORM_THRESHOLD: f64 = 0.25;

    let pa = plate_id[a as usize];
    let pb = plate_id[b as usize];
    let (vax, vay) = velocities[pa as usize];
    let (vbx, vby) = velocities[pb as usize];

    let pos_a = topo.position(a);
    let pos_b = topo.position(b);
    let edge_dir = (pos_b - pos_a).normalize();

    let relative = (vbx - vax, vby - vay);
    let dot = relative.0 * edge_dir.x + relative.1 * edge_dir.y;

    if dot.abs() < TRANSFORM_THRESHOLD {
        BoundaryKind::Transform
    } else if dot > 0.0 {
        BoundaryKind::Convergent
    } else {
        BoundaryKind::Divergent
    }
}

/// Classify every tile's boundary kind by majority vote among its
/// cross-plate edges. A class needs >= `voting_threshold` of the votes to
/// win outright; otherwise the tile is marked transform.
pub fn classify_boundaries(
    topo: &Topology,
    plate_id: &[PlateId],
    velocities: &[(f64, f64)],
    voting_threshold: f32,
) -> Vec<BoundaryKind> {
    let n = topo.tile_count();
    let mut kinds = vec![BoundaryKind::None; n];

    for t in 0..n as u32 {
        if !is_boundary_tile(topo, plate_id, t) {
            continue;
        }
        let p = plate_id[t as usize];
        let mut convergent = 0u32;
        let mut divergent = 0u32;
        let mut transform = 0u32;
        let mut total = 0u32;

        for &nb in topo.neighbors(t) {
            if plate_id[nb as usize] == p {
                continue;
            }
            total += 1;
            match classify_edge(topo, t, nb, velocities, plate_id) {
                BoundaryKind::Convergent => convergent += 1,
                BoundaryKind::Divergent => divergent += 1,
                _ => transform += 1,
            }
        }

        if total == 0 {
            continue;
        }
        let threshold_votes = (voting_threshold * total as f32).ceil() as u32;
        kinds[t as usize] = if convergent >= threshold_votes && convergent >= divergent {
            BoundaryKind::Convergent
        } else if divergent >= threshold_votes && divergent >= convergent {
            BoundaryKind::Divergent
        } else {
            BoundaryKind::Transform
        };
    }

    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plates::{fill::major_fill, seed::seed_plates};
    use crate::rng::WorldRng;
    use crate::topology::Topology;

    #[test]
    fn boundary_classification_is_symmetric_in_kind_presence() {
        let topo = Topology::build(8).unwrap();
        let mut rng = WorldRng::seed(21);
        let seeds = seed_plates(&topo, 6, 0.4, &mut rng).unwrap();
        let plate_id: Vec<PlateId> = major_fill(&topo, &seeds, 0.1, &mut rng).unwrap();
        let velocities: Vec<(f64, f64)> = (0..seeds.len())
            .map(|_| super::super::velocity::random_velocity(&mut rng))
            .collect();
        let kinds = classify_boundaries(&topo, &plate_id, &velocities, 0.525);
        // Every boundary tile must get a non-None classification.
        for t in 0..topo.tile_count() as u32 {
            if is_boundary_tile(&topo, &plate_id, t) {
                assert_ne!(kinds[t as usize], BoundaryKind::None);
            }
        }
    }
}
