//! Lloyd relaxation: iteratively move each tile to the normalized centroid
//! of its current neighbors, then rebuild the neighbor table (spec §4.2
//! step 5). After `ITERATIONS` rounds the tiling is stable and nearly
//! uniform.

use crate::error::WorldError;
use crate::sphere::centroid;

use super::neighbors::build_neighbors;

pub const LLOYD_ITERATIONS: u32 = 10;

/// Run Lloyd relaxation in place on `positions`, rebuilding `neighbors`
/// after every iteration. Pentagon/hexagon identity (`is_pentagon`) never
/// changes; only positions and neighbor lists are updated.
pub fn relax(
    positions: &mut [crate::sphere::Vec3],
    is_pentagon: &[bool],
    neighbors: &mut Vec<Vec<u32>>,
) -> Result<(), WorldError> {
    for _ in 0..LLOYD_ITERATIONS {
        let mut next = positions.to_vec();
        for (i, ns) in neighbors.iter().enumerate() {
            let pts: Vec<_> = ns.iter().map(|&n| positions[n as usize]).collect();
            next[i] = centroid(&pts);
        }
        positions.copy_from_slice(&next);
        *neighbors = build_neighbors(positions, is_pentagon)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::lattice::build_lattice;
    use crate::topology::neighbors::build_neighbors;
    use crate::sphere::great_circle_distance_rad;

    #[test]
    fn relaxation_reduces_spacing_variance() {
        let lattice = build_lattice(4);
        let mut positions = lattice.positions.clone();
        let mut neighbors = build_neighbors(&positions, &lattice.is_pentagon).unwrap();

        let spacing_stats = |positions: &[crate::sphere::Vec3], neighbors: &[Vec<u32>]| {
            let mut dists = Vec::new();
            for (i, ns) in neighbors.iter().enumerate() {
                for &n in ns {
                    dists.push(great_circle_distance_rad(positions[i], positions[n as usize]));
                }
            }
            let mean = dists.iter().sum::<f64>() / dists.len() as f64;
            let var = dists.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / dists.len() as f64;
            var
        };

        let before = spacing_stats(&positions, &neighbors);
        relax(&mut positions, &lattice.is_pentagon, &mut neighbors).unwrap();
        let after = spacing_stats(&positions, &neighbors);

        assert!(after <= before * 1.01, "relaxation should not increase spacing variance much: before={before:.6} after={after:.6}");
    }

    #[test]
    fn relaxation_preserves_neighbor_symmetry_and_valence() {
        let lattice = build_lattice(3);
        let mut positions = lattice.positions.clone();
        let mut neighbors = build_neighbors(&positions, &lattice.is_pentagon).unwrap();
        relax(&mut positions, &lattice.is_pentagon, &mut neighbors).unwrap();

        for (i, ns) in neighbors.iter().enumerate() {
            let expected = if lattice.is_pentagon[i] { 5 } else { 6 };
            assert_eq!(ns.len(), expected);
            for &n in ns {
                assert!(neighbors[n as usize].contains(&(i as u32)));
            }
        }
    }
}
