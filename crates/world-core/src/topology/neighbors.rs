//! Neighbor-table construction by adaptive k-NN (spec §4.2 step 4).
//!
//! For each tile, candidates are gathered from an expanding ring of spatial
//! grid cells; the closest candidate's distance sets an acceptance radius
//! of `1.5 × closest`, and all candidates within that radius become
//! neighbors. Pentagons must end up with exactly 5 neighbors, hexagons
//! with exactly 6; anything else is a construction failure.

use crate::error::WorldError;
use crate::sphere::Vec3;

use super::grid::SpatialGrid;

/// Average angular tile spacing for `n_tiles` roughly-uniform points on the
/// unit sphere (area of sphere / n_tiles, then spacing ~ sqrt of per-tile
/// area). Used only to pick an initial search ring size.
fn estimated_spacing_rad(n_tiles: usize) -> f64 {
    let area_per_tile = 4.0 * std::f64::consts::PI / n_tiles as f64;
    area_per_tile.sqrt()
}

/// Build the neighbor table for `positions`, returning for each tile an
/// ordered list of neighbor indices (ordering is by increasing polar angle
/// around the tile's tangent plane, so the list's position doubles as a
/// stable "direction index" per spec §4.2).
pub fn build_neighbors(positions: &[Vec3], is_pentagon: &[bool]) -> Result<Vec<Vec<u32>>, WorldError> {
    let grid = SpatialGrid::build(positions);
    let spacing = estimated_spacing_rad(positions.len());
    let mut neighbors = Vec::with_capacity(positions.len());

    for (i, &p) in positions.iter().enumerate() {
        let (lat, lon) = p.to_latlon();
        let expected = if is_pentagon[i] { 5 } else { 6 };

        let mut ring = 2usize;
        let mut accepted: Vec<u32> = Vec::new();

        loop {
            let candidates = grid.candidates_near(lat, lon, ring);
            let mut dists: Vec<(u32, f64)> = candidates
                .iter()
                .copied()
                .filter(|&c| c as usize != i)
                .map(|c| (c, crate::sphere::great_circle_distance_rad(p, positions[c as usize])))
                .collect();
            dists.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
            dists.dedup_by_key(|(id, _)| *id);

            if dists.len() >= expected {
                let closest = dists[0].1;
                let threshold_sq = (1.5 * closest) * (1.5 * closest);
                accepted = dists
                    .iter()
                    .filter(|(_, d)| d * d <= threshold_sq)
                    .map(|(id, _)| *id)
                    .collect();
                if accepted.len() >= expected || ring > 8 {
                    break;
                }
            }
            if ring > 8 {
                break;
            }
            ring += 1;
        }

        // Keep exactly `expected` closest if over-accepted by the 1.5x radius.
        if accepted.len() > expected {
            accepted.sort_by(|&a, &b| {
                let da = crate::sphere::great_circle_distance_rad(p, positions[a as usize]);
                let db = crate::sphere::great_circle_distance_rad(p, positions[b as usize]);
                da.partial_cmp(&db).unwrap()
            });
            accepted.truncate(expected);
        }

        if accepted.len() != expected {
            return Err(WorldError::TopologyConstruction {
                reason: format!(
                    "tile {i} ({}) resolved {} neighbors, expected {expected}",
                    if is_pentagon[i] { "pentagon" } else { "hexagon" },
                    accepted.len()
                ),
            });
        }

        order_ccw(p, &mut accepted, positions);
        neighbors.push(accepted);
        let _ = spacing; // retained for documentation of the search-radius rationale
    }

    Ok(neighbors)
}

/// Sort `neighbor_ids` by their bearing around `center`'s tangent plane, CCW
/// starting from local east, so the index of each neighbor is a stable
/// direction index (used by river flow direction and stamping).
fn order_ccw(center: Vec3, neighbor_ids: &mut [u32], positions: &[Vec3]) {
    let (east, north) = crate::sphere::tangent_basis(center);
    neighbor_ids.sort_by(|&a, &b| {
        let angle = |id: u32| {
            let dir = positions[id as usize] - center;
            let x = dir.dot(east);
            let y = dir.dot(north);
            y.atan2(x)
        };
        angle(a).partial_cmp(&angle(b)).unwrap()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::lattice::build_lattice;

    #[test]
    fn neighbor_counts_match_valence() {
        let lattice = build_lattice(4);
        let neighbors = build_neighbors(&lattice.positions, &lattice.is_pentagon).unwrap();
        for (i, n) in neighbors.iter().enumerate() {
            let expected = if lattice.is_pentagon[i] { 5 } else { 6 };
            assert_eq!(n.len(), expected, "tile {i}");
        }
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        let lattice = build_lattice(3);
        let neighbors = build_neighbors(&lattice.positions, &lattice.is_pentagon).unwrap();
        for (t, ns) in neighbors.iter().enumerate() {
            for &n in ns {
                assert!(
                    neighbors[n as usize].contains(&(t as u32)),
                    "tile {t} has neighbor {n} but not vice versa"
                );
            }
        }
    }
}
