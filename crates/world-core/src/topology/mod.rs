//! Hex-sphere topology: a Goldberg polyhedron tiling of the unit sphere
//! with correct 5/6-valent neighborhoods, Lloyd-relaxed for near-uniform
//! spacing, plus a spatial index for fast lat/lon lookup (spec §4.2).

pub mod grid;
pub mod icosahedron;
pub mod lattice;
pub mod neighbors;
pub mod relax;

use std::collections::VecDeque;

use crate::error::WorldError;
use crate::sphere::Vec3;
use grid::SpatialGrid;

pub type TileId = u32;

/// The immutable tiling geometry: positions, neighbor graph, and spatial
/// index. Constructed once per generation run; every later phase only
/// reads it.
pub struct Topology {
    pub resolution: usize,
    pub positions: Vec<Vec3>,
    pub is_pentagon: Vec<bool>,
    pub face_id: Vec<u8>,
    neighbor_table: Vec<Vec<TileId>>,
    lookup_grid: SpatialGrid,
}

impl Topology {
    /// Build a Goldberg polyhedron of resolution `n`, giving `10n^2 + 2`
    /// tiles (exactly 12 pentagons). Runs the full construction pipeline:
    /// lattice generation, dedup, k-NN neighbor assignment, Lloyd
    /// relaxation, and a final spatial grid rebuild.
    pub fn build(n: usize) -> Result<Self, WorldError> {
        if n == 0 {
            return Err(WorldError::TopologyConstruction {
                reason: "resolution must be >= 1".to_string(),
            });
        }

        let lat = lattice::build_lattice(n);
        let mut positions = lat.positions;
        let is_pentagon = lat.is_pentagon;
        let face_id = lat.face_id;

        let mut neighbor_table = neighbors::build_neighbors(&positions, &is_pentagon)?;
        relax::relax(&mut positions, &is_pentagon, &mut neighbor_table)?;

        let lookup_grid = SpatialGrid::build(&positions);

        let topo = Self {
            resolution: n,
            positions,
            is_pentagon,
            face_id,
            neighbor_table,
            lookup_grid,
        };
        topo.validate()?;
        Ok(topo)
    }

    fn validate(&self) -> Result<(), WorldError> {
        let expected_tiles = 10 * self.resolution * self.resolution + 2;
        if self.positions.len() != expected_tiles {
            return Err(WorldError::TopologyConstruction {
                reason: format!(
                    "expected {expected_tiles} tiles for resolution {}, got {}",
                    self.resolution,
                    self.positions.len()
                ),
            });
        }
        let n_pentagons = self.is_pentagon.iter().filter(|&&p| p).count();
        if n_pentagons != 12 {
            return Err(WorldError::TopologyConstruction {
                reason: format!("expected exactly 12 pentagons, got {n_pentagons}"),
            });
        }
        for (i, ns) in self.neighbor_table.iter().enumerate() {
            let expected = if self.is_pentagon[i] { 5 } else { 6 };
            if ns.len() != expected {
                return Err(WorldError::TopologyConstruction {
                    reason: format!("tile {i} has {} neighbors, expected {expected}", ns.len()),
                });
            }
            for &n in ns {
                if !self.neighbor_table[n as usize].contains(&(i as u32)) {
                    return Err(WorldError::TopologyConstruction {
                        reason: format!("neighbor relation between {i} and {n} is not symmetric"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn tile_count(&self) -> usize {
        self.positions.len()
    }

    /// Ordered neighbor list; position in the slice is the tile's stable
    /// "direction index" (used by river flow direction and stamping).
    #[inline]
    pub fn neighbors(&self, t: TileId) -> &[TileId] {
        &self.neighbor_table[t as usize]
    }

    #[inline]
    pub fn position(&self, t: TileId) -> Vec3 {
        self.positions[t as usize]
    }

    /// Return the unique tile containing `(lat, lon)`: the nearest tile
    /// center by great-circle distance, found via the spatial grid.
    pub fn tile_at(&self, lat: f64, lon: f64) -> TileId {
        let mut ring = 1usize;
        loop {
            let candidates = self.lookup_grid.candidates_near(lat, lon, ring);
            if !candidates.is_empty() || ring > 8 {
                let query = Vec3::from_latlon(lat, lon);
                let best = candidates
                    .iter()
                    .copied()
                    .min_by(|&a, &b| {
                        let da = crate::sphere::great_circle_distance_rad(query, self.positions[a as usize]);
                        let db = crate::sphere::great_circle_distance_rad(query, self.positions[b as usize]);
                        da.partial_cmp(&db).unwrap()
                    });
                if let Some(best) = best {
                    return best;
                }
            }
            ring += 1;
        }
    }

    /// CCW-ordered polygon corners of tile `t` in 3-D, for rendering/export
    /// (spec §4.2). Each corner is the spherical circumcenter of `t` and
    /// two angularly-consecutive neighbors: the point equidistant (in
    /// great-circle terms) from all three, since neighbor ordering already
    /// sorts by bearing around `t`.
    pub fn tile_vertices(&self, t: TileId) -> Vec<Vec3> {
        let center = self.positions[t as usize];
        let ns = self.neighbors(t);
        let mut verts = Vec::with_capacity(ns.len());
        for i in 0..ns.len() {
            let a = self.positions[ns[i] as usize];
            let b = self.positions[ns[(i + 1) % ns.len()] as usize];
            verts.push(spherical_circumcenter(center, a, b));
        }
        verts
    }

    /// BFS graph distance (hop count) from `start` to every reachable tile.
    /// Used by plate seeding's minimum-pairwise-distance rejection (spec
    /// §4.5 step 1).
    pub fn graph_distances_from(&self, start: TileId) -> Vec<u32> {
        let mut dist = vec![u32::MAX; self.tile_count()];
        dist[start as usize] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(t) = queue.pop_front() {
            let d = dist[t as usize];
            for &n in self.neighbors(t) {
                if dist[n as usize] == u32::MAX {
                    dist[n as usize] = d + 1;
                    queue.push_back(n);
                }
            }
        }
        dist
    }
}

/// The point on the unit sphere equidistant (by dot product) from three
/// given unit vectors: proportional to `cross(A-B, A-C)`, oriented toward
/// the input centroid's hemisphere.
fn spherical_circumcenter(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let n = (a - b).cross(a - c);
    if n.length() < 1e-12 {
        return crate::sphere::centroid(&[a, b, c]);
    }
    let n = n.normalize();
    let reference = crate::sphere::centroid(&[a, b, c]);
    if n.dot(reference) < 0.0 {
        n * -1.0
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_one_gives_twelve_tiles() {
        let topo = Topology::build(1).unwrap();
        assert_eq!(topo.tile_count(), 12);
        assert_eq!(topo.is_pentagon.iter().filter(|&&p| p).count(), 12);
    }

    #[test]
    fn tile_count_formula_holds_for_several_resolutions() {
        for n in [2usize, 3, 5] {
            let topo = Topology::build(n).unwrap();
            assert_eq!(topo.tile_count(), 10 * n * n + 2);
        }
    }

    #[test]
    fn tile_at_returns_the_queried_tiles_own_center() {
        let topo = Topology::build(6).unwrap();
        for t in [0u32, 5, 40, 99] {
            let (lat, lon) = topo.position(t).to_latlon();
            assert_eq!(topo.tile_at(lat, lon), t, "tile {t} at ({lat},{lon})");
        }
    }

    #[test]
    fn tile_vertices_are_roughly_equidistant_from_center() {
        let topo = Topology::build(4).unwrap();
        let t = 20;
        let center = topo.position(t);
        let verts = topo.tile_vertices(t);
        assert_eq!(verts.len(), topo.neighbors(t).len());
        let dists: Vec<f64> = verts.iter().map(|&v| crate::sphere::great_circle_distance_rad(center, v)).collect();
        let mean = dists.iter().sum::<f64>() / dists.len() as f64;
        for d in dists {
            assert!((d - mean).abs() < mean * 0.6, "vertex distance {d} too far from mean {mean}");
        }
    }

    #[test]
    fn graph_distance_zero_at_start_and_symmetric_neighbors_are_one() {
        let topo = Topology::build(3).unwrap();
        let dist = topo.graph_distances_from(0);
        assert_eq!(dist[0], 0);
        for &n in topo.neighbors(0) {
            assert_eq!(dist[n as usize], 1);
        }
    }
}
