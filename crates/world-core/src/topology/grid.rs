//! 180x180 (2°-per-cell) spatial grid over lat/lon for O(1)-average nearest
//! tile lookup (spec §4.2 step 3).

use crate::sphere::Vec3;

const CELLS_LAT: usize = 180;
const CELLS_LON: usize = 180;
const DEG_PER_CELL: f64 = 2.0;

pub struct SpatialGrid {
    cells: Vec<Vec<u32>>,
}

#[inline]
fn lat_to_row(lat: f64) -> usize {
    // lat in [-90, 90] -> row in [0, CELLS_LAT)
    (((lat + 90.0) / DEG_PER_CELL).floor() as isize)
        .clamp(0, CELLS_LAT as isize - 1) as usize
}

#[inline]
fn lon_to_col(lon: f64) -> usize {
    // lon in [-180, 180] -> col in [0, CELLS_LON), wrapping
    let wrapped = ((lon + 180.0).rem_euclid(360.0)) / DEG_PER_CELL;
    (wrapped.floor() as usize).min(CELLS_LON - 1)
}

impl SpatialGrid {
    pub fn build(positions: &[Vec3]) -> Self {
        let mut cells = vec![Vec::new(); CELLS_LAT * CELLS_LON];
        for (i, p) in positions.iter().enumerate() {
            let (lat, lon) = p.to_latlon();
            let row = lat_to_row(lat);
            let col = lon_to_col(lon);
            cells[row * CELLS_LON + col].push(i as u32);
        }
        Self { cells }
    }

    /// Candidate tile indices near `(lat, lon)`, searching an expanding ring
    /// of cells. Near the poles the longitude search range is widened by
    /// roughly `1 / cos(lat)` since meridians converge (spec §4.2 step 3).
    pub fn candidates_near(&self, lat: f64, lon: f64, ring: usize) -> Vec<u32> {
        let row = lat_to_row(lat);
        let lon_widen = (1.0 / lat.to_radians().cos().abs().max(1e-6)).min(CELLS_LON as f64 / 2.0);
        let col_span = ((ring as f64) * lon_widen).ceil() as isize;
        let col_center = lon_to_col(lon) as isize;

        let mut out = Vec::new();
        let row_lo = row as isize - ring as isize;
        let row_hi = row as isize + ring as isize;
        for r in row_lo..=row_hi {
            if r < 0 || r >= CELLS_LAT as isize {
                continue;
            }
            for dc in -col_span..=col_span {
                let c = (col_center + dc).rem_euclid(CELLS_LON as isize) as usize;
                out.extend_from_slice(&self.cells[r as usize * CELLS_LON + c]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_near_includes_self() {
        let positions = vec![Vec3::from_latlon(10.0, 20.0), Vec3::from_latlon(-40.0, 170.0)];
        let grid = SpatialGrid::build(&positions);
        let found = grid.candidates_near(10.0, 20.0, 1);
        assert!(found.contains(&0));
    }

    #[test]
    fn near_pole_search_widens_longitude() {
        let positions: Vec<Vec3> = (0..36).map(|i| Vec3::from_latlon(89.0, i as f64 * 10.0 - 180.0)).collect();
        let grid = SpatialGrid::build(&positions);
        // Searching near the pole at any single longitude should still turn up
        // several of the ring of points at 89N, since the grid widens its
        // longitude window as 1/cos(lat).
        let found = grid.candidates_near(89.0, 0.0, 1);
        assert!(found.len() > 1, "expected widened longitude search near pole, got {}", found.len());
    }
}
