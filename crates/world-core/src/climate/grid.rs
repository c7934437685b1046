//! The G×G climate cell lattice itself: binning, distance-to-sea,
//! saldo, zone flags, continentality sweeps, and the noise-backed
//! temperature/rainfall post-process (spec §4.8 steps 1-6).

use std::collections::VecDeque;

use crate::noise::Fbm;
use crate::rng::WorldRng;
use crate::tile::Tile;

/// Zone-band threshold set (spec §4.8 step 4), in effective-latitude
/// degrees, checked on both sides of the equator.
const ZONE_THRESHOLDS: [f32; 5] = [3.0, 4.0, 6.0, 10.0, 24.0];
const OCEAN_MAJORITY_THRESHOLD: f32 = 0.5;
const OCEAN_FALLOFF: f64 = 12.0;
const CONTINENTALITY_LAND_GROWTH: f32 = 1.0;
const CONTINENTALITY_OCEAN_DECAY: f32 = 0.85;
const CONTINENTALITY_ELEVATION_BOOST: f32 = 0.0015;

/// Map `(lat, lon)` to the four surrounding cell indices and bilinear
/// weights, wrapping in x (longitude) and clamping in y (latitude) (spec
/// §4.8: "wrapping in x and clamping in y").
pub fn bilinear_weights(lat: f64, lon: f64, grid_size: usize) -> ([(usize, usize); 4], [f64; 4]) {
    let g = grid_size as f64;
    let gx = ((lon + 180.0) / 360.0 * g).rem_euclid(g);
    let gy = ((lat + 90.0) / 180.0 * g).clamp(0.0, g - f64::EPSILON);

    let x0 = gx.floor() as usize % grid_size;
    let x1 = (x0 + 1) % grid_size;
    let fx = gx - gx.floor();

    let y0 = (gy.floor() as usize).min(grid_size - 1);
    let y1 = (y0 + 1).min(grid_size - 1);
    let fy = (gy - y0 as f64).clamp(0.0, 1.0);

    let cells = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)];
    let weights = [(1.0 - fx) * (1.0 - fy), fx * (1.0 - fy), (1.0 - fx) * fy, fx * fy];
    (cells, weights)
}

#[derive(Debug, Clone)]
pub struct ClimateGrid {
    pub size: usize,
    pub land_fraction: Vec<f32>,
    pub elevation_mean: Vec<f32>,
    pub distance_to_sea: Vec<f32>,
    pub saldo_positive: Vec<f32>,
    pub saldo_negative: Vec<f32>,
    pub zone_flags: Vec<u16>,
    /// Four sweep directions: west-to-east, east-to-west, north-to-south,
    /// south-to-north (spec §4.8 step 5).
    pub continentality: [Vec<f32>; 4],
    pub temp_jan_c: Vec<f32>,
    pub temp_jul_c: Vec<f32>,
    pub rain_jan_mm: Vec<f32>,
    pub rain_jul_mm: Vec<f32>,
}

impl ClimateGrid {
    fn empty(size: usize) -> Self {
        let n = size * size;
        Self {
            size,
            land_fraction: vec![0.0; n],
            elevation_mean: vec![0.0; n],
            distance_to_sea: vec![f32::INFINITY; n],
            saldo_positive: vec![0.0; size],
            saldo_negative: vec![0.0; size],
            zone_flags: vec![0; n],
            continentality: [vec![0.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]],
            temp_jan_c: vec![0.0; n],
            temp_jul_c: vec![0.0; n],
            rain_jan_mm: vec![0.0; n],
            rain_jul_mm: vec![0.0; n],
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    fn cell_center_latlon(&self, x: usize, y: usize) -> (f64, f64) {
        let g = self.size as f64;
        let lat = (y as f64 + 0.5) / g * 180.0 - 90.0;
        let lon = (x as f64 + 0.5) / g * 360.0 - 180.0;
        (lat, lon)
    }
}

/// Step 1: bin tiles into cells, accumulating water/land counts and
/// elevation sum, then derive `land_fraction` and `elevation_mean`.
fn bin_tiles(grid: &mut ClimateGrid, tiles: &[Tile]) {
    let n = grid.size * grid.size;
    let mut land_count = vec![0u32; n];
    let mut total_count = vec![0u32; n];
    let mut elevation_sum = vec![0f64; n];

    for t in tiles {
        let (cells, weights) = bilinear_weights(t.lat, t.lon, grid.size);
        // Use the nearest of the four cells (largest weight) for discrete
        // binning; bilinear weights are reserved for the final tile sample.
        let (cx, cy) = cells[weights.iter().enumerate().max_by(|a, b| a.1.total_cmp(b.1)).unwrap().0];
        let i = grid.idx(cx, cy);
        total_count[i] += 1;
        if t.is_land() {
            land_count[i] += 1;
        }
        elevation_sum[i] += t.elevation_m as f64;
    }

    for i in 0..n {
        if total_count[i] > 0 {
            grid.land_fraction[i] = land_count[i] as f32 / total_count[i] as f32;
            grid.elevation_mean[i] = (elevation_sum[i] / total_count[i] as f64) as f32;
        } else {
            grid.land_fraction[i] = 0.0;
            grid.elevation_mean[i] = -4000.0;
        }
    }
}

/// Step 2: multi-source BFS distance-to-sea in grid-cell hops, wrapping in
/// x, from every ocean-majority cell.
fn compute_distance_to_sea(grid: &mut ClimateGrid) {
    let g = grid.size;
    let mut queue = VecDeque::new();
    for y in 0..g {
        for x in 0..g {
            let i = grid.idx(x, y);
            if grid.land_fraction[i] < OCEAN_MAJORITY_THRESHOLD {
                grid.distance_to_sea[i] = 0.0;
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let d = grid.distance_to_sea[grid.idx(x, y)];
        let neighbors = [
            ((x + 1) % g, y),
            ((x + g - 1) % g, y),
            (x, y.saturating_sub(1)),
            (x, (y + 1).min(g - 1)),
        ];
        for (nx, ny) in neighbors {
            let ni = grid.idx(nx, ny);
            if grid.distance_to_sea[ni] > d + 1.0 {
                grid.distance_to_sea[ni] = d + 1.0;
                queue.push_back((nx, ny));
            }
        }
    }
}

/// Step 3: column-wise saldo integration, split into positive and negative
/// running sums (approximating the net radiative balance by latitude).
fn compute_saldo(grid: &mut ClimateGrid) {
    let g = grid.size;
    for x in 0..g {
        let mut pos = 0.0f32;
        let mut neg = 0.0f32;
        for y in 0..g {
            let (lat, _) = grid.cell_center_latlon(x, y);
            let value = (lat.to_radians().sin() as f32) * grid.land_fraction[grid.idx(x, y)] / g as f32;
            if value >= 0.0 {
                pos += value;
            } else {
                neg += value.abs();
            }
        }
        grid.saldo_positive[x] = pos;
        grid.saldo_negative[x] = neg;
    }
}

/// Step 4: set a zone flag bit for every threshold in [`ZONE_THRESHOLDS`]
/// that the cell's effective latitude (saldo-scaled) exceeds, one bit per
/// threshold, doubled for hemisphere sign.
fn classify_zones(grid: &mut ClimateGrid) {
    let g = grid.size;
    for y in 0..g {
        for x in 0..g {
            let (lat, _) = grid.cell_center_latlon(x, y);
            let saldo_scale = 1.0 + grid.saldo_positive[x] - grid.saldo_negative[x];
            let effective_lat = lat as f32 * saldo_scale;
            let mut flags = 0u16;
            for (bit, &threshold) in ZONE_THRESHOLDS.iter().enumerate() {
                if effective_lat.abs() >= threshold {
                    flags |= 1 << bit;
                }
            }
            if effective_lat < 0.0 {
                flags |= 1 << 15;
            }
            grid.zone_flags[grid.idx(x, y)] = flags;
        }
    }
}

/// One inlandness step: grows over land (boosted by an elevation rise
/// since the previous cell along the sweep), decays over ocean.
#[inline]
fn continentality_step(value: f32, elevation: f32, prev_elevation: f32, is_land: bool) -> f32 {
    if is_land {
        let gain = (elevation - prev_elevation).max(0.0);
        value + CONTINENTALITY_LAND_GROWTH + gain * CONTINENTALITY_ELEVATION_BOOST
    } else {
        value * CONTINENTALITY_OCEAN_DECAY
    }
}

/// Step 5: four directional sweeps accumulating an inlandness value that
/// grows over land (boosted where elevation rises) and decays over ocean:
/// west-to-east, east-to-west, north-to-south, south-to-north.
fn compute_continentality(grid: &mut ClimateGrid) {
    let g = grid.size;

    for y in 0..g {
        let mut value = 0.0f32;
        let mut prev_elevation = grid.elevation_mean[grid.idx(0, y)];
        for x in 0..g {
            let i = grid.idx(x, y);
            let elevation = grid.elevation_mean[i];
            value = continentality_step(value, elevation, prev_elevation, grid.land_fraction[i] >= OCEAN_MAJORITY_THRESHOLD);
            grid.continentality[0][i] = value;
            prev_elevation = elevation;
        }

        let mut value = 0.0f32;
        let mut prev_elevation = grid.elevation_mean[grid.idx(g - 1, y)];
        for x in (0..g).rev() {
            let i = grid.idx(x, y);
            let elevation = grid.elevation_mean[i];
            value = continentality_step(value, elevation, prev_elevation, grid.land_fraction[i] >= OCEAN_MAJORITY_THRESHOLD);
            grid.continentality[1][i] = value;
            prev_elevation = elevation;
        }
    }

    for x in 0..g {
        let mut value = 0.0f32;
        let mut prev_elevation = grid.elevation_mean[grid.idx(x, 0)];
        for y in 0..g {
            let i = grid.idx(x, y);
            let elevation = grid.elevation_mean[i];
            value = continentality_step(value, elevation, prev_elevation, grid.land_fraction[i] >= OCEAN_MAJORITY_THRESHOLD);
            grid.continentality[2][i] = value;
            prev_elevation = elevation;
        }

        let mut value = 0.0f32;
        let mut prev_elevation = grid.elevation_mean[grid.idx(x, g - 1)];
        for y in (0..g).rev() {
            let i = grid.idx(x, y);
            let elevation = grid.elevation_mean[i];
            value = continentality_step(value, elevation, prev_elevation, grid.land_fraction[i] >= OCEAN_MAJORITY_THRESHOLD);
            grid.continentality[3][i] = value;
            prev_elevation = elevation;
        }
    }
}

/// Step 6: combine a latitude baseline, lapse-rate correction, ocean
/// influence, and continentality-modulated seasonal amplitude with a
/// per-cell noise sample, for both temperature and rainfall.
fn post_process(grid: &mut ClimateGrid, seed: u64, noise_weight: f64) {
    let g = grid.size;
    let temp_noise = Fbm::new((seed ^ 0xA5A5_A5A5) as u32, 0.6, 3, 4.0);
    let rain_noise = Fbm::new((seed ^ 0x5A5A_5A5A) as u32, 0.6, 3, 4.0);

    for y in 0..g {
        for x in 0..g {
            let i = grid.idx(x, y);
            let (lat, lon) = grid.cell_center_latlon(x, y);
            let p = crate::sphere::Vec3::from_latlon(lat, lon);

            let lat_rad = lat.to_radians();
            let baseline_temp = 28.0 - 55.0 * lat_rad.sin().abs().powf(1.3);
            let lapse = grid.elevation_mean[i] as f64 * -0.0065;
            let ocean_influence = (-(grid.distance_to_sea[i] as f64) / OCEAN_FALLOFF).exp();
            let continentality_mean: f32 = grid.continentality.iter().map(|c| c[i]).sum::<f32>() / 4.0;
            let seasonal_amplitude = 12.0 + continentality_mean as f64 * 1.5 * (1.0 - ocean_influence);

            let noise_t = temp_noise.sample(p) * noise_weight;
            let noise_r = rain_noise.sample(p) * noise_weight;

            grid.temp_jan_c[i] = (baseline_temp + lapse - seasonal_amplitude * lat_rad.signum() + noise_t * 4.0) as f32;
            grid.temp_jul_c[i] = (baseline_temp + lapse + seasonal_amplitude * lat_rad.signum() + noise_t * 3.0) as f32;

            let baseline_rain = 1800.0 * (1.0 - lat_rad.abs() / std::f64::consts::FRAC_PI_2).max(0.05) * ocean_influence.max(0.2);
            grid.rain_jan_mm[i] = (baseline_rain * (1.0 + noise_r * 0.4)).max(0.0) as f32;
            grid.rain_jul_mm[i] = (baseline_rain * (1.0 - noise_r * 0.3)).max(0.0) as f32;
        }
    }
}

/// Build the full climate grid, running the binning-through-post-process
/// sequence twice: once coarse, once with a finer noise weight layered on
/// top (spec §4.8: "Sequence ... run twice, second time with noise
/// modulation").
pub fn build_climate_grid(tiles: &[Tile], grid_size: usize, rng: &mut WorldRng) -> ClimateGrid {
    let mut grid = ClimateGrid::empty(grid_size);
    bin_tiles(&mut grid, tiles);
    compute_distance_to_sea(&mut grid);
    compute_saldo(&mut grid);
    classify_zones(&mut grid);
    compute_continentality(&mut grid);

    let mut fork = rng.fork("climate");
    let seed_pass_one = fork.next_u64();
    post_process(&mut grid, seed_pass_one, 0.15);

    let seed_pass_two = fork.next_u64();
    post_process(&mut grid, seed_pass_two, 0.35);

    grid
}

/// Bilinearly sample the grid's temperature/rainfall fields onto every
/// tile's climate fields (spec §4.8 "Bilinearly sample into every tile").
/// Embarrassingly parallel over tile indices (spec §5): the grid is
/// read-only and each tile only writes its own climate fields, so this
/// runs on rayon's pool when the `threading` feature is on.
pub fn sample_onto_tiles(grid: &ClimateGrid, tiles: &mut [Tile]) {
    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        tiles.par_iter_mut().for_each(|t| sample_one(grid, t));
    }
    #[cfg(not(feature = "threading"))]
    {
        tiles.iter_mut().for_each(|t| sample_one(grid, t));
    }
}

fn sample_one(grid: &ClimateGrid, t: &mut Tile) {
    let (cells, weights) = bilinear_weights(t.lat, t.lon, grid.size);
    let mut temp_jan = 0.0f64;
    let mut temp_jul = 0.0f64;
    let mut rain_jan = 0.0f64;
    let mut rain_jul = 0.0f64;
    for (&(cx, cy), &w) in cells.iter().zip(weights.iter()) {
        let i = grid.idx(cx, cy);
        temp_jan += grid.temp_jan_c[i] as f64 * w;
        temp_jul += grid.temp_jul_c[i] as f64 * w;
        rain_jan += grid.rain_jan_mm[i] as f64 * w;
        rain_jul += grid.rain_jul_mm[i] as f64 * w;
    }
    t.temp_jan_c = temp_jan as f32;
    t.temp_jul_c = temp_jul as f32;
    t.rain_jan_mm = rain_jan.max(0.0) as f32;
    t.rain_jul_mm = rain_jul.max(0.0) as f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_weights_sum_to_one_and_are_nonnegative() {
        for (lat, lon) in [(0.0, 0.0), (89.9, 179.9), (-89.9, -179.9), (45.0, 170.0)] {
            let (_, w) = bilinear_weights(lat, lon, 64);
            let sum: f64 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
            assert!(w.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn longitude_wraps_at_the_seam() {
        let (cells_a, _) = bilinear_weights(0.0, 179.99, 64);
        let (cells_b, _) = bilinear_weights(0.0, -179.99, 64);
        // Both should reference adjoining cells near x=0/x=63.
        assert!(cells_a.iter().any(|&(x, _)| x == 63 || x == 0));
        assert!(cells_b.iter().any(|&(x, _)| x == 63 || x == 0));
    }

    #[test]
    fn distance_to_sea_is_zero_somewhere_and_bounded() {
        let mut grid = ClimateGrid::empty(8);
        for i in 0..grid.land_fraction.len() {
            grid.land_fraction[i] = if i % 3 == 0 { 0.9 } else { 0.1 };
        }
        compute_distance_to_sea(&mut grid);
        assert!(grid.distance_to_sea.iter().any(|&d| d == 0.0));
        assert!(grid.distance_to_sea.iter().all(|&d| d.is_finite()));
    }
}
