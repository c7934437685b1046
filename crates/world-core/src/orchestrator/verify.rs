//! Testable-property battery (spec §8): every invariant an implementation
//! must satisfy, checked directly against a generated world.

use crate::climate::bilinear_weights;
use crate::tile::{BoundaryKind, Tile};
use crate::topology::Topology;

#[derive(Debug, Default)]
pub struct VerificationReport {
    pub failures: Vec<String>,
}

impl VerificationReport {
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }
}

fn push_if(failures: &mut Vec<String>, cond: bool, message: impl Into<String>) {
    if !cond {
        failures.push(message.into());
    }
}

/// Property 2/3: tile count formula, pentagon count, neighbor symmetry.
pub fn check_topology(topo: &Topology) -> Vec<String> {
    let mut failures = Vec::new();
    let r = topo.resolution;
    let expected = 10 * r * r + 2;
    push_if(&mut failures, topo.tile_count() == expected, format!("tile count {} != expected {expected}", topo.tile_count()));

    let pentagons = (0..topo.tile_count() as u32).filter(|&t| topo.neighbors(t).len() == 5).count();
    push_if(&mut failures, pentagons == 12, format!("expected exactly 12 pentagons, found {pentagons}"));

    for t in 0..topo.tile_count() as u32 {
        for &n in topo.neighbors(t) {
            if !topo.neighbors(n).contains(&t) {
                failures.push(format!("neighbor asymmetry between {t} and {n}"));
            }
        }
    }
    failures
}

/// Property 4: plate coverage.
pub fn check_plate_coverage(tiles: &[Tile], plate_count: usize) -> Vec<String> {
    let mut failures = Vec::new();
    for (i, t) in tiles.iter().enumerate() {
        if t.plate_id < 0 || t.plate_id as usize >= plate_count {
            failures.push(format!("tile {i} has out-of-range plate_id {}", t.plate_id));
        }
    }
    failures
}

/// Property 5: microplate containment — every tile with a microplate set
/// belongs to the same plate as that microplate's recorded parent.
pub fn check_microplate_containment(tiles: &[Tile], microplate_parent: &[(i32, i32)]) -> Vec<String> {
    let mut failures = Vec::new();
    for (i, t) in tiles.iter().enumerate() {
        if t.microplate_id < 0 {
            continue;
        }
        if let Some(&(_, parent)) = microplate_parent.iter().find(|(id, _)| *id == t.microplate_id) {
            if parent != t.plate_id {
                failures.push(format!("tile {i} microplate {} parent {} != tile plate {}", t.microplate_id, parent, t.plate_id));
            }
        }
    }
    failures
}

/// Property 7: crust age is non-decreasing along any BFS path from a
/// divergent-boundary source within a single plate.
pub fn check_crust_age_monotonicity(topo: &Topology, tiles: &[Tile]) -> Vec<String> {
    let mut failures = Vec::new();
    for t in 0..topo.tile_count() as u32 {
        if tiles[t as usize].boundary_kind != BoundaryKind::Divergent {
            continue;
        }
        let plate = tiles[t as usize].plate_id;
        let mut visited = vec![false; topo.tile_count()];
        let mut frontier = vec![t];
        visited[t as usize] = true;
        let mut age_at = vec![f32::NAN; topo.tile_count()];
        age_at[t as usize] = tiles[t as usize].crust_age;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &cur in &frontier {
                for &n in topo.neighbors(cur) {
                    if visited[n as usize] || tiles[n as usize].plate_id != plate {
                        continue;
                    }
                    visited[n as usize] = true;
                    if tiles[n as usize].crust_age + 1e-4 < age_at[cur as usize] {
                        failures.push(format!(
                            "crust age decreased from tile {cur} ({}) to {n} ({})",
                            age_at[cur as usize], tiles[n as usize].crust_age
                        ));
                    }
                    age_at[n as usize] = tiles[n as usize].crust_age;
                    next.push(n);
                }
            }
            frontier = next;
        }
    }
    failures
}

/// Property 8: flow acyclicity — following `river_flow_dir` from any tile
/// terminates within `tile_count` steps at a sink (`-1`) or a water tile.
pub fn check_flow_acyclicity(topo: &Topology, tiles: &[Tile]) -> Vec<String> {
    let mut failures = Vec::new();
    let n = tiles.len();
    for start in 0..n as u32 {
        let mut cur = start;
        let mut steps = 0usize;
        loop {
            let tile = &tiles[cur as usize];
            if tile.river_flow_dir < 0 || tile.waterbody_id.is_some() {
                break;
            }
            let neighbors = topo.neighbors(cur);
            let idx = tile.river_flow_dir as usize;
            if idx >= neighbors.len() {
                failures.push(format!("tile {cur} has out-of-range flow dir {idx}"));
                break;
            }
            cur = neighbors[idx];
            steps += 1;
            if steps > n {
                failures.push(format!("flow path from {start} did not terminate within {n} steps"));
                break;
            }
        }
    }
    failures
}

/// Property 9: soil and flora weight vectors sum to 1 within tolerance on
/// every land tile.
pub fn check_soil_flora_normalization(tiles: &[Tile]) -> Vec<String> {
    let mut failures = Vec::new();
    const TOL: f32 = 1e-5;
    for (i, t) in tiles.iter().enumerate() {
        if !t.is_land() {
            continue;
        }
        let soil_sum = t.clay + t.silt + t.sand + t.organic;
        push_if(&mut failures, (soil_sum - 1.0).abs() <= TOL, format!("tile {i} soil weights sum to {soil_sum}"));
        let flora_sum = t.flora_forest + t.flora_grass + t.flora_shrub + t.flora_desert;
        push_if(&mut failures, (flora_sum - 1.0).abs() <= TOL, format!("tile {i} flora weights sum to {flora_sum}"));
    }
    failures
}

/// Property 10: bilinear climate-cell weights are non-negative and sum to
/// 1 within tolerance for every tile.
pub fn check_bilinear_weights(tiles: &[Tile], grid_size: usize) -> Vec<String> {
    let mut failures = Vec::new();
    for (i, t) in tiles.iter().enumerate() {
        let (_, weights) = bilinear_weights(t.lat, t.lon, grid_size);
        let sum: f64 = weights.iter().sum();
        if weights.iter().any(|&w| w < -1e-9) {
            failures.push(format!("tile {i} has a negative bilinear weight"));
        }
        push_if(&mut failures, (sum - 1.0).abs() <= 1e-6, format!("tile {i} bilinear weights sum to {sum}"));
    }
    failures
}

/// Run the full battery and collect every failure across all checks.
pub fn run_all_checks(
    topo: &Topology,
    tiles: &[Tile],
    plate_count: usize,
    microplate_parent: &[(i32, i32)],
    climate_grid_size: usize,
) -> VerificationReport {
    let mut failures = Vec::new();
    failures.extend(check_topology(topo));
    failures.extend(check_plate_coverage(tiles, plate_count));
    failures.extend(check_microplate_containment(tiles, microplate_parent));
    failures.extend(check_crust_age_monotonicity(topo, tiles));
    failures.extend(check_flow_acyclicity(topo, tiles));
    failures.extend(check_soil_flora_normalization(tiles));
    failures.extend(check_bilinear_weights(tiles, climate_grid_size));
    VerificationReport { failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::Vec3;

    #[test]
    fn topology_check_passes_for_valid_build() {
        let topo = Topology::build(5).unwrap();
        assert!(check_topology(&topo).is_empty());
    }

    #[test]
    fn soil_normalization_flags_bad_land_tile() {
        let mut t = Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0);
        t.flags.insert(crate::tile::TileFlags::LAND);
        t.clay = 0.5;
        t.silt = 0.5;
        t.sand = 0.5;
        t.organic = 0.5;
        let failures = check_soil_flora_normalization(&[t]);
        assert!(!failures.is_empty());
    }
}
