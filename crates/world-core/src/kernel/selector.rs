//! Area selector (spec §4.3): distance-window expansion with randomized
//! per-step length, optional land/water gate, same-plate gate, and
//! noise-mask threshold. Returns either the collected tile set or the
//! distance field it grew from.

use crate::rng::WorldRng;
use crate::topology::{TileId, Topology};
use rand::Rng;

pub struct AreaSelectorConfig {
    pub min_step: f64,
    pub max_step: f64,
    /// Optional gate: only expand onto tiles where this returns true
    /// (e.g. "is water", "is same plate as seed").
    pub gate: Option<Box<dyn Fn(TileId) -> bool>>,
    /// Optional noise mask threshold: tile accepted only if
    /// `noise_mask(tile) >= threshold`.
    pub noise_mask: Option<Box<dyn Fn(TileId) -> f64>>,
    pub noise_threshold: f64,
}

impl Default for AreaSelectorConfig {
    fn default() -> Self {
        Self { min_step: 1.0, max_step: 3.0, gate: None, noise_mask: None, noise_threshold: 0.0 }
    }
}

pub struct AreaSelection {
    pub tiles: Vec<TileId>,
    /// Hop-distance from the nearest seed, parallel to `tiles` iteration
    /// order over the whole tile array (unreached tiles hold `u32::MAX`).
    pub distance_field: Vec<u32>,
}

/// Expand from `seeds` for a randomized step length drawn fresh per
/// expansion ring (`∈ [min_step, max_step]`), honoring the optional gates.
pub fn select_area(
    topo: &Topology,
    seeds: &[TileId],
    config: &AreaSelectorConfig,
    rng: &mut WorldRng,
) -> AreaSelection {
    let n = topo.tile_count();
    let mut distance_field = vec![u32::MAX; n];
    let mut tiles = Vec::new();

    let step_len = rng.gen_range(config.min_step..=config.max_step).round().max(1.0) as u32;

    let mut frontier: Vec<TileId> = Vec::new();
    let mut sorted_seeds = seeds.to_vec();
    sorted_seeds.sort_unstable();
    for &s in &sorted_seeds {
        if distance_field[s as usize] == u32::MAX && accepts(topo, s, config) {
            distance_field[s as usize] = 0;
            tiles.push(s);
            frontier.push(s);
        }
    }

    let mut depth = 0u32;
    while !frontier.is_empty() && depth < step_len {
        let mut next_frontier = Vec::new();
        for &t in &frontier {
            let mut ns: Vec<TileId> = topo.neighbors(t).to_vec();
            ns.sort_unstable();
            for n_id in ns {
                if distance_field[n_id as usize] == u32::MAX && accepts(topo, n_id, config) {
                    distance_field[n_id as usize] = depth + 1;
                    tiles.push(n_id);
                    next_frontier.push(n_id);
                }
            }
        }
        frontier = next_frontier;
        depth += 1;
    }

    AreaSelection { tiles, distance_field }
}

fn accepts(_topo: &Topology, t: TileId, config: &AreaSelectorConfig) -> bool {
    if let Some(gate) = &config.gate {
        if !gate(t) {
            return false;
        }
    }
    if let Some(mask) = &config.noise_mask {
        if mask(t) < config.noise_threshold {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    #[test]
    fn selection_includes_seeds() {
        let topo = Topology::build(3).unwrap();
        let mut rng = WorldRng::seed(1);
        let config = AreaSelectorConfig { min_step: 2.0, max_step: 2.0, ..Default::default() };
        let sel = select_area(&topo, &[0], &config, &mut rng);
        assert!(sel.tiles.contains(&0));
        assert_eq!(sel.distance_field[0], 0);
    }

    #[test]
    fn gate_excludes_tiles() {
        let topo = Topology::build(3).unwrap();
        let mut rng = WorldRng::seed(2);
        let config = AreaSelectorConfig {
            min_step: 5.0,
            max_step: 5.0,
            gate: Some(Box::new(|t| t != 1)),
            ..Default::default()
        };
        let sel = select_area(&topo, &[0], &config, &mut rng);
        assert!(!sel.tiles.contains(&1));
    }
}
