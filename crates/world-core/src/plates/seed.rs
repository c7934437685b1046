//! Plate seeding (spec §4.5 step 1): pick `K` tiles with minimum pairwise
//! graph distance, retrying on conflict, then assign each a crust kind and
//! a size tier whose crust fraction is drawn from a fixed distribution
//! cycled by tier.

use crate::error::{WorldError, WorldResult};
use crate::rng::WorldRng;
use crate::tile::CrustKind;
use crate::topology::{TileId, Topology};

/// Minimum hop distance enforced between any two plate seeds.
const MIN_SEED_DISTANCE: u32 = 5;
const MAX_SEED_ATTEMPTS: u32 = 50;

/// Crust fraction cycled by size tier 1..4 (spec §4.5 step 1).
const TIER_CRUST_FRACTION: [f32; 4] = [0.75, 0.275, 0.04, 0.015];

pub struct PlateSeed {
    pub tile: TileId,
    pub kind: CrustKind,
    pub size_tier: u8,
    pub crust_fraction: f32,
}

/// Choose `k` plate seeds at least [`MIN_SEED_DISTANCE`] hops apart.
/// Retries the whole placement (spec: "retry on conflict") if a forbidden
/// zone ever exhausts the candidate pool before `k` seeds are placed.
pub fn seed_plates(
    topo: &Topology,
    k: usize,
    continental_ratio: f32,
    rng: &mut WorldRng,
) -> WorldResult<Vec<PlateSeed>> {
    let n = topo.tile_count();

    for _attempt in 0..MAX_SEED_ATTEMPTS {
        let mut forbidden = vec![false; n];
        let mut seeds: Vec<TileId> = Vec::with_capacity(k);

        for _ in 0..k {
            let candidates: Vec<TileId> =
                (0..n as u32).filter(|&t| !forbidden[t as usize]).collect();
            if candidates.is_empty() {
                break;
            }
            let pick = candidates[rng.next_index(candidates.len())];
            seeds.push(pick);

            let dist = topo.graph_distances_from(pick);
            for (t, &d) in dist.iter().enumerate() {
                if d < MIN_SEED_DISTANCE {
                    forbidden[t] = true;
                }
            }
        }

        if seeds.len() == k {
            return Ok(assign_kinds_and_tiers(seeds, continental_ratio, rng));
        }
    }

    Err(WorldError::StageValidation {
        stage: "plates::seed",
        reason: format!(
            "could not place {k} seeds >= {MIN_SEED_DISTANCE} hops apart after {MAX_SEED_ATTEMPTS} attempts"
        ),
    })
}

fn assign_kinds_and_tiers(
    seeds: Vec<TileId>,
    continental_ratio: f32,
    rng: &mut WorldRng,
) -> Vec<PlateSeed> {
    seeds
        .into_iter()
        .enumerate()
        .map(|(i, tile)| {
            let kind = if rng.next_f32() < continental_ratio {
                CrustKind::Continental
            } else {
                CrustKind::Oceanic
            };
            let size_tier = (i % TIER_CRUST_FRACTION.len()) as u8 + 1;
            let crust_fraction = TIER_CRUST_FRACTION[(size_tier - 1) as usize];
            PlateSeed { tile, kind, size_tier, crust_fraction }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_mutually_far_apart() {
        let topo = Topology::build(10).unwrap();
        let mut rng = WorldRng::seed(1);
        let seeds = seed_plates(&topo, 6, 0.4, &mut rng).unwrap();
        for i in 0..seeds.len() {
            for j in (i + 1)..seeds.len() {
                let dist = topo.graph_distances_from(seeds[i].tile)[seeds[j].tile as usize];
                assert!(dist >= MIN_SEED_DISTANCE, "seeds {i},{j} are only {dist} hops apart");
            }
        }
    }

    #[test]
    fn tiers_cycle_and_carry_fixed_fractions() {
        let topo = Topology::build(12).unwrap();
        let mut rng = WorldRng::seed(2);
        let seeds = seed_plates(&topo, 8, 0.5, &mut rng).unwrap();
        for (i, s) in seeds.iter().enumerate() {
            let expected_tier = (i % 4) as u8 + 1;
            assert_eq!(s.size_tier, expected_tier);
            assert_eq!(s.crust_fraction, TIER_CRUST_FRACTION[(expected_tier - 1) as usize]);
        }
    }

    #[test]
    fn too_many_seeds_for_topology_fails_cleanly() {
        let topo = Topology::build(1).unwrap(); // 12 tiles
        let mut rng = WorldRng::seed(3);
        assert!(seed_plates(&topo, 12, 0.4, &mut rng).is_err());
    }
}
