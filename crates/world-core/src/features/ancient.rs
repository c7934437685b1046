//! Ancient relict uplifts (spec §4.6): cratons old enough to have lost
//! their original orogeny still carry eroded, low-relief bumps. Candidate
//! tiles are sampled from old continental crust and stamped with a small,
//! heavily-decayed uplift so they read as worn-down ranges, not mountains.

use crate::kernel::stamper::{stamp, Falloff, StampAction};
use crate::rng::WorldRng;
use crate::tile::CrustKind;
use crate::topology::Topology;

const ANCIENT_AGE_THRESHOLD_MY: f32 = 600.0;
const ANCIENT_DENSITY_PER_TILE: f64 = 1.0 / 900.0;
const ANCIENT_RADIUS: u32 = 2;
const ANCIENT_UPLIFT_M: f64 = 180.0;

pub fn scatter_ancient_uplifts(
    topo: &Topology,
    crust_kind: &[CrustKind],
    crust_age: &[f32],
    elevation_m: &mut [f32],
    rng: &mut WorldRng,
) {
    let mut fork = rng.fork("features::ancient");

    let candidates: Vec<u32> = (0..topo.tile_count() as u32)
        .filter(|&t| crust_kind[t as usize] == CrustKind::Continental && crust_age[t as usize] >= ANCIENT_AGE_THRESHOLD_MY)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let count = ((candidates.len() as f64) * ANCIENT_DENSITY_PER_TILE).round().max(1.0) as usize;
    let mut field: Vec<f64> = elevation_m.iter().map(|&e| e as f64).collect();

    for _ in 0..count {
        let idx = fork.next_index(candidates.len());
        let center = candidates[idx];
        let jitter = fork.next_range(0.6, 1.0);
        stamp(topo, &mut field, &[center], ANCIENT_RADIUS, ANCIENT_UPLIFT_M * jitter, Falloff::Exponential(2.0), StampAction::Add);
    }

    for (e, &f) in elevation_m.iter_mut().zip(field.iter()) {
        *e = f as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn young_crust_gets_no_uplift() {
        let topo = Topology::build(4).unwrap();
        let n = topo.tile_count();
        let crust_kind = vec![CrustKind::Continental; n];
        let crust_age = vec![10.0f32; n];
        let mut elevation_m = vec![0.0f32; n];
        let original = elevation_m.clone();

        let mut rng = WorldRng::seed(1);
        scatter_ancient_uplifts(&topo, &crust_kind, &crust_age, &mut elevation_m, &mut rng);
        assert_eq!(elevation_m, original);
    }

    #[test]
    fn old_craton_gets_uplifted() {
        let topo = Topology::build(5).unwrap();
        let n = topo.tile_count();
        let crust_kind = vec![CrustKind::Continental; n];
        let crust_age = vec![1200.0f32; n];
        let mut elevation_m = vec![0.0f32; n];

        let mut rng = WorldRng::seed(4);
        scatter_ancient_uplifts(&topo, &crust_kind, &crust_age, &mut elevation_m, &mut rng);
        assert!(elevation_m.iter().any(|&e| e > 0.0));
    }
}
