//! Base elevation (spec §4.5 step 7): continental crust gets a positive
//! base elevation, oceanic crust a negative one, each perturbed by a
//! two-octave noise stack; land/water is whatever falls above/below sea
//! level after this pass (uplift from orogeny stamping comes later).

use crate::noise::Expr;
use crate::rng::WorldRng;
use crate::tile::CrustKind;
use crate::topology::Topology;

const CONTINENTAL_BASE_MIN: f64 = 500.0;
const CONTINENTAL_BASE_MAX: f64 = 1000.0;
const OCEANIC_BASE_MIN: f64 = -5000.0;
const OCEANIC_BASE_MAX: f64 = -3000.0;
const DETAIL_AMPLITUDE_M: f64 = 400.0;

/// Assign a base elevation (meters) per tile from its crust kind plus a
/// shared two-octave detail noise stack.
pub fn compute_base_elevation(
    topo: &Topology,
    crust_kind: &[CrustKind],
    rng: &mut WorldRng,
) -> Vec<f32> {
    let n = topo.tile_count();
    let mut fork = rng.fork("plates::elevation");

    let continental_floor = fork.next_range(CONTINENTAL_BASE_MIN, CONTINENTAL_BASE_MAX);
    let oceanic_floor = fork.next_range(OCEANIC_BASE_MIN, OCEANIC_BASE_MAX);
    let detail = Expr::leaf(fork.next_u64() as u32, 0.6, 2, 6.0);

    (0..n as u32)
        .map(|t| {
            let base = match crust_kind[t as usize] {
                CrustKind::Continental => continental_floor,
                CrustKind::Oceanic => oceanic_floor,
                CrustKind::Transitional => (continental_floor + oceanic_floor) / 2.0,
            };
            let p = topo.position(t);
            let detail_m = detail.eval(p) * DETAIL_AMPLITUDE_M;
            (base + detail_m) as f32
        })
        .collect()
}

/// A tile is land when its elevation is strictly above sea level.
pub fn is_land(elevation_m: f32, sea_level_m: f32) -> bool {
    elevation_m > sea_level_m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::WorldRng;
    use crate::topology::Topology;

    #[test]
    fn continental_tiles_trend_higher_than_oceanic() {
        let topo = Topology::build(6).unwrap();
        let mut rng = WorldRng::seed(44);
        let n = topo.tile_count();
        let kinds: Vec<CrustKind> =
            (0..n).map(|i| if i % 2 == 0 { CrustKind::Continental } else { CrustKind::Oceanic }).collect();
        let elev = compute_base_elevation(&topo, &kinds, &mut rng);

        let cont_mean: f64 = elev.iter().zip(&kinds).filter(|(_, k)| **k == CrustKind::Continental).map(|(e, _)| *e as f64).sum::<f64>()
            / kinds.iter().filter(|k| **k == CrustKind::Continental).count() as f64;
        let ocean_mean: f64 = elev.iter().zip(&kinds).filter(|(_, k)| **k == CrustKind::Oceanic).map(|(e, _)| *e as f64).sum::<f64>()
            / kinds.iter().filter(|k| **k == CrustKind::Oceanic).count() as f64;

        assert!(cont_mean > ocean_mean);
    }
}
