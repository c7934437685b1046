//! Plate velocities and head tiles (spec §4.5 step 4): each plate draws a
//! random tangent-plane velocity vector with speed in `[0.2, 1.0]`; a
//! boundary tile is a "head tile" when its outward normal aligns with its
//! plate's velocity (leading edge, GLOSSARY).

use crate::rng::WorldRng;
use crate::sphere::tangent_basis;
use crate::tile::PlateId;
use crate::topology::{TileId, Topology};

const MIN_SPEED: f64 = 0.2;
const MAX_SPEED: f64 = 1.0;

/// Draw one random tangent-plane velocity (east, north components) with
/// speed uniformly in `[0.2, 1.0]` and a uniformly random heading.
pub fn random_velocity(rng: &mut WorldRng) -> (f64, f64) {
    let speed = rng.next_range(MIN_SPEED, MAX_SPEED);
    let heading = rng.next_range(0.0, std::f64::consts::TAU);
    (speed * heading.cos(), speed * heading.sin())
}

/// A tile has a cross-plate neighbor: the raw geometric notion of
/// "boundary tile" used before classification (spec §4.5 step 5) assigns a
/// boundary kind.
pub fn is_boundary_tile(topo: &Topology, plate_id: &[PlateId], t: TileId) -> bool {
    let p = plate_id[t as usize];
    topo.neighbors(t).iter().any(|&n| plate_id[n as usize] != p)
}

/// Outward normal at a boundary tile: the tangent-plane direction pointing
/// away from the plate's own interior, approximated as the mean direction
/// toward its cross-plate neighbors.
fn outward_normal(topo: &Topology, plate_id: &[PlateId], t: TileId) -> (f64, f64) {
    let p = plate_id[t as usize];
    let center = topo.position(t);
    let (east, north) = tangent_basis(center);
    let mut ex = 0.0;
    let mut ey = 0.0;
    let mut count = 0;
    for &n in topo.neighbors(t) {
        if plate_id[n as usize] != p {
            let dir = topo.position(n) - center;
            ex += dir.dot(east);
            ey += dir.dot(north);
            count += 1;
        }
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    (ex / count as f64, ey / count as f64)
}

/// A tile is a head tile when `dot(velocity, outward_normal) > 0` (spec
/// §4.5 step 4, GLOSSARY "head tile").
pub fn is_head_tile(topo: &Topology, plate_id: &[PlateId], velocities: &[(f64, f64)], t: TileId) -> bool {
    let p = plate_id[t as usize];
    if p < 0 {
        return false;
    }
    let (vx, vy) = velocities[p as usize];
    let (nx, ny) = outward_normal(topo, plate_id, t);
    vx * nx + vy * ny > 0.0
}
