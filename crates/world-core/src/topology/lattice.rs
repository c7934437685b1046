//! Barycentric lattice subdivision of each icosahedron face, with dedup of
//! coincident points along shared edges/vertices (spec §4.2 step 2).

use std::collections::HashMap;

use super::icosahedron::{vertices as ico_vertices, FACES};
use crate::sphere::Vec3;

/// One raw lattice point before dedup: its projected position and the face
/// it was first generated from.
struct RawPoint {
    pos: Vec3,
    face_id: u8,
}

/// Quantization scale for dedup keys. True distinct Goldberg points at
/// resolutions up to a few hundred are separated by angles several orders
/// of magnitude larger than f64 round-off, so a fixed fine quantization is
/// safe across the whole practical resolution range.
const QUANT_SCALE: f64 = 1.0e8;

fn quantize(v: Vec3) -> (i64, i64, i64) {
    (
        (v.x * QUANT_SCALE).round() as i64,
        (v.y * QUANT_SCALE).round() as i64,
        (v.z * QUANT_SCALE).round() as i64,
    )
}

/// Result of lattice generation: deduplicated tile positions plus, for each
/// unique point, the face it was first seen on (used to seed neighbor
/// search windows) and whether it is one of the 12 icosahedron vertices.
pub struct Lattice {
    pub positions: Vec<Vec3>,
    pub face_id: Vec<u8>,
    pub is_pentagon: Vec<bool>,
}

/// Generate the deduplicated Goldberg GP(n,0) lattice for the given
/// resolution `n`. Produces exactly `10*n*n + 2` unique points, of which
/// exactly 12 are pentagons.
pub fn build_lattice(n: usize) -> Lattice {
    assert!(n >= 1, "resolution must be >= 1");
    let verts = ico_vertices();

    let mut raw: Vec<RawPoint> = Vec::with_capacity(20 * (n + 1) * (n + 2) / 2);
    for (face_idx, face) in FACES.iter().enumerate() {
        let [ia, ib, ic] = *face;
        let (a, b, c) = (verts[ia], verts[ib], verts[ic]);
        for i in 0..=n {
            for j in 0..=i {
                let bw_a = (n - i) as f64;
                let bw_b = (i - j) as f64;
                let bw_c = j as f64;
                let p = (a * bw_a + b * bw_b + c * bw_c) * (1.0 / n as f64);
                raw.push(RawPoint { pos: p.normalize(), face_id: face_idx as u8 });
            }
        }
    }

    let mut seen: HashMap<(i64, i64, i64), usize> = HashMap::with_capacity(raw.len());
    let mut positions = Vec::with_capacity(10 * n * n + 2);
    let mut face_id = Vec::with_capacity(10 * n * n + 2);

    for rp in raw {
        let key = quantize(rp.pos);
        seen.entry(key).or_insert_with(|| {
            positions.push(rp.pos);
            face_id.push(rp.face_id);
            positions.len() - 1
        });
    }

    // The 12 original icosahedron vertices are pentagons; everything else
    // generated by subdivision is a hexagon.
    let mut is_pentagon = vec![false; positions.len()];
    for v in verts {
        let key = quantize(v);
        if let Some(&idx) = seen.get(&key) {
            is_pentagon[idx] = true;
        }
    }

    Lattice { positions, face_id, is_pentagon }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_count_matches_goldberg_formula() {
        for n in [1usize, 2, 3, 5, 8, 12] {
            let lattice = build_lattice(n);
            assert_eq!(lattice.positions.len(), 10 * n * n + 2, "n={n}");
        }
    }

    #[test]
    fn exactly_twelve_pentagons() {
        for n in [1usize, 4, 7] {
            let lattice = build_lattice(n);
            let count = lattice.is_pentagon.iter().filter(|&&p| p).count();
            assert_eq!(count, 12, "n={n}");
        }
    }

    #[test]
    fn all_points_are_unit_length() {
        let lattice = build_lattice(6);
        for p in &lattice.positions {
            assert!((p.length() - 1.0).abs() < 1e-9);
        }
    }
}
