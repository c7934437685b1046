//! The 12 canonical icosahedron vertices and 20 triangular faces used as the
//! seed mesh for the Goldberg subdivision (spec §4.2 step 1).

use crate::sphere::Vec3;

/// Golden ratio.
const PHI: f64 = 1.618_033_988_749_895;

/// The 12 icosahedron vertices, unnormalized. Index order matches the
/// face table below.
fn raw_vertices() -> [Vec3; 12] {
    let t = PHI;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// The 20 triangular faces, each a triple of indices into [`vertices`].
pub const FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// The 12 icosahedron vertices, normalized and rotated so that the centroid
/// of face 0 sits at the north pole (spec §4.2 step 1: face-centered
/// orientation).
pub fn vertices() -> [Vec3; 12] {
    let raw = raw_vertices();
    let normalized: Vec<Vec3> = raw.iter().map(|v| v.normalize()).collect();

    // Orient so that face 0's centroid aligns with (0,0,1).
    let [a, b, c] = FACES[0];
    let face_centroid = crate::sphere::centroid(&[normalized[a], normalized[b], normalized[c]]);
    let target = Vec3::new(0.0, 0.0, 1.0);
    let rotation = rotation_aligning(face_centroid, target);

    let mut out = [Vec3::new(0.0, 0.0, 0.0); 12];
    for (i, v) in normalized.iter().enumerate() {
        out[i] = rotation(*v);
    }
    out
}

/// Build a rotation (as a closure) that maps unit vector `from` onto unit
/// vector `to`, via Rodrigues' rotation formula.
fn rotation_aligning(from: Vec3, to: Vec3) -> impl Fn(Vec3) -> Vec3 {
    let axis_raw = from.cross(to);
    let axis_len = axis_raw.length();
    let cos_theta = from.dot(to).clamp(-1.0, 1.0);

    if axis_len < 1e-12 {
        // Already aligned, or exactly antipodal (never happens for this mesh).
        return move |v: Vec3| v;
    }
    let axis = axis_raw.normalize();
    let sin_theta = axis_len;

    move |v: Vec3| {
        // Rodrigues: v_rot = v*cosθ + (axis × v)*sinθ + axis*(axis·v)*(1-cosθ)
        let term1 = v * cos_theta;
        let term2 = axis.cross(v) * sin_theta;
        let term3 = axis * (axis.dot(v) * (1.0 - cos_theta));
        (term1 + term2 + term3).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_are_unit_length() {
        for v in vertices() {
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn face_zero_centroid_is_near_north_pole() {
        let v = vertices();
        let [a, b, c] = FACES[0];
        let centroid = crate::sphere::centroid(&[v[a], v[b], v[c]]);
        assert!(centroid.z > 0.99, "face 0 centroid should sit near the north pole, z={}", centroid.z);
    }

    #[test]
    fn all_faces_reference_valid_vertices() {
        for face in FACES {
            for idx in face {
                assert!(idx < 12);
            }
        }
    }

    #[test]
    fn each_vertex_touches_exactly_five_faces() {
        let mut counts = [0u32; 12];
        for face in FACES {
            for idx in face {
                counts[idx] += 1;
            }
        }
        for c in counts {
            assert_eq!(c, 5, "every icosahedron vertex must be shared by exactly 5 faces");
        }
    }
}
