//! Fractional Brownian Motion noise synthesis, sampled directly in 3D over
//! the sphere (spec §4.4): no lat/lon projection, so no pole seam.
//!
//! fBm: sum of octaves with amplitude = gain^i and frequency = lacunarity^i.
//! Persistence: gain = lacunarity^(−H).  For lacunarity=2, H=0.75 → gain≈0.595.
use noise::{NoiseFn, Perlin};

use crate::sphere::Vec3;

pub struct Fbm {
    pub h: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    pub scale: f64,
    noise: Perlin,
}

impl Fbm {
    /// Construct an fBm with the given seed, Hurst exponent, octave count,
    /// and spatial scale (frequency multiplier applied before octave 0).
    /// `lacunarity` is fixed at 2.0; gain is derived from H.
    pub fn new(seed: u32, h: f32, octaves: u32, scale: f64) -> Self {
        Self { h, octaves, lacunarity: 2.0, scale, noise: Perlin::new(seed) }
    }

    /// Per-octave amplitude decay: gain = lacunarity^(−H).
    #[inline]
    fn gain(&self) -> f64 {
        (self.lacunarity as f64).powf(-(self.h as f64))
    }

    /// The geometric normalization factor so the octave sum lies in ≈[-1,1]:
    /// the sum of a geometric series with ratio `gain`.
    fn normalizer(&self) -> f64 {
        let gain = self.gain();
        if (gain - 1.0).abs() < 1e-9 {
            self.octaves as f64
        } else {
            (1.0 - gain.powi(self.octaves as i32)) / (1.0 - gain)
        }
    }

    /// Evaluate fBm at a point on (or near) the unit sphere.
    ///
    /// Returns a normalized value in ≈[-1, 1] regardless of octave count.
    pub fn sample(&self, p: Vec3) -> f64 {
        let gain = self.gain();
        let mut value = 0.0f64;
        let mut amp = 1.0f64;
        let mut freq = self.scale;
        for _ in 0..self.octaves {
            value += amp * self.noise.get([p.x * freq, p.y * freq, p.z * freq]);
            amp *= gain;
            freq *= self.lacunarity as f64;
        }
        value / self.normalizer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sphere(seed: u32, h: f32, n: usize) -> Vec<f64> {
        let fbm = Fbm::new(seed, h, 8, 4.0);
        (0..n)
            .map(|i| {
                let lat = -80.0 + 160.0 * i as f64 / n as f64;
                let lon = -170.0 + 340.0 * (i * 7 % n) as f64 / n as f64;
                fbm.sample(Vec3::from_latlon(lat, lon))
            })
            .collect()
    }

    #[test]
    fn fbm_produces_non_constant_output() {
        let samples = sample_sphere(42, 0.75, 64);
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.01);
    }

    #[test]
    fn output_stays_within_normalized_range() {
        let samples = sample_sphere(7, 0.6, 256);
        for s in samples {
            assert!(s.abs() <= 1.5, "sample {s} exceeds expected normalized range");
        }
    }

    #[test]
    fn same_seed_and_position_is_deterministic() {
        let fbm = Fbm::new(42, 0.75, 8, 4.0);
        let p = Vec3::from_latlon(12.0, 34.0);
        assert_eq!(fbm.sample(p), fbm.sample(p));
    }

    #[test]
    fn different_seeds_diverge() {
        let a = Fbm::new(1, 0.75, 8, 4.0);
        let b = Fbm::new(2, 0.75, 8, 4.0);
        let p = Vec3::from_latlon(12.0, 34.0);
        assert_ne!(a.sample(p), b.sample(p));
    }
}
