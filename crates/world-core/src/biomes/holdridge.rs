//! Holdridge life-zone flora weighting (spec §4.8): biotemperature and a
//! precipitation/PET ratio place every tile in a life-zone humidity
//! province, which seeds a forest/grass/shrub/desert weight vector that a
//! local noise sample then perturbs before renormalizing.

use crate::noise::Fbm;
use crate::sphere::Vec3;

/// Holdridge's empirical PET constant: potential evapotranspiration in mm
/// per year is `58.93 * biotemperature_c`.
const PET_CONSTANT: f64 = 58.93;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloraWeights {
    pub forest: f32,
    pub grass: f32,
    pub shrub: f32,
    pub desert: f32,
}

impl FloraWeights {
    pub fn new(forest: f32, grass: f32, shrub: f32, desert: f32) -> Self {
        Self { forest, grass, shrub, desert }
    }

    /// Rescale so the four weights sum to 1, clamping any noise-jittered
    /// negative back to zero first.
    pub fn normalize(self) -> Self {
        let forest = self.forest.max(0.0);
        let grass = self.grass.max(0.0);
        let shrub = self.shrub.max(0.0);
        let desert = self.desert.max(0.0);
        let sum = forest + grass + shrub + desert;
        if sum <= 1e-6 {
            return Self::new(0.0, 1.0, 0.0, 0.0);
        }
        Self::new(forest / sum, grass / sum, shrub / sum, desert / sum)
    }
}

/// Monthly mean temperatures below freezing or above 30C don't contribute
/// additional growing-season heat in Holdridge's system, so each proxy
/// month clamps to `[0, 30]` before averaging.
pub fn biotemperature_c(temp_jan_c: f32, temp_jul_c: f32) -> f64 {
    let clamp = |t: f32| t.clamp(0.0, 30.0) as f64;
    (clamp(temp_jan_c) + clamp(temp_jul_c)) / 2.0
}

/// Two sampled months standing in for the year, the same approximation
/// `climate::koppen::classify_koppen` uses for its own annual rainfall.
fn annual_precip_mm(rain_jan_mm: f32, rain_jul_mm: f32) -> f64 {
    (rain_jan_mm as f64 + rain_jul_mm as f64) * 6.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HumidityProvince {
    Superarid,
    Perarid,
    Arid,
    Semiarid,
    Subhumid,
    Humid,
    Perhumid,
    Superhumid,
}

/// Classify the PET ratio (potential evapotranspiration / precipitation)
/// into Holdridge's eight humidity provinces. Each halving of the ratio
/// moves one province wetter.
fn classify_humidity(pet_ratio: f64) -> HumidityProvince {
    if pet_ratio >= 32.0 {
        HumidityProvince::Superarid
    } else if pet_ratio >= 16.0 {
        HumidityProvince::Perarid
    } else if pet_ratio >= 8.0 {
        HumidityProvince::Arid
    } else if pet_ratio >= 4.0 {
        HumidityProvince::Semiarid
    } else if pet_ratio >= 2.0 {
        HumidityProvince::Subhumid
    } else if pet_ratio >= 1.0 {
        HumidityProvince::Humid
    } else if pet_ratio >= 0.5 {
        HumidityProvince::Perhumid
    } else {
        HumidityProvince::Superhumid
    }
}

fn base_weights(province: HumidityProvince) -> FloraWeights {
    match province {
        HumidityProvince::Superarid => FloraWeights::new(0.0, 0.0, 0.15, 0.85),
        HumidityProvince::Perarid => FloraWeights::new(0.0, 0.05, 0.25, 0.70),
        HumidityProvince::Arid => FloraWeights::new(0.02, 0.15, 0.33, 0.50),
        HumidityProvince::Semiarid => FloraWeights::new(0.10, 0.35, 0.35, 0.20),
        HumidityProvince::Subhumid => FloraWeights::new(0.30, 0.45, 0.20, 0.05),
        HumidityProvince::Humid => FloraWeights::new(0.55, 0.35, 0.08, 0.02),
        HumidityProvince::Perhumid => FloraWeights::new(0.75, 0.20, 0.05, 0.0),
        HumidityProvince::Superhumid => FloraWeights::new(0.90, 0.08, 0.02, 0.0),
    }
}

/// Cold tiles can't support closed-canopy forest no matter how wet they
/// are: below 6C biotemperature, shift weight from forest toward grass,
/// shrub, and (at the coldest end) desert-like tundra barrens.
fn apply_cold_bias(weights: FloraWeights, biotemp_c: f64) -> FloraWeights {
    if biotemp_c >= 6.0 {
        return weights;
    }
    let cold_fraction = ((6.0 - biotemp_c) / 6.0).clamp(0.0, 1.0) as f32;
    let shifted = weights.forest * cold_fraction;
    FloraWeights::new(
        weights.forest - shifted,
        weights.grass + shifted * 0.6,
        weights.shrub + shifted * 0.3,
        weights.desert + shifted * 0.1,
    )
}

/// Compute one tile's flora weight vector (spec §4.8): biotemperature and
/// precipitation fix the humidity province and its base weights, a cold
/// bias reshapes them toward tundra at low biotemperature, and a position
/// sample from `noise` jitters the result before final renormalization.
pub fn holdridge_flora_weights(
    pos: Vec3,
    temp_jan_c: f32,
    temp_jul_c: f32,
    rain_jan_mm: f32,
    rain_jul_mm: f32,
    noise: &Fbm,
) -> FloraWeights {
    let biotemp_c = biotemperature_c(temp_jan_c, temp_jul_c);
    let precip_mm = annual_precip_mm(rain_jan_mm, rain_jul_mm).max(1.0);
    let pet_mm = PET_CONSTANT * biotemp_c.max(0.0);
    let pet_ratio = pet_mm / precip_mm;

    let province = classify_humidity(pet_ratio);
    let weights = apply_cold_bias(base_weights(province), biotemp_c);

    let jitter = (noise.sample(pos) * 0.15) as f32;
    FloraWeights::new(
        weights.forest + jitter,
        weights.grass - jitter * 0.3,
        weights.shrub - jitter * 0.3,
        weights.desert - jitter * 0.4,
    )
    .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_noise() -> Fbm {
        Fbm::new(1, 0.7, 2, 4.0)
    }

    #[test]
    fn weights_always_sum_to_one() {
        let noise = flat_noise();
        let cases = [
            (28.0, 29.0, 300.0, 350.0, Vec3::from_latlon(0.0, 0.0)),
            (-10.0, -2.0, 5.0, 8.0, Vec3::from_latlon(70.0, 40.0)),
            (30.0, 30.0, 2.0, 1.0, Vec3::from_latlon(20.0, 120.0)),
        ];
        for (tj, tl, rj, rl, pos) in cases {
            let w = holdridge_flora_weights(pos, tj, tl, rj, rl, &noise);
            let sum = w.forest + w.grass + w.shrub + w.desert;
            assert!((sum - 1.0).abs() < 1e-4, "weights {w:?} summed to {sum}");
        }
    }

    #[test]
    fn hot_wet_tile_favors_forest() {
        let noise = flat_noise();
        let w = holdridge_flora_weights(Vec3::from_latlon(0.0, 0.0), 26.0, 27.0, 300.0, 320.0, &noise);
        assert!(w.forest > w.desert);
        assert!(w.forest > w.grass);
    }

    #[test]
    fn cold_dry_tile_favors_desert_or_grass() {
        let noise = flat_noise();
        let w = holdridge_flora_weights(Vec3::from_latlon(65.0, 0.0), -15.0, -5.0, 4.0, 6.0, &noise);
        assert!(w.forest < 0.3);
    }
}
