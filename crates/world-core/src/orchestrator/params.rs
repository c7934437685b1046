//! Global generation parameters (spec §6 `new_world` params).
//!
//! Mirrors the teacher's `generator::GlobalParams` (a flat, `Default`-able,
//! `serde`-derived config struct consumed by every pipeline stage) but
//! carries the sphere-pipeline's own knobs instead of the grid pipeline's.

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseStackParams {
    pub scale: f64,
    pub persistence: f32,
    pub lacunarity: f32,
    pub octaves: u32,
    pub weight: f64,
}

impl Default for NoiseStackParams {
    fn default() -> Self {
        Self { scale: 4.0, persistence: 0.75, lacunarity: 2.0, octaves: 5, weight: 1.0 }
    }
}

/// Per-stage enable flags (spec §6 `new_world` "stage enable flags").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageFlags {
    pub tectonics: bool,
    pub features: bool,
    pub hydrology: bool,
    pub climate: bool,
    pub biomes: bool,
}

impl Default for StageFlags {
    fn default() -> Self {
        Self { tectonics: true, features: true, hydrology: true, climate: true, biomes: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalParams {
    pub resolution: usize,
    pub sea_level_m: f32,
    pub seed: u64,
    pub plate_count: usize,
    pub continental_ratio: f32,
    /// Primary terrain-detail noise stack ("stack A" in spec §6).
    pub noise_stack_a: NoiseStackParams,
    /// Secondary, coarser noise stack ("stack B").
    pub noise_stack_b: NoiseStackParams,
    pub distance_penalty: f64,
    pub warp_strength: f64,
    /// Boundary-vote winning threshold (spec §4.5 step 5). Default 0.525.
    pub voting_threshold: f32,
    /// Crust age spread multiplier (spec §4.5 step 6). Default 2.5.
    pub crust_age_spread: f32,
    pub land_seed_density: f64,
    pub coastal_boost_range: (f32, f32),
    pub coastal_boost_height: f32,
    pub climate_grid_size: usize,
    pub max_retries: u32,
    pub stage_flags: StageFlags,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            resolution: 40,
            sea_level_m: 0.0,
            seed: 42,
            plate_count: 12,
            continental_ratio: 0.4,
            noise_stack_a: NoiseStackParams::default(),
            noise_stack_b: NoiseStackParams {
                scale: 9.0,
                persistence: 0.6,
                lacunarity: 2.0,
                octaves: 4,
                weight: 0.4,
            },
            distance_penalty: 0.15,
            warp_strength: 0.35,
            voting_threshold: 0.525,
            crust_age_spread: 2.5,
            land_seed_density: 0.5,
            coastal_boost_range: (1.0, 3.0),
            coastal_boost_height: 150.0,
            climate_grid_size: 64,
            max_retries: 10,
            stage_flags: StageFlags::default(),
        }
    }
}

impl GlobalParams {
    /// Reject obviously-invalid parameters before any tile work starts
    /// (spec §7 "Invalid parameter").
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.resolution == 0 {
            return Err(WorldError::InvalidParameter {
                field: "resolution",
                reason: "must be >= 1".to_string(),
            });
        }
        if self.plate_count == 0 {
            return Err(WorldError::InvalidParameter {
                field: "plate_count",
                reason: "must be >= 1".to_string(),
            });
        }
        let expected_tiles = 10 * self.resolution * self.resolution + 2;
        if self.plate_count > expected_tiles {
            return Err(WorldError::InvalidParameter {
                field: "plate_count",
                reason: format!("cannot exceed tile count ({expected_tiles})"),
            });
        }
        if !(0.0..=1.0).contains(&self.continental_ratio) {
            return Err(WorldError::InvalidParameter {
                field: "continental_ratio",
                reason: "must be in [0, 1]".to_string(),
            });
        }
        if ![32usize, 64, 128].contains(&self.climate_grid_size) {
            return Err(WorldError::InvalidParameter {
                field: "climate_grid_size",
                reason: "must be one of {32, 64, 128}".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.voting_threshold) {
            return Err(WorldError::InvalidParameter {
                field: "voting_threshold",
                reason: "must be in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        GlobalParams::default().validate().unwrap();
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let p = GlobalParams { resolution: 0, ..GlobalParams::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn bad_climate_grid_size_is_rejected() {
        let p = GlobalParams { climate_grid_size: 50, ..GlobalParams::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn too_many_plates_is_rejected() {
        let p = GlobalParams { resolution: 1, plate_count: 999, ..GlobalParams::default() };
        assert!(p.validate().is_err());
    }
}
