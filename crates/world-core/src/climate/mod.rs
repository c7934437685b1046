//! Coarse climate grid (spec §4.8): a G×G cell lattice mapping lat/lon,
//! built in two passes (the second with finer noise modulation), whose
//! temperature and rainfall fields are bilinearly sampled back onto tiles.

mod grid;
mod koppen;

pub use grid::{bilinear_weights, build_climate_grid, sample_onto_tiles, ClimateGrid};
pub use koppen::classify_koppen;
