//! Sequential biome rule matching (spec §4.8): the first rule in a fixed,
//! ordered table whose conditions all hold wins; a winning rule may carry
//! variant sub-rules (matched the same way, by elevation band) for a finer
//! split such as "forest" into lowland/montane/high-montane bands.

use std::sync::OnceLock;

use crate::tile::Tile;

#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn any() -> Self {
        Self { min: f32::NEG_INFINITY, max: f32::INFINITY }
    }

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn contains(self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

pub struct BiomeRule {
    pub id: u16,
    pub name: &'static str,
    pub land: Option<bool>,
    pub biotemp_c: Range,
    pub annual_precip_mm: Range,
    pub elevation_m: Range,
    pub flora_forest_min: f32,
    pub flora_desert_min: f32,
    pub variants: &'static [(u8, Range)],
}

fn biotemperature_c(temp_jan_c: f32, temp_jul_c: f32) -> f32 {
    let clamp = |t: f32| t.clamp(0.0, 30.0);
    (clamp(temp_jan_c) + clamp(temp_jul_c)) / 2.0
}

/// Two sampled months standing in for the year, same approximation
/// `climate::koppen::classify_koppen` and `biomes::holdridge` both use.
fn annual_precip_mm(rain_jan_mm: f32, rain_jul_mm: f32) -> f32 {
    (rain_jan_mm + rain_jul_mm) * 6.0
}

fn matches(rule: &BiomeRule, tile: &Tile, biotemp_c: f32, annual_precip_mm: f32) -> bool {
    if let Some(want_land) = rule.land {
        if tile.is_land() != want_land {
            return false;
        }
    }
    rule.biotemp_c.contains(biotemp_c)
        && rule.annual_precip_mm.contains(annual_precip_mm)
        && rule.elevation_m.contains(tile.elevation_m)
        && tile.flora_forest >= rule.flora_forest_min
        && tile.flora_desert >= rule.flora_desert_min
}

fn pick_variant(rule: &BiomeRule, tile: &Tile) -> u8 {
    rule.variants.iter().find(|(_, range)| range.contains(tile.elevation_m)).map(|&(code, _)| code).unwrap_or(0)
}

const ALPINE_VARIANTS: [(u8, Range); 2] =
    [(1, Range::new(4000.0, f32::MAX)), (0, Range::new(f32::MIN, 4000.0))];

const FOREST_VARIANTS: [(u8, Range); 3] = [
    (0, Range::new(f32::MIN, 800.0)),
    (1, Range::new(800.0, 2200.0)),
    (2, Range::new(2200.0, f32::MAX)),
];

static RULES: OnceLock<Vec<BiomeRule>> = OnceLock::new();

/// The fixed, ordered biome rule table. Most specific / most extreme
/// conditions come first so they pre-empt the broader fallback rules
/// further down (spec §4.8 "first match wins").
fn default_rules() -> &'static [BiomeRule] {
    RULES
        .get_or_init(|| {
            vec![
                BiomeRule {
                    id: 0,
                    name: "ice_cap",
                    land: None,
                    biotemp_c: Range::new(f32::MIN, 1.5),
                    annual_precip_mm: Range::any(),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 1,
                    name: "ocean",
                    land: Some(false),
                    biotemp_c: Range::any(),
                    annual_precip_mm: Range::any(),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 2,
                    name: "alpine_tundra",
                    land: Some(true),
                    biotemp_c: Range::any(),
                    annual_precip_mm: Range::any(),
                    elevation_m: Range::new(3000.0, f32::MAX),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &ALPINE_VARIANTS,
                },
                BiomeRule {
                    id: 3,
                    name: "tundra",
                    land: Some(true),
                    biotemp_c: Range::new(1.5, 3.0),
                    annual_precip_mm: Range::any(),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 4,
                    name: "desert",
                    land: Some(true),
                    biotemp_c: Range::any(),
                    annual_precip_mm: Range::any(),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.45,
                    variants: &[],
                },
                BiomeRule {
                    id: 5,
                    name: "boreal_forest",
                    land: Some(true),
                    biotemp_c: Range::new(3.0, 9.0),
                    annual_precip_mm: Range::new(300.0, f32::MAX),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.35,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 6,
                    name: "tropical_rainforest",
                    land: Some(true),
                    biotemp_c: Range::new(22.0, f32::MAX),
                    annual_precip_mm: Range::new(1800.0, f32::MAX),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.5,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 7,
                    name: "savanna",
                    land: Some(true),
                    biotemp_c: Range::new(20.0, f32::MAX),
                    annual_precip_mm: Range::new(400.0, 1800.0),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 8,
                    name: "shrubland",
                    land: Some(true),
                    biotemp_c: Range::new(10.0, 24.0),
                    annual_precip_mm: Range::new(0.0, 500.0),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 9,
                    name: "temperate_grassland",
                    land: Some(true),
                    biotemp_c: Range::new(3.0, 20.0),
                    annual_precip_mm: Range::new(0.0, 650.0),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
                BiomeRule {
                    id: 10,
                    name: "temperate_forest",
                    land: Some(true),
                    biotemp_c: Range::any(),
                    annual_precip_mm: Range::new(500.0, f32::MAX),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.3,
                    flora_desert_min: 0.0,
                    variants: &FOREST_VARIANTS,
                },
                // Fallback for any land tile none of the above claimed
                // (e.g. cool and moderately dry with low flora weights).
                BiomeRule {
                    id: 11,
                    name: "temperate_grassland_fallback",
                    land: Some(true),
                    biotemp_c: Range::any(),
                    annual_precip_mm: Range::any(),
                    elevation_m: Range::any(),
                    flora_forest_min: 0.0,
                    flora_desert_min: 0.0,
                    variants: &[],
                },
            ]
        })
        .as_slice()
}

/// Classify one tile's biome id and variant (spec §4.8): first matching
/// rule in [`default_rules`] wins, falling back to its variant sub-table
/// (elevation-banded), defaulting to variant 0.
pub fn assign_biome(tile: &Tile) -> (u16, u8) {
    let biotemp = biotemperature_c(tile.temp_jan_c, tile.temp_jul_c);
    let precip = annual_precip_mm(tile.rain_jan_mm, tile.rain_jul_mm);

    for rule in default_rules() {
        if matches(rule, tile, biotemp, precip) {
            return (rule.id, pick_variant(rule, tile));
        }
    }
    (u16::MAX, 0)
}
