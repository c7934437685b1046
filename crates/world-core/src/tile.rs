//! Per-tile data model and object tables (spec §3).
//!
//! Tiles are stored contiguously and indexed `0..N-1`; every later pipeline
//! stage reads earlier fields and writes only the fields it owns (spec §5).
//! Plate/microplate/feature records are plain `Vec<Record>` tables indexed
//! by `usize` — the "slot-map" spec §9 asks for, grounded in the teacher's
//! own `plates::ridges::generate_ridges` / `plates::mod::PlateSimulation`
//! pattern of returning flat `Vec<T>` tables rather than reaching for an
//! external slot-map crate.

use serde::{Deserialize, Serialize};

use crate::sphere::Vec3;

/// Internal macro generating a small, explicit `bitflags`-style type without
/// the external crate: just enough surface (`empty`, `contains`, `insert`,
/// `remove`, bitor) for the flag set below.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $int:ty {
            $(const $flag:ident = $val:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        pub struct $name($int);

        impl $name {
            $(pub const $flag: $name = $name($val);)*

            pub const fn empty() -> Self { $name(0) }

            pub const fn bits(self) -> $int { self.0 }

            pub const fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: $name) {
                self.0 &= !other.0;
            }

            pub fn set(&mut self, other: $name, value: bool) {
                if value { self.insert(other) } else { self.remove(other) }
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

pub type TileId = u32;
pub type PlateId = i32; // -1 = unassigned
pub type MicroplateId = i32; // -1 = none
pub type OrogenyId = u32;
pub type HotspotId = u32;
pub type VolcanoId = u32;
pub type WaterbodyId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrustKind {
    Oceanic,
    Continental,
    Transitional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    None,
    Convergent,
    Divergent,
    Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FeatureKind {
    #[default]
    None,
    OrogenyBelt,
    RiftValley,
    TransformRidge,
    ContinentalShelf,
    Hotspot,
    Volcano,
    AncientOrogeny,
    AncientUplift,
}

/// Rock type enum. Spec calls for "~35" variants; this set spans the
/// igneous/sedimentary/metamorphic families the rock-type rule pass
/// (spec §4.6) actually dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RockType {
    #[default]
    Unassigned,
    // Igneous, extrusive
    Basalt,
    Andesite,
    Rhyolite,
    Obsidian,
    Pumice,
    Tuff,
    // Igneous, intrusive
    Granite,
    Diorite,
    Gabbro,
    Peridotite,
    // Sedimentary, clastic
    Sandstone,
    Siltstone,
    Shale,
    Conglomerate,
    Mudstone,
    // Sedimentary, chemical/organic
    Limestone,
    Dolomite,
    Chalk,
    Coal,
    Evaporite,
    Chert,
    // Metamorphic
    Slate,
    Phyllite,
    Schist,
    Gneiss,
    Marble,
    Quartzite,
    Amphibolite,
    Eclogite,
    // Unconsolidated / surficial
    Alluvium,
    GlacialTill,
    Loess,
    VolcanicAsh,
    Laterite,
    Peat,
    SeaFloorSediment,
}

/// Lock level for a single lockable property on a single tile (spec §3, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LockLevel {
    #[default]
    Free,
    Partial,
    FullyLocked,
}

/// Lockable per-tile properties, used as keys into the constraint manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockableProperty {
    Plate,
    Elevation,
    CrustAge,
    RiverSource,
    RiverFlowDir,
    Biome,
    RockType,
}

bitflags_like! {
    /// Per-tile flag bitfield (spec §3). Hand-rolled rather than pulling in
    /// the `bitflags` crate: the teacher repo never uses bit-packed flags,
    /// and the set here is small and stable enough that const masks plus a
    /// handful of accessor methods read just as clearly.
    pub struct TileFlags: u32 {
        const BOUNDARY    = 1 << 0;
        const UPLIFT      = 1 << 1;
        const FOSSIL      = 1 << 2;
        const HAS_RIVER   = 1 << 3;
        const HAS_LAKE    = 1 << 4;
        const HAS_GLACIER = 1 << 5;
        const COASTAL     = 1 << 6;
        const ERODED      = 1 << 7;
        const LAND        = 1 << 8;
        const PENTAGON    = 1 << 9;
        const HEAD_TILE   = 1 << 10;
    }
}

/// A single macro-scale tectonic plate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plate {
    pub id: PlateId,
    pub seed_tile: TileId,
    pub kind: CrustKind,
    /// Size tier 1..4, drives the crust-fraction draw (spec §4.5 step 1).
    pub size_tier: u8,
    pub crust_fraction: f32,
    /// Tangent-plane velocity at the seed tile, speed in [0.2, 1.0].
    pub velocity: (f64, f64),
    pub direction_seed: u64,
    pub tile_count: u32,
    pub head_tiles: Vec<TileId>,
    pub convergent_tiles: Vec<TileId>,
    pub divergent_tiles: Vec<TileId>,
    pub transform_tiles: Vec<TileId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Microplate {
    pub id: MicroplateId,
    pub parent_plate: PlateId,
    pub seed_tile: TileId,
    pub kind: CrustKind,
    pub tile_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrogenyRecord {
    pub id: OrogenyId,
    pub parent_boundary_plate: PlateId,
    pub spine: Vec<TileId>,
    pub severity: Vec<(TileId, f32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: HotspotId,
    pub track: Vec<TileId>,
    pub age_gradient: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolcanoType {
    ShieldVolcano,
    StratoVolcano,
    CinderCone,
    Caldera,
    FissureVent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volcano {
    pub id: VolcanoId,
    pub tile: TileId,
    pub kind: VolcanoType,
    pub intensity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waterbody {
    pub id: WaterbodyId,
    pub tiles: Vec<TileId>,
    pub perimeter: Vec<TileId>,
    pub is_lake: bool,
}

/// The contiguous, value-typed tile record (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    // Geometric
    pub pos: Vec3,
    pub lat: f64,
    pub lon: f64,
    pub is_pentagon: bool,
    pub face_id: u8,

    // Tectonic
    pub plate_id: PlateId,
    pub microplate_id: MicroplateId,
    pub crust_kind: CrustKind,
    pub crust_age: f32,
    pub crust_thickness: f32,
    pub boundary_kind: BoundaryKind,
    pub rock_type: RockType,
    pub feature_kind: FeatureKind,
    pub elevation_m: f32,

    // Hydrology
    pub waterbody_id: Option<WaterbodyId>,
    pub flow_accumulation: f32,
    pub lake_driver: f32,
    pub ice_thickness: f32,
    pub river_flow_dir: i32, // neighbor slot index, or -1 for sink/none

    // Soil
    pub clay: f32,
    pub silt: f32,
    pub sand: f32,
    pub organic: f32,
    pub soil_depth: f32,
    pub sediment: f32,

    // Climate
    pub temp_jan_c: f32,
    pub temp_jul_c: f32,
    pub rain_jan_mm: f32,
    pub rain_jul_mm: f32,
    pub koppen: u8,
    pub biome_id: u16,
    pub biome_variant: u8,
    pub flora_forest: f32,
    pub flora_grass: f32,
    pub flora_shrub: f32,
    pub flora_desert: f32,

    pub flags: TileFlags,
}

impl Tile {
    pub fn new(pos: Vec3, is_pentagon: bool, face_id: u8) -> Self {
        let (lat, lon) = pos.to_latlon();
        Self {
            pos,
            lat,
            lon,
            is_pentagon,
            face_id,
            plate_id: -1,
            microplate_id: -1,
            crust_kind: CrustKind::Oceanic,
            crust_age: 1.0,
            crust_thickness: 7.0,
            boundary_kind: BoundaryKind::None,
            rock_type: RockType::Unassigned,
            feature_kind: FeatureKind::None,
            elevation_m: 0.0,
            waterbody_id: None,
            flow_accumulation: 0.0,
            lake_driver: 0.0,
            ice_thickness: 0.0,
            river_flow_dir: -1,
            clay: 0.25,
            silt: 0.25,
            sand: 0.25,
            organic: 0.25,
            soil_depth: 0.0,
            sediment: 0.0,
            temp_jan_c: 0.0,
            temp_jul_c: 0.0,
            rain_jan_mm: 0.0,
            rain_jul_mm: 0.0,
            koppen: 0,
            biome_id: 0,
            biome_variant: 0,
            flora_forest: 0.0,
            flora_grass: 0.0,
            flora_shrub: 0.0,
            flora_desert: 0.0,
            flags: TileFlags::empty(),
        }
    }

    #[inline]
    pub fn is_land(&self) -> bool {
        self.flags.contains(TileFlags::LAND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_roundtrip() {
        let mut f = TileFlags::empty();
        assert!(!f.contains(TileFlags::COASTAL));
        f.insert(TileFlags::COASTAL | TileFlags::HAS_RIVER);
        assert!(f.contains(TileFlags::COASTAL));
        assert!(f.contains(TileFlags::HAS_RIVER));
        f.remove(TileFlags::COASTAL);
        assert!(!f.contains(TileFlags::COASTAL));
        assert!(f.contains(TileFlags::HAS_RIVER));
    }

    #[test]
    fn new_tile_defaults_to_unassigned_plate() {
        let t = Tile::new(Vec3::new(1.0, 0.0, 0.0), false, 0);
        assert_eq!(t.plate_id, -1);
        assert_eq!(t.microplate_id, -1);
        assert!(!t.is_land());
    }
}
