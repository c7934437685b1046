//! World snapshot (spec §6 `save`/`load`): the full generated state
//! serialized with `serde_json`, the only serialization format anywhere in
//! this dependency stack. Topology itself is not serialized — it is pure
//! function of `params.resolution` and is rebuilt deterministically on
//! load instead of duplicating `10n^2+2` position vectors on disk.

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};
use crate::orchestrator::GlobalParams;
use crate::tile::{Hotspot, OrogenyRecord, Plate, Tile, Volcano, Waterbody};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub params: GlobalParams,
    pub tiles: Vec<Tile>,
    pub plates: Vec<Plate>,
    pub orogenies: Vec<OrogenyRecord>,
    pub hotspots: Vec<Hotspot>,
    pub volcanoes: Vec<Volcano>,
    pub waterbodies: Vec<Waterbody>,
}

impl WorldSnapshot {
    pub fn to_json(&self) -> WorldResult<String> {
        serde_json::to_string(self).map_err(|e| WorldError::InternalAssertion {
            stage: "snapshot",
            tile: None,
            field: "serialize",
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> WorldResult<Self> {
        let snapshot: Self = serde_json::from_str(json).map_err(|e| WorldError::InternalAssertion {
            stage: "snapshot",
            tile: None,
            field: "deserialize",
            reason: e.to_string(),
        })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(WorldError::InternalAssertion {
                stage: "snapshot",
                tile: None,
                field: "version",
                reason: format!("unsupported snapshot version {} (expected {SNAPSHOT_VERSION})", snapshot.version),
            });
        }
        Ok(snapshot)
    }
}
