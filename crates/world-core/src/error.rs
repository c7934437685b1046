//! Error taxonomy for the world synthesis pipeline (spec §7).
//!
//! Each variant carries the minimum context a caller needs to recover the
//! way spec §7 prescribes: invalid parameters are rejected before any tile
//! work starts, topology failures are fatal, stage validation failures are
//! retried by the orchestrator, constraint conflicts pause a stage pending
//! UI resolution, and internal assertions abort the whole pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("topology construction failed: {reason}")]
    TopologyConstruction { reason: String },

    #[error("stage `{stage}` failed validation: {reason}")]
    StageValidation { stage: &'static str, reason: String },

    #[error("constraint conflict on tile {tile} property {property}: {reason}")]
    ConstraintConflict {
        tile: u32,
        property: &'static str,
        reason: String,
        suggested_actions: Vec<String>,
    },

    #[error("stage `{stage}` cancelled")]
    Cancelled { stage: &'static str },

    #[error("internal assertion failed in stage `{stage}` (tile {tile:?}, field `{field}`): {reason}")]
    InternalAssertion {
        stage: &'static str,
        tile: Option<u32>,
        field: &'static str,
        reason: String,
    },
}

pub type WorldResult<T> = Result<T, WorldError>;

/// A structured, non-fatal diagnostic accumulated during a stage run.
/// The orchestrator collects these and the CLI tools print them with
/// `eprintln!`, following the teacher's no-logging-crate convention.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub stage: &'static str,
    pub tile: Option<u32>,
    pub field: Option<&'static str>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(stage: &'static str, message: impl Into<String>) -> Self {
        Self { stage, tile: None, field: None, message: message.into() }
    }

    pub fn on_tile(stage: &'static str, tile: u32, field: &'static str, message: impl Into<String>) -> Self {
        Self { stage, tile: Some(tile), field: Some(field), message: message.into() }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tile {
            Some(t) => write!(f, "[{}] tile {t} {}: {}", self.stage, self.field.unwrap_or(""), self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}
