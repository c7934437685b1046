//! Constraint manager (spec §4.9): per-tile property locks, snapshot and
//! restore around each stage, and conflict reporting.

use std::collections::HashMap;

use crate::tile::{LockLevel, LockableProperty, TileId};

/// A locked value, stored as the small set of scalar shapes a lockable
/// property can take. `f64` covers elevation/crust-age; `i32` covers
/// plate/river-direction/biome ids.
#[derive(Debug, Clone, Copy)]
pub enum LockValue {
    Scalar(f64),
    Id(i32),
}

#[derive(Debug, Clone)]
struct Lock {
    level: LockLevel,
    value: LockValue,
    /// Tolerance band for `Partial` locks: the post-stage value is clamped
    /// to `[value - tolerance, value + tolerance]` rather than overwritten.
    tolerance: f64,
}

/// A detected conflict between a lock and a physical invariant (spec §7
/// "Constraint conflict", surfaced as `{tile, property, reason,
/// suggested_actions}`).
#[derive(Debug, Clone)]
pub struct ConstraintReport {
    pub tile: TileId,
    pub property: LockableProperty,
    pub reason: String,
    pub suggested_actions: Vec<String>,
}

/// Tracks every locked `(tile, property)` pair and mediates the
/// snapshot/restore lifecycle around a stage's execution.
#[derive(Debug, Default)]
pub struct ConstraintManager {
    locks: HashMap<(TileId, LockableProperty), Lock>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_lock(&mut self, tile: TileId, property: LockableProperty, level: LockLevel, value: LockValue, tolerance: f64) {
        self.locks.insert((tile, property), Lock { level, value, tolerance });
    }

    pub fn clear_lock(&mut self, tile: TileId, property: LockableProperty) {
        self.locks.remove(&(tile, property));
    }

    pub fn is_locked(&self, tile: TileId, property: LockableProperty) -> bool {
        self.locks.contains_key(&(tile, property))
    }

    pub fn lock_level(&self, tile: TileId, property: LockableProperty) -> LockLevel {
        self.locks.get(&(tile, property)).map(|l| l.level).unwrap_or(LockLevel::Free)
    }

    /// Post-stage: for a fully-locked tile, return the locked value
    /// verbatim; for a partially-locked tile, clamp `generated` within the
    /// recorded tolerance band; otherwise pass `generated` through
    /// unchanged (spec §4.9 step 3).
    pub fn reconcile_scalar(&self, tile: TileId, property: LockableProperty, generated: f64) -> f64 {
        match self.locks.get(&(tile, property)) {
            Some(Lock { level: LockLevel::FullyLocked, value: LockValue::Scalar(v), .. }) => *v,
            Some(Lock { level: LockLevel::Partial, value: LockValue::Scalar(v), tolerance }) => {
                generated.clamp(v - tolerance, v + tolerance)
            }
            _ => generated,
        }
    }

    pub fn reconcile_id(&self, tile: TileId, property: LockableProperty, generated: i32) -> i32 {
        match self.locks.get(&(tile, property)) {
            Some(Lock { level: LockLevel::FullyLocked, value: LockValue::Id(v), .. }) => *v,
            _ => generated,
        }
    }

    /// Locked property values to seed into a stage's working fields before
    /// it runs (spec §4.9 step 1 "load locked values into active fields").
    pub fn locked_scalar(&self, tile: TileId, property: LockableProperty) -> Option<f64> {
        match self.locks.get(&(tile, property)) {
            Some(Lock { value: LockValue::Scalar(v), .. }) => Some(*v),
            _ => None,
        }
    }

    pub fn locked_id(&self, tile: TileId, property: LockableProperty) -> Option<i32> {
        match self.locks.get(&(tile, property)) {
            Some(Lock { value: LockValue::Id(v), .. }) => Some(*v),
            _ => None,
        }
    }

    /// Detect a conflict: a river source locked on a tile whose every
    /// neighbor is higher (spec §8 S4 "source lacks descending neighbor").
    pub fn check_river_source_conflict(
        &self,
        tile: TileId,
        tile_elevation: f64,
        neighbor_elevations: &[f64],
    ) -> Option<ConstraintReport> {
        if !self.is_locked(tile, LockableProperty::RiverSource) {
            return None;
        }
        if neighbor_elevations.iter().all(|&e| e >= tile_elevation) {
            return Some(ConstraintReport {
                tile,
                property: LockableProperty::RiverSource,
                reason: "source lacks descending neighbor".to_string(),
                suggested_actions: vec!["skip".to_string(), "carve".to_string(), "relax".to_string()],
            });
        }
        None
    }

    pub fn all_locks(&self) -> impl Iterator<Item = (&(TileId, LockableProperty), LockLevel)> {
        self.locks.iter().map(|(k, v)| (k, v.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_locked_scalar_wins_over_generated_value() {
        let mut mgr = ConstraintManager::new();
        mgr.apply_lock(5, LockableProperty::Elevation, LockLevel::FullyLocked, LockValue::Scalar(1234.0), 0.0);
        assert_eq!(mgr.reconcile_scalar(5, LockableProperty::Elevation, 99.0), 1234.0);
    }

    #[test]
    fn partial_lock_clamps_within_tolerance() {
        let mut mgr = ConstraintManager::new();
        mgr.apply_lock(5, LockableProperty::Elevation, LockLevel::Partial, LockValue::Scalar(1000.0), 50.0);
        assert_eq!(mgr.reconcile_scalar(5, LockableProperty::Elevation, 2000.0), 1050.0);
        assert_eq!(mgr.reconcile_scalar(5, LockableProperty::Elevation, 0.0), 950.0);
    }

    #[test]
    fn river_source_conflict_detected_when_all_neighbors_higher() {
        let mut mgr = ConstraintManager::new();
        mgr.apply_lock(5, LockableProperty::RiverSource, LockLevel::FullyLocked, LockValue::Id(1), 0.0);
        let report = mgr.check_river_source_conflict(5, 100.0, &[150.0, 200.0, 110.0]);
        assert!(report.is_some());
        assert_eq!(report.unwrap().reason, "source lacks descending neighbor");
    }

    #[test]
    fn no_conflict_when_unlocked() {
        let mgr = ConstraintManager::new();
        assert!(mgr.check_river_source_conflict(5, 100.0, &[150.0]).is_none());
    }
}
