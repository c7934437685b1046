//! Generation orchestrator (spec §4.9, §6): drives each stage in
//! dependency order, reports progress, and enforces locked-property
//! constraints across stage boundaries.

mod constraint;
mod params;
mod stage;
mod verify;

pub use constraint::{ConstraintManager, ConstraintReport, LockValue};
pub use params::{GlobalParams, NoiseStackParams, StageFlags};
pub use stage::{Orchestrator, ProgressEvent, Stage, StageOutcome, StageState};
pub use verify::{run_all_checks, VerificationReport};
