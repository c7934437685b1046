//! Stage trait and orchestrator run loop (spec §4.9, §6): drives stages in
//! dependency order, streaming progress events and honoring pause/cancel.

use std::time::Duration;

use crate::error::WorldResult;

/// Lifecycle state of one stage within a run (spec §6 `run(stages)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    NotStarted,
    Running,
    Paused,
    Completed,
    Skipped,
    Failed,
}

/// One progress update emitted while a stage runs.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub stage: &'static str,
    pub state: StageState,
    pub tiles_done: usize,
    pub tiles_total: usize,
    pub elapsed: Duration,
}

/// A single pipeline stage. Implementors expose their dependency names so
/// the orchestrator can order the run, and a coarse tile-count estimate so
/// progress events are meaningful.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn dependencies(&self) -> &'static [&'static str];
    fn tiles_total(&self) -> usize;
}

/// Outcome handed back to a caller driving the orchestrator one stage at a
/// time (used by `worldgen-cli`).
pub enum StageOutcome<T> {
    Completed(T),
    Skipped,
    Failed(crate::error::WorldError),
}

/// Drives a fixed, already-dependency-sorted list of stage names, tracking
/// state and elapsed time per stage. The actual stage bodies are closures
/// supplied by the caller (the core `World` builder), since each stage's
/// output type differs; `Orchestrator` only owns the bookkeeping that is
/// common to all of them (spec §4.9 "records per-stage timings and
/// progress counters").
pub struct Orchestrator {
    order: Vec<&'static str>,
    states: Vec<StageState>,
    elapsed: Vec<Duration>,
    cancelled: bool,
    paused: bool,
}

impl Orchestrator {
    pub fn new(order: Vec<&'static str>) -> Self {
        let n = order.len();
        Self { order, states: vec![StageState::NotStarted; n], elapsed: vec![Duration::ZERO; n], cancelled: false, paused: false }
    }

    pub fn stage_order(&self) -> &[&'static str] {
        &self.order
    }

    pub fn state_of(&self, stage: &str) -> Option<StageState> {
        self.order.iter().position(|&s| s == stage).map(|i| self.states[i])
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run one stage by index, recording its elapsed time and final state.
    /// `body` performs the actual work and reports progress via `on_progress`.
    pub fn run_stage<T>(
        &mut self,
        index: usize,
        tiles_total: usize,
        body: impl FnOnce(&mut dyn FnMut(usize)) -> WorldResult<T>,
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> StageOutcome<T> {
        let name = self.order[index];
        let start = std::time::Instant::now();
        self.states[index] = StageState::Running;
        on_progress(ProgressEvent { stage: name, state: StageState::Running, tiles_done: 0, tiles_total, elapsed: Duration::ZERO });

        let mut report = |done: usize| {
            on_progress(ProgressEvent { stage: name, state: StageState::Running, tiles_done: done, tiles_total, elapsed: start.elapsed() });
        };

        let outcome = body(&mut report);
        self.elapsed[index] = start.elapsed();

        match outcome {
            Ok(value) => {
                self.states[index] = StageState::Completed;
                on_progress(ProgressEvent { stage: name, state: StageState::Completed, tiles_done: tiles_total, tiles_total, elapsed: self.elapsed[index] });
                StageOutcome::Completed(value)
            }
            Err(e) => {
                self.states[index] = StageState::Failed;
                on_progress(ProgressEvent { stage: name, state: StageState::Failed, tiles_done: 0, tiles_total, elapsed: self.elapsed[index] });
                StageOutcome::Failed(e)
            }
        }
    }

    pub fn mark_skipped(&mut self, index: usize) {
        self.states[index] = StageState::Skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_runs_through_completion() {
        let mut orch = Orchestrator::new(vec!["tectonics", "features"]);
        let outcome = orch.run_stage(0, 100, |_report| Ok::<_, crate::error::WorldError>(42), |_| {});
        match outcome {
            StageOutcome::Completed(v) => assert_eq!(v, 42),
            _ => panic!("expected completion"),
        }
        assert_eq!(orch.state_of("tectonics"), Some(StageState::Completed));
    }

    #[test]
    fn failed_stage_reports_failed_state() {
        let mut orch = Orchestrator::new(vec!["tectonics"]);
        let outcome: StageOutcome<()> = orch.run_stage(
            0,
            10,
            |_report| Err(crate::error::WorldError::Cancelled { stage: "tectonics" }),
            |_| {},
        );
        assert!(matches!(outcome, StageOutcome::Failed(_)));
        assert_eq!(orch.state_of("tectonics"), Some(StageState::Failed));
    }
}
