//! The convergence driver.
//!
//! A [`TimeLoop`] owns the interpreter and the inputs, and carries each
//! run's writes into the next run's speculative store. The caller drives
//! it (`set_up`, `solve`, `get_visible_pointers`) and decides when to stop;
//! [`TimeLoop::run_until_consistent`] is the bounded loop most callers want.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use tracing::{debug, info, instrument};

use crate::ast::Program;
use crate::core::{Input, ProgramMemory, TimelineStore, Value};
use crate::temporal::segmenter::{find_splits, Segmenter, StepTrace};
use crate::vm::{Executor, Outcome, ReadEvent, Registers, RunState, StepStatus, Timeline, Write};

/// Result of a bounded convergence search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Every read of the last run matched committed memory.
    Consistent {
        /// Runs executed so far, the consistent one included.
        runs: usize,
        /// The program's result, delayed outcomes resolved.
        outcome: Option<Value>,
    },

    /// A run reproduced an earlier run's writes, so the runs cycle without
    /// ever agreeing with themselves.
    Oscillation {
        /// Runs between the repeated write logs.
        period: usize,
        /// First divergent step of the last run.
        split: Option<usize>,
    },

    /// Run limit reached without convergence.
    Timeout {
        max_runs: usize,
        split: Option<usize>,
    },
}

impl ConvergenceStatus {
    pub fn is_consistent(&self) -> bool {
        matches!(self, ConvergenceStatus::Consistent { .. })
    }
}

/// Configuration for [`TimeLoop::run_until_consistent`].
#[derive(Debug, Clone)]
pub struct TimeLoopConfig {
    /// Maximum runs before timeout.
    pub max_runs: usize,
    /// Stop early when a write log repeats.
    pub detect_cycles: bool,
}

impl Default for TimeLoopConfig {
    fn default() -> Self {
        Self {
            max_runs: 10_000,
            detect_cycles: true,
        }
    }
}

/// The temporal loop driver.
#[derive(Debug, Clone)]
pub struct TimeLoop {
    config: TimeLoopConfig,
    executor: Executor,
    inputs: Vec<Input>,
    /// Register timeline of the run before the current one.
    previous_timeline: Timeline,
    done: bool,
    runs: usize,
}

impl TimeLoop {
    /// Prepare the first run. Its speculative store is empty.
    pub fn new(program: Program, inputs: Vec<Input>) -> Self {
        let state = RunState::new(&inputs, &[]);
        Self {
            config: TimeLoopConfig::default(),
            executor: Executor::new(program, state),
            inputs,
            previous_timeline: Timeline::new(),
            done: false,
            runs: 1,
        }
    }

    /// Take the inputs from editor memory.
    pub fn from_memory(program: Program, memory: &ProgramMemory) -> Self {
        Self::new(program, memory.inputs())
    }

    pub fn with_config(mut self, config: TimeLoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the next run.
    ///
    /// Committed memory is rebuilt from the inputs; only the finished run's
    /// writes carry over, as speculation.
    pub fn set_up(&mut self) {
        let state = RunState::new(&self.inputs, &self.executor.state().writes);
        let finished = self.executor.replace_state(state);
        self.previous_timeline = finished.timeline;
        self.done = false;
        self.runs += 1;
        debug!(run = self.runs, carried = finished.writes.len(), "set up run");
    }

    /// Execute the next instruction of the current run.
    pub fn advance(&mut self) -> StepStatus {
        self.executor.advance()
    }

    /// Finish the current run.
    #[instrument(skip(self), fields(run = self.runs))]
    pub fn solve(&mut self) {
        self.executor.solve();
        let state = self.executor.state();
        debug!(reads = state.reads.len(), writes = state.writes.len(), "run finished");
    }

    /// Steps whose reads disagree with committed memory, in step order.
    /// Does not touch [`done`](Self::done).
    pub fn divergences(&self) -> Vec<usize> {
        let state = self.executor.state();
        find_splits(&state.reads, &state.committed)
    }

    /// Check the current run and segment it into per-step traces.
    /// Sets [`done`](Self::done) when no read diverged.
    pub fn get_visible_pointers(&mut self) -> Vec<StepTrace> {
        let state = self.executor.state();
        let splits = find_splits(&state.reads, &state.committed);
        self.done = splits.is_empty();
        if let Some(&split) = splits.first() {
            debug!(run = self.runs, split, divergences = splits.len(), "run diverged");
        }

        Segmenter::new(
            self.executor.program(),
            &state.timeline,
            &self.previous_timeline,
            &state.times,
        )
        .segment(&splits)
    }

    /// Run `set_up -> solve -> check` until a run is consistent, the runs
    /// start cycling, or `max_runs` is reached.
    ///
    /// A run that has not executed anything yet is used as is; otherwise a
    /// new run is set up first.
    #[instrument(skip(self), fields(max_runs = self.config.max_runs))]
    pub fn run_until_consistent(&mut self) -> ConvergenceStatus {
        let mut seen_writes: HashMap<u64, usize> = HashMap::new();
        let mut split = None;

        for attempt in 0..self.config.max_runs {
            if attempt > 0 || !self.executor.state().times.is_empty() {
                self.set_up();
            }
            self.solve();

            let splits = self.divergences();
            self.done = splits.is_empty();
            split = splits.first().copied();

            if self.done {
                let outcome = self.resolved_outcome();
                info!(runs = self.runs, ?outcome, "consistent");
                return ConvergenceStatus::Consistent { runs: self.runs, outcome };
            }

            if self.config.detect_cycles {
                let hash = write_log_hash(self.writes());
                if let Some(&earlier) = seen_writes.get(&hash) {
                    let period = self.runs - earlier;
                    info!(runs = self.runs, period, ?split, "oscillation");
                    return ConvergenceStatus::Oscillation { period, split };
                }
                seen_writes.insert(hash, self.runs);
            }
        }

        info!(max_runs = self.config.max_runs, ?split, "timeout");
        ConvergenceStatus::Timeout { max_runs: self.config.max_runs, split }
    }

    /// Whether the last check found no divergence.
    pub fn done(&self) -> bool {
        self.done
    }

    /// Runs started so far, counting the first.
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn reads(&self) -> &[ReadEvent] {
        &self.executor.state().reads
    }

    pub fn writes(&self) -> &[Write] {
        &self.executor.state().writes
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.executor.state().outcome
    }

    /// The outcome with a delayed marker resolved against committed memory.
    pub fn resolved_outcome(&self) -> Option<Value> {
        self.outcome().map(|o| o.resolve(self.committed()))
    }

    pub fn committed(&self) -> &TimelineStore {
        &self.executor.state().committed
    }

    pub fn speculative(&self) -> &TimelineStore {
        &self.executor.state().speculative
    }

    pub fn registers(&self) -> Registers {
        self.executor.state().registers
    }

    pub fn is_finished(&self) -> bool {
        self.executor.is_finished()
    }

    pub fn program(&self) -> &Program {
        self.executor.program()
    }

    pub fn config(&self) -> &TimeLoopConfig {
        &self.config
    }
}

fn write_log_hash(writes: &[Write]) -> u64 {
    let mut hasher = DefaultHasher::new();
    writes.hash(&mut hasher);
    hasher.finish()
}

/// Format a convergence status for display.
pub fn format_status(status: &ConvergenceStatus) -> String {
    match status {
        ConvergenceStatus::Consistent { runs, outcome } => {
            let mut s = format!("CONSISTENT after {} run(s)\n", runs);
            if let Some(v) = outcome {
                s.push_str(&format!("Outcome: {}\n", v));
            }
            s
        }

        ConvergenceStatus::Oscillation { period, split } => {
            let mut s = format!("OSCILLATION detected (period {})\n", period);
            if let Some(step) = split {
                s.push_str(&format!("First divergence at step {}\n", step));
            }
            s
        }

        ConvergenceStatus::Timeout { max_runs, split } => {
            let mut s = format!("TIMEOUT after {} runs\n", max_runs);
            if let Some(step) = split {
                s.push_str(&format!("First divergence at step {}\n", step));
            }
            s
        }
    }
}
