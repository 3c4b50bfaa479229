//! Virtual machine for chronoweave runs.
//!
//! The VM executes a single run: given the inputs and the previous run's
//! writes, it executes every instruction once and leaves behind the
//! committed memory, the read and write logs, and a register timeline.
//!
//! The convergence search (in `temporal::timeloop`) repeatedly runs the VM
//! until every read agrees with the memory the run committed.

pub mod executor;

pub use executor::{
    Executor, Outcome, ReadEvent, RegisterSnapshot, Registers, RunState, StepStatus, Timeline,
    Write,
};
