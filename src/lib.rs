// ═══════════════════════════════════════════════════════════════════════════
// Layer 0: Core (No internal dependencies)
// ═══════════════════════════════════════════════════════════════════════════
pub mod core;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 1: Programs (depends on core)
// ═══════════════════════════════════════════════════════════════════════════
pub mod ast;
pub mod parser;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 2: VM (depends on core, programs)
// ═══════════════════════════════════════════════════════════════════════════
pub mod vm;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 3: Temporal (depends on vm)
// ═══════════════════════════════════════════════════════════════════════════
pub mod temporal;

pub use temporal::timeloop;

pub use core::{
    closer, precedes, Address, Candidate, ChronoError, ChronoResult, Input, ProgramMemory, Step,
    Time, TimelineKey, TimelineStore, Value, WriteEvent,
};
pub use ast::{Instruction, OpCode, Program};
pub use parser::{parse, tokenize, Parser};
pub use vm::{Executor, Outcome, ReadEvent, RegisterSnapshot, Registers, RunState, StepStatus, Timeline, Write};
pub use temporal::{
    find_splits, format_status, ConvergenceStatus, Pointer, Segmenter, StepTrace, TimeLoop,
    TimeLoopConfig,
};
