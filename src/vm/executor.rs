//! The instruction interpreter.
//!
//! An [`Executor`] runs one program against a [`RunState`]: the registers,
//! the committed store written by this run, the speculative store seeded
//! from the previous run, and the logs the segmenter consumes afterwards.
//!
//! Every operand-taking instruction without a literal reads memory at the
//! current address and key. That read consults both stores and keeps
//! whichever source event sits closer to the query key, so a prior run's
//! unconfirmed write acts as an oracle until this run confirms (or
//! contradicts) it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ast::{OpCode, Program};
use crate::core::{
    closer, store_from_inputs, Address, Input, Step, Time, TimelineKey, TimelineStore, Value,
};

/// Interpreter registers. All start at zero on every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    /// Index of the next instruction.
    pub step: usize,
    /// Current memory address.
    pub addr: Address,
    /// Accumulator.
    pub val: Value,
    /// Current simulated time.
    pub time: Time,
}

impl Registers {
    /// The key of the instruction about to execute.
    pub fn key(&self) -> TimelineKey {
        TimelineKey::new(self.time, self.step as Step)
    }
}

/// A memory read performed to supply an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadEvent {
    pub address: Address,
    pub value: Value,
    pub key: TimelineKey,
}

impl ReadEvent {
    /// Step of the instruction that performed the read.
    pub fn step(&self) -> usize {
        self.key.step as usize
    }
}

/// An entry of the write log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Write {
    pub address: Address,
    pub key: TimelineKey,
    pub value: Value,
}

/// Registers as they stood just before an instruction executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub address: Address,
    pub value: Value,
    pub step: usize,
}

/// Register snapshots bucketed by the time their instruction ran at.
/// Each bucket is in execution order.
pub type Timeline = BTreeMap<Time, Vec<RegisterSnapshot>>;

/// What the program reported through `out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// A concrete result.
    Value(Value),
    /// The result is whatever `address` holds at `(time, step)`, which
    /// may not be settled until a later run.
    Delayed { address: Address, time: Time, step: Step },
}

impl Outcome {
    /// Resolve against a store. Concrete outcomes resolve to themselves.
    pub fn resolve(&self, store: &TimelineStore) -> Value {
        match *self {
            Outcome::Value(v) => v,
            Outcome::Delayed { address, time, step } => {
                store.get(address, TimelineKey::new(time, step))
            }
        }
    }

    pub fn is_delayed(&self) -> bool {
        matches!(self, Outcome::Delayed { .. })
    }
}

/// Whether the run can make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// An instruction was executed.
    Executed,
    /// Every instruction has run.
    Finished,
}

/// Everything one run owns.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub registers: Registers,
    /// Memory confirmed by this run: inputs plus this run's writes.
    pub committed: TimelineStore,
    /// The previous run's writes, plus this run's.
    pub speculative: TimelineStore,
    pub reads: Vec<ReadEvent>,
    pub writes: Vec<Write>,
    pub timeline: Timeline,
    /// Time each executed step ran at, indexed by step.
    pub times: Vec<Time>,
    pub outcome: Option<Outcome>,
}

impl RunState {
    /// Fresh state for a run.
    ///
    /// Committed memory starts from `inputs`; the speculative store is
    /// seeded with `previous_writes`, each at its own key.
    pub fn new(inputs: &[Input], previous_writes: &[Write]) -> Self {
        let mut speculative = TimelineStore::new();
        for w in previous_writes {
            speculative.set(w.address, w.key, w.value);
        }
        Self {
            committed: store_from_inputs(inputs),
            speculative,
            ..Self::default()
        }
    }
}

/// Runs a program one instruction at a time.
#[derive(Debug, Clone)]
pub struct Executor {
    program: Program,
    state: RunState,
}

impl Executor {
    pub fn new(program: Program, state: RunState) -> Self {
        Self { program, state }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Swap in a new run state, returning the finished one.
    pub fn replace_state(&mut self, state: RunState) -> RunState {
        std::mem::replace(&mut self.state, state)
    }

    pub fn is_finished(&self) -> bool {
        self.state.registers.step >= self.program.len()
    }

    /// Execute the next instruction, if any.
    pub fn advance(&mut self) -> StepStatus {
        let step = self.state.registers.step;
        let Some(instr) = self.program.get(step).copied() else {
            return StepStatus::Finished;
        };

        let regs = self.state.registers;
        self.state.timeline.entry(regs.time).or_default().push(RegisterSnapshot {
            address: regs.addr,
            value: regs.val,
            step,
        });
        self.state.times.push(regs.time);

        trace!(step, opcode = %instr.opcode, literal = ?instr.literal, time = regs.time, "advance");

        match instr.opcode {
            OpCode::Read => self.state.registers.val = self.operand(instr.literal),
            OpCode::Add => {
                let v = self.operand(instr.literal);
                self.state.registers.val = self.state.registers.val.wrapping_add(v);
            }
            OpCode::Sub => {
                let v = self.operand(instr.literal);
                self.state.registers.val = self.state.registers.val.wrapping_sub(v);
            }
            OpCode::Pos => self.state.registers.addr = self.operand(instr.literal),
            // The clock ticks after every instruction, so land one short.
            OpCode::Time => self.state.registers.time = self.operand(instr.literal).wrapping_sub(1),
            OpCode::Write => self.store(),
            OpCode::Out => {
                self.state.outcome = Some(match instr.literal {
                    Some(v) => Outcome::Value(v),
                    None => Outcome::Delayed {
                        address: regs.addr,
                        time: regs.time,
                        step: step as Step,
                    },
                });
            }
        }

        let regs = &mut self.state.registers;
        regs.time = regs.time.wrapping_add(1);
        regs.step += 1;
        StepStatus::Executed
    }

    /// Execute every remaining instruction.
    pub fn solve(&mut self) {
        while self.advance() == StepStatus::Executed {}
    }

    /// The literal if there is one, otherwise a memory read.
    fn operand(&mut self, literal: Option<Value>) -> Value {
        match literal {
            Some(v) => v,
            None => self.load(),
        }
    }

    /// Read the operand at the current address and key from whichever
    /// store holds the closer event, logging the read.
    fn load(&mut self) -> Value {
        let regs = self.state.registers;
        let key = regs.key();
        let committed = self.state.committed.candidate(regs.addr, key);
        let speculative = self.state.speculative.candidate(regs.addr, key);
        let value = closer(committed, speculative).value;

        self.state.reads.push(ReadEvent { address: regs.addr, value, key });
        value
    }

    /// Commit the accumulator at the current address and key.
    fn store(&mut self) {
        let regs = self.state.registers;
        let key = regs.key();
        self.state.committed.set(regs.addr, key, regs.val);
        self.state.speculative.set(regs.addr, key, regs.val);
        self.state.writes.push(Write { address: regs.addr, key, value: regs.val });
    }
}
