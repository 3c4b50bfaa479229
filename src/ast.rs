//! Instruction lists for chronoweave.
//!
//! A program is a flat, ordered list of instructions. Each instruction is
//! an opcode plus an optional literal operand fixed at authoring time;
//! when an operand-taking opcode has no literal, its operand is read from
//! memory at the current address and timeline key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{ChronoError, ChronoResult, Value};

/// The seven operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpCode {
    /// `val := operand`
    Read,

    /// Commit `val` at `addr` and the current key.
    Write,

    /// `val += operand`
    Add,

    /// `val -= operand`
    Sub,

    /// `addr := operand`
    Pos,

    /// Jump the clock: the next instruction runs at time `operand`.
    Time,

    /// Record the program's result: the literal, or a delayed marker when
    /// there is none.
    Out,
}

impl OpCode {
    pub const ALL: [OpCode; 7] = [
        OpCode::Read,
        OpCode::Write,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Pos,
        OpCode::Time,
        OpCode::Out,
    ];

    /// Whether a missing literal is filled by a memory read.
    pub fn takes_operand(self) -> bool {
        matches!(
            self,
            OpCode::Read | OpCode::Add | OpCode::Sub | OpCode::Pos | OpCode::Time
        )
    }

    /// Whether a literal may be supplied at all.
    pub fn accepts_literal(self) -> bool {
        self != OpCode::Write
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Read => "read",
            OpCode::Write => "write",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Pos => "pos",
            OpCode::Time => "time",
            OpCode::Out => "out",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for OpCode {
    type Err = ChronoError;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        let lower = word.to_ascii_lowercase();
        OpCode::ALL
            .into_iter()
            .find(|op| op.mnemonic() == lower)
            .ok_or_else(|| ChronoError::UnknownOpcode { word: word.to_string() })
    }
}

/// One instruction: opcode plus optional literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: OpCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Value>,
}

impl Instruction {
    pub fn new(opcode: OpCode, literal: Option<Value>) -> Self {
        Self { opcode, literal }
    }

    /// An instruction without a literal.
    pub fn bare(opcode: OpCode) -> Self {
        Self { opcode, literal: None }
    }

    /// An instruction with a literal operand.
    pub fn with(opcode: OpCode, literal: Value) -> Self {
        Self { opcode, literal: Some(literal) }
    }

    /// Whether executing this instruction reads memory.
    pub fn reads_memory(&self) -> bool {
        self.literal.is_none() && self.opcode.takes_operand()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal {
            Some(v) => write!(f, "{} {}", self.opcode, v),
            None => write!(f, "{}", self.opcode),
        }
    }
}

/// A validated instruction list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Instruction>", into = "Vec<Instruction>")]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Validate and wrap an instruction list.
    pub fn new(instructions: Vec<Instruction>) -> ChronoResult<Self> {
        for (step, instr) in instructions.iter().enumerate() {
            if instr.literal.is_some() && !instr.opcode.accepts_literal() {
                return Err(ChronoError::UnexpectedLiteral { opcode: instr.opcode, step });
            }
        }
        Ok(Self { instructions })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, step: usize) -> Option<&Instruction> {
        self.instructions.get(step)
    }

    /// Opcode at `step`, if the step exists.
    pub fn opcode(&self, step: usize) -> Option<OpCode> {
        self.instructions.get(step).map(|i| i.opcode)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// True if no instruction can move the clock backwards, which makes
    /// the first run self-consistent.
    pub fn is_trivially_consistent(&self) -> bool {
        self.instructions.iter().all(|i| i.opcode != OpCode::Time)
    }
}

impl TryFrom<Vec<Instruction>> for Program {
    type Error = ChronoError;

    fn try_from(instructions: Vec<Instruction>) -> Result<Self, Self::Error> {
        Program::new(instructions)
    }
}

impl From<Program> for Vec<Instruction> {
    fn from(program: Program) -> Self {
        program.instructions
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", instr)?;
        }
        Ok(())
    }
}
