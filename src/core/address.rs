//! Scalar types shared by every layer of the engine.
//!
//! These are separated out so the key, store and error modules can all
//! depend on them without depending on each other.

/// Memory address. Addresses are unbounded in the model; `i64` is the
/// practical range.
pub type Address = i64;

/// A cell value. Arithmetic on values wraps on overflow.
pub type Value = i64;

/// Simulated clock value at which an event happens.
pub type Time = i64;

/// Position of an instruction in the program.
///
/// Signed so that the reserved keys (`-1` for pre-program inputs,
/// `Step::MAX` for editor inspection) fit in the same type.
pub type Step = i64;
