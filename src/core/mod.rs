//! Core types for the chronoweave engine.
//!
//! This module defines the data every other layer builds on:
//!
//! - **Address / Value / Time / Step**: scalar aliases
//! - **TimelineKey**: `(time, step)` and the "precedes" order
//! - **TimelineStore**: time-ordered memory
//! - **ProgramMemory**: the editor's view of confirmed memory
//! - **Error**: construction-time error hierarchy
//!
//! # Layer 0 - No Engine Dependencies
//!
//! Apart from the opcode named in error messages, nothing here depends on
//! the interpreter or driver.

pub mod address;
pub mod key;
pub mod timeline;
pub mod memory;
pub mod error;

pub use address::{Address, Step, Time, Value};
pub use key::{closer, precedes, Candidate, TimelineKey};
pub use timeline::{TimelineStore, WriteEvent};
pub use memory::{store_from_inputs, Input, ProgramMemory};
pub use error::{ChronoError, ChronoResult};
