//! Temporal layer: convergence search and run segmentation.
//!
//! # Key Components
//!
//! - **TimeLoop**: drives runs, carrying each run's writes into the next
//! - **Segmenter**: checks a run for divergent reads and splits it into
//!   confirmed and speculative phases

pub mod timeloop;
pub mod segmenter;

pub use timeloop::{format_status, ConvergenceStatus, TimeLoop, TimeLoopConfig};
pub use segmenter::{find_splits, Pointer, Segmenter, StepTrace};
