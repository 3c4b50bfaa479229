//! Shared test utilities for chronoweave integration tests.
//!
//! This module provides:
//! - Program parsing helpers
//! - Configuration builders
//! - Assertion helpers for convergence results
//! - Canonical test programs
//!
//! ## AAA Pattern
//!
//! All tests follow the Arrange-Act-Assert pattern:
//! - Arrange: Set up test fixtures and configuration
//! - Act: Execute the operation under test
//! - Assert: Verify the expected outcome

#![allow(dead_code)]

use chronoweave::*;

// =============================================================================
// Program Parsing Utilities
// =============================================================================

/// Assemble chronoweave source code into a Program.
///
/// # Panics
/// Panics if parsing fails, which is appropriate for test code.
pub fn program(code: &str) -> Program {
    let tokens = tokenize(code);
    let mut parser = Parser::new(&tokens);
    parser.parse_program().expect("Failed to parse program")
}

/// Parse a program, returning the error message if any.
pub fn try_parse(code: &str) -> Result<Program, String> {
    chronoweave::parse(code).map_err(|e| e.to_string())
}

// =============================================================================
// Configuration Builders
// =============================================================================

/// Default configuration for tests: small run limit, cycle detection on.
pub fn default_config() -> TimeLoopConfig {
    TimeLoopConfig {
        max_runs: 100,
        detect_cycles: true,
    }
}

/// Configuration with a custom run limit.
pub fn config_with_runs(max_runs: usize) -> TimeLoopConfig {
    TimeLoopConfig {
        max_runs,
        ..default_config()
    }
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Assert that a program converges to a consistent state.
pub fn assert_consistent(result: &ConvergenceStatus) {
    assert!(
        matches!(result, ConvergenceStatus::Consistent { .. }),
        "Expected Consistent, got {:?}",
        result
    );
}

/// Assert that a program converges in a specific number of runs.
pub fn assert_consistent_in_runs(result: &ConvergenceStatus, expected_runs: usize) {
    match result {
        ConvergenceStatus::Consistent { runs, .. } => {
            assert_eq!(
                *runs, expected_runs,
                "Expected {} runs, got {}",
                expected_runs, runs
            );
        }
        _ => panic!("Expected Consistent, got {:?}", result),
    }
}

/// Assert that a program oscillates with a specific period.
pub fn assert_oscillation_with_period(result: &ConvergenceStatus, expected_period: usize) {
    match result {
        ConvergenceStatus::Oscillation { period, .. } => {
            assert_eq!(
                *period, expected_period,
                "Expected oscillation period {}, got {}",
                expected_period, period
            );
        }
        _ => panic!("Expected Oscillation, got {:?}", result),
    }
}

/// Assert that a program times out.
pub fn assert_timeout(result: &ConvergenceStatus) {
    assert!(
        matches!(result, ConvergenceStatus::Timeout { .. }),
        "Expected Timeout, got {:?}",
        result
    );
}

/// Extract the resolved outcome from a consistent result.
pub fn extract_outcome(result: &ConvergenceStatus) -> Option<Value> {
    match result {
        ConvergenceStatus::Consistent { outcome, .. } => *outcome,
        _ => panic!("Expected Consistent, got {:?}", result),
    }
}

/// Assert what committed memory holds at `address` just before `key`.
pub fn assert_memory_value(tl: &TimeLoop, address: Address, key: TimelineKey, expected: Value) {
    let actual = tl.committed().get(address, key);
    assert_eq!(
        actual, expected,
        "Memory[{}] at {} = {}, expected {}",
        address, key, actual, expected
    );
}

/// Flatten traces to `(time, address, value, step)` tuples per step.
pub fn pointer_tuples(traces: &[StepTrace]) -> Vec<Vec<(Time, Address, Value, usize)>> {
    traces
        .iter()
        .map(|t| {
            t.pointers
                .iter()
                .map(|p| (p.time, p.address, p.value, p.step))
                .collect()
        })
        .collect()
}

// =============================================================================
// Program Execution Helpers
// =============================================================================

/// Drive a program to a status with default configuration.
pub fn run(code: &str) -> ConvergenceStatus {
    converge(code, Vec::new()).1
}

/// Drive a program with a specific configuration.
pub fn run_with_config(code: &str, config: TimeLoopConfig) -> ConvergenceStatus {
    TimeLoop::new(program(code), Vec::new())
        .with_config(config)
        .run_until_consistent()
}

/// Drive a program with inputs, keeping the loop for inspection.
pub fn converge(code: &str, inputs: Vec<Input>) -> (TimeLoop, ConvergenceStatus) {
    let mut tl = TimeLoop::new(program(code), inputs).with_config(default_config());
    let status = tl.run_until_consistent();
    (tl, status)
}

/// Run the first run by hand and segment it.
pub fn first_run(code: &str) -> (TimeLoop, Vec<StepTrace>) {
    let mut tl = TimeLoop::new(program(code), Vec::new());
    tl.solve();
    let traces = tl.get_visible_pointers();
    (tl, traces)
}

/// Set up, solve and segment the next run.
pub fn next_run(tl: &mut TimeLoop) -> Vec<StepTrace> {
    tl.set_up();
    tl.solve();
    tl.get_visible_pointers()
}

// =============================================================================
// Test Programs
// =============================================================================

/// Collection of canonical test programs for various scenarios.
pub mod programs {
    /// Straight-line program that always converges in one run.
    pub const TRIVIAL: &str = "read 10 add 20 out";

    /// Store a literal at address 5.
    pub const STORE_LITERAL: &str = "pos 5 read 7 write";

    /// Write back what was read, into the past.
    pub const SELF_FULFILLING: &str = "read time -5 write";

    /// Write the negation of what was read, into the past (period-2 oscillation).
    pub const GRANDFATHER_PARADOX: &str = "read 1 sub time -5 write";

    /// Write one more than what was read, at an earlier key (never settles).
    pub const DIVERGENCE: &str = "read add 1 time 0 write";

    /// Backward write whose target is read first: settles on run 2.
    pub const BACKWARD_WRITE: &str = "read time -3 read 7 write";

    /// Backward write read later in both time and program order.
    pub const LATE_READ: &str = "read 2 time -1 pos 0 write time 5 pos 0 read";

    /// Read placed later in time but earlier in program order.
    pub const EARLY_READ: &str = "time 3 read time -1 read 2 write";

    /// Two-stage dependency: settles on run 3.
    pub const CHAIN: &str =
        "time 30 pos 1 read time 10 pos 0 read add 1 pos 1 write time -5 pos 0 read 7 write";

    /// Result taken from memory that is written afterwards, in the past.
    pub const DELAYED_OUT: &str = "pos 4 out time -2 read 11 write";

    /// Two writes landing at the same instant.
    pub const SHARED_INSTANT: &str = "read 5 write time 0 read 9 write";
}
