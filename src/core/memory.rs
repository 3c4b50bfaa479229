//! Editor-facing program memory and initial inputs.
//!
//! `ProgramMemory` is the confirmed memory the editing front end inspects
//! and edits by hand between runs. It is a thin view over a
//! [`TimelineStore`]: edits without a time become initial inputs, edits
//! with a time become timeline events.

use serde::{Deserialize, Serialize};

use super::address::{Address, Step, Time, Value};
use super::key::TimelineKey;
use super::timeline::TimelineStore;

/// An initial memory value supplied before a run.
///
/// Without a key the value is what the address reads before any write
/// ("before all real time"). With a key it is seeded as an ordinary
/// timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub address: Address,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<TimelineKey>,
}

impl Input {
    pub fn new(address: Address, value: Value) -> Self {
        Self { address, value, key: None }
    }

    /// An input pinned to an explicit point on the timeline.
    pub fn at(address: Address, value: Value, key: TimelineKey) -> Self {
        Self { address, value, key: Some(key) }
    }
}

/// Build a store from a set of inputs.
pub fn store_from_inputs(inputs: &[Input]) -> TimelineStore {
    let mut store = TimelineStore::new();
    for input in inputs {
        match input.key {
            Some(key) => store.set(input.address, key, input.value),
            None => store.set_initial(input.address, input.value),
        }
    }
    store
}

/// Confirmed memory as seen by the editor.
#[derive(Debug, Clone, Default)]
pub struct ProgramMemory {
    store: TimelineStore,
}

impl ProgramMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `address` at `time`.
    ///
    /// Without a step the query sits before every instruction executed at
    /// `time`, so only writes at earlier times are visible.
    pub fn get(&self, address: Address, time: Time, step: Option<Step>) -> Value {
        let key = match step {
            Some(step) => TimelineKey::new(time, step),
            None => TimelineKey::before_steps(time),
        };
        self.store.get(address, key)
    }

    /// Write `value` into `address`.
    ///
    /// Without a time the value becomes the address's initial input.
    pub fn set(&mut self, address: Address, value: Value, time: Option<Time>, step: Option<Step>) {
        match time {
            None => self.store.set_initial(address, value),
            Some(time) => {
                let key = match step {
                    Some(step) => TimelineKey::new(time, step),
                    None => TimelineKey::before_steps(time),
                };
                self.store.set(address, key, value);
            }
        }
    }

    /// Drop all timeline events, keeping initial inputs.
    pub fn reset(&mut self) {
        self.store.clear_events();
    }

    /// Drop timeline events and initial inputs.
    pub fn reset_total(&mut self) {
        self.store.clear();
    }

    /// The initial inputs, in address order, for starting a run.
    pub fn inputs(&self) -> Vec<Input> {
        self.store
            .initials()
            .map(|(address, value)| Input::new(address, value))
            .collect()
    }

    pub fn store(&self) -> &TimelineStore {
        &self.store
    }
}
