//! Address-indexed, time-ordered store of write events.
//!
//! Each address owns a vector of events kept sorted by the "precedes"
//! order. A query at key `k` answers with the latest event strictly
//! preceding `k`; when none does, the store falls back to the address's
//! initial value and finally to zero.
//!
//! The same type serves every role in the engine: the committed memory of
//! a run, the speculative memory seeded from the previous run, and the
//! editor-facing program memory.

use std::collections::BTreeMap;

use super::address::{Address, Value};
use super::key::{Candidate, TimelineKey};

/// One stored write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteEvent {
    pub key: TimelineKey,
    pub value: Value,
}

/// Timeline-ordered memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineStore {
    cells: BTreeMap<Address, Vec<WriteEvent>>,
    initial: BTreeMap<Address, Value>,
}

impl TimelineStore {
    /// Create an empty store (every address reads zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose addresses fall back to the given initial values.
    pub fn with_initial(initial: impl IntoIterator<Item = (Address, Value)>) -> Self {
        Self {
            cells: BTreeMap::new(),
            initial: initial.into_iter().collect(),
        }
    }

    /// Value visible at `key`: the latest event preceding it, else the
    /// default for `address`.
    pub fn get(&self, address: Address, key: TimelineKey) -> Value {
        self.candidate(address, key).value
    }

    /// Like [`get`](Self::get), but also reports which event the value
    /// came from.
    pub fn candidate(&self, address: Address, key: TimelineKey) -> Candidate {
        match self.latest_before(address, key) {
            Some(event) => Candidate::from_event(event.key, event.value),
            None => Candidate::default_value(self.default_for(address)),
        }
    }

    /// The latest event at `address` that precedes `key`.
    pub fn latest_before(&self, address: Address, key: TimelineKey) -> Option<&WriteEvent> {
        let events = self.cells.get(&address)?;
        let idx = events.partition_point(|e| e.key < key);
        idx.checked_sub(1).map(|i| &events[i])
    }

    /// Insert a write, keeping timeline order. A write at an existing key
    /// replaces that event's value.
    pub fn set(&mut self, address: Address, key: TimelineKey, value: Value) {
        let events = self.cells.entry(address).or_default();
        let idx = events.partition_point(|e| e.key < key);
        match events.get_mut(idx) {
            Some(existing) if existing.key == key => existing.value = value,
            _ => events.insert(idx, WriteEvent { key, value }),
        }
    }

    /// Set the value an address reads before any event.
    pub fn set_initial(&mut self, address: Address, value: Value) {
        self.initial.insert(address, value);
    }

    pub fn initial(&self, address: Address) -> Option<Value> {
        self.initial.get(&address).copied()
    }

    /// All initial values in address order.
    pub fn initials(&self) -> impl Iterator<Item = (Address, Value)> + '_ {
        self.initial.iter().map(|(a, v)| (*a, *v))
    }

    fn default_for(&self, address: Address) -> Value {
        self.initial(address).unwrap_or(0)
    }

    /// Events stored at `address`, in timeline order.
    pub fn events(&self, address: Address) -> &[WriteEvent] {
        self.cells.get(&address).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every event, by address then timeline order.
    pub fn iter(&self) -> impl Iterator<Item = (Address, &WriteEvent)> {
        self.cells
            .iter()
            .flat_map(|(addr, events)| events.iter().map(move |e| (*addr, e)))
    }

    /// Addresses holding at least one event.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.cells
            .iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(addr, _)| *addr)
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    /// Drop every event but keep initial values.
    pub fn clear_events(&mut self) {
        self.cells.clear();
    }

    /// Drop events and initial values.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.initial.clear();
    }
}
