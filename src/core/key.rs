//! Timeline keys and the "precedes" relation.
//!
//! A key is a `(time, step)` pair. Key A precedes key B iff
//! `A.time < B.time`, or the times are equal and `A.step > B.step`: among
//! events stamped with the same instant, the one produced by a later
//! instruction happened further in the past relative to that instant.
//!
//! `TimelineKey` implements `Ord` so that `a < b` exactly when `a`
//! precedes `b`. Sorted collections of keys are therefore in timeline
//! order, and `partition_point(|k| *k < key)` finds everything that
//! precedes `key`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::address::{Step, Time, Value};

/// A point in simulated time and program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineKey {
    pub time: Time,
    pub step: Step,
}

impl TimelineKey {
    /// Before all real time. Inputs without an explicit key live here.
    pub const ORIGIN: TimelineKey = TimelineKey { time: Time::MIN, step: -1 };

    pub fn new(time: Time, step: Step) -> Self {
        Self { time, step }
    }

    /// A key that precedes every instruction executed at `time` and
    /// follows everything at earlier times.
    ///
    /// Used when the editor inspects or edits memory "at time t" without
    /// naming an instruction.
    pub fn before_steps(time: Time) -> Self {
        Self { time, step: Step::MAX }
    }

    /// True iff `self` happened before `other` on the timeline.
    #[inline]
    pub fn precedes(&self, other: &TimelineKey) -> bool {
        precedes(*self, *other)
    }
}

/// The "happens before" relation over timeline keys.
#[inline]
pub fn precedes(a: TimelineKey, b: TimelineKey) -> bool {
    a.time < b.time || (a.time == b.time && a.step > b.step)
}

impl Ord for TimelineKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| other.step.cmp(&self.step))
    }
}

impl PartialOrd for TimelineKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimelineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(t={}, step={})", self.time, self.step)
    }
}

/// A value together with the key of the event it came from.
///
/// `key` is `None` when the value is a default: an initial input with no
/// explicit key, or the zero of an untouched address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub key: Option<TimelineKey>,
    pub value: Value,
}

impl Candidate {
    pub fn default_value(value: Value) -> Self {
        Self { key: None, value }
    }

    pub fn from_event(key: TimelineKey, value: Value) -> Self {
        Self { key: Some(key), value }
    }
}

/// Pick whichever candidate sits closer to (most immediately precedes) the
/// query key.
///
/// The speculative candidate wins only when it has a source event and that
/// event strictly follows the committed candidate's source. A default
/// counts as the earliest possible source, and equal keys resolve to the
/// committed value.
pub fn closer(committed: Candidate, speculative: Candidate) -> Candidate {
    match (committed.key, speculative.key) {
        (_, None) => committed,
        (None, Some(_)) => speculative,
        (Some(c), Some(s)) if precedes(c, s) => speculative,
        (Some(_), Some(_)) => committed,
    }
}
