//! Consistency checking and phase segmentation of a completed run.
//!
//! After a run, every read is re-queried against the memory the run
//! committed. A step whose read disagrees is a divergence point; the
//! earliest one is the split. Operations before the split are trustworthy
//! ("confirmed", phase 0), everything after it is still speculative.
//!
//! Segmentation turns the run's register timeline into one pointer list
//! per step: the step's own registers plus every write landing at the same
//! instant, drawn from the current run up to the active boundary and from
//! the previous run beyond it. Writes at negative times are
//! "preparations": edits to the starting state that are shown before
//! step 0.

use serde::{Deserialize, Serialize};

use crate::ast::{OpCode, Program};
use crate::core::{Address, Step, Time, TimelineKey, TimelineStore, Value};
use crate::vm::{ReadEvent, RegisterSnapshot, Timeline};

/// One memory pointer to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    pub time: Time,
    pub address: Address,
    pub value: Value,
    pub step: usize,
}

impl Pointer {
    fn from_snapshot(time: Time, snapshot: &RegisterSnapshot) -> Self {
        Self {
            time,
            address: snapshot.address,
            value: snapshot.value,
            step: snapshot.step,
        }
    }

    pub fn key(&self) -> TimelineKey {
        TimelineKey::new(self.time, self.step as Step)
    }

    /// True if this pointer was produced by an instruction other than the
    /// one being replayed at `step`.
    pub fn is_echo(&self, step: usize) -> bool {
        self.step != step
    }
}

/// The pointers to animate for one instruction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTrace {
    pub step: usize,
    /// 0 before the first split, then one more per split crossed.
    pub phase: usize,
    /// In timeline order.
    pub pointers: Vec<Pointer>,
}

impl StepTrace {
    pub fn is_confirmed(&self) -> bool {
        self.phase == 0
    }
}

/// Steps whose recorded read disagrees with `committed`, in read order.
pub fn find_splits(reads: &[ReadEvent], committed: &TimelineStore) -> Vec<usize> {
    let mut splits: Vec<usize> = reads
        .iter()
        .filter(|r| committed.get(r.address, r.key) != r.value)
        .map(ReadEvent::step)
        .collect();
    splits.dedup();
    splits
}

/// Builds per-step pointer traces from a run and its predecessor.
pub struct Segmenter<'a> {
    program: &'a Program,
    current: &'a Timeline,
    previous: &'a Timeline,
    times: &'a [Time],
}

impl<'a> Segmenter<'a> {
    pub fn new(
        program: &'a Program,
        current: &'a Timeline,
        previous: &'a Timeline,
        times: &'a [Time],
    ) -> Self {
        Self { program, current, previous, times }
    }

    fn is_write(&self, step: usize) -> bool {
        self.program.opcode(step) == Some(OpCode::Write)
    }

    /// Entries worth showing while replaying `step`.
    fn shown(&self, entry: &RegisterSnapshot, step: usize) -> bool {
        entry.step == step || self.is_write(entry.step)
    }

    /// Negative-time writes to fold into the starting state, in timeline
    /// order. `boundary` is the first split.
    pub fn preparations(&self, boundary: usize) -> Vec<Pointer> {
        let mut preparations = Vec::new();

        for (&time, bucket) in self.current.range::<Time, _>(..0) {
            preparations.extend(
                bucket
                    .iter()
                    .take_while(|e| e.step <= boundary)
                    .filter(|e| self.is_write(e.step))
                    .map(|e| Pointer::from_snapshot(time, e)),
            );
        }
        for (&time, bucket) in self.previous.range::<Time, _>(..0) {
            preparations.extend(
                bucket
                    .iter()
                    .rev()
                    .take_while(|e| e.step > boundary)
                    .filter(|e| self.is_write(e.step))
                    .map(|e| Pointer::from_snapshot(time, e)),
            );
        }

        preparations.sort_by_key(Pointer::key);
        preparations
    }

    /// Split the run into per-step traces.
    ///
    /// `splits` must be ascending, as returned by [`find_splits`].
    pub fn segment(&self, splits: &[usize]) -> Vec<StepTrace> {
        let mut bounds = splits.to_vec();
        bounds.push(self.program.len());

        let mut preparations = Some(self.preparations(bounds[0]));
        let mut phase = 0;
        let mut traces = Vec::with_capacity(self.times.len());

        for (step, &time) in self.times.iter().enumerate() {
            if step > bounds[phase] && phase + 1 < bounds.len() {
                phase += 1;
            }
            let bound = bounds[phase];

            let current = self.current.get(&time).map(Vec::as_slice).unwrap_or(&[]);
            let previous = self.previous.get(&time).map(Vec::as_slice).unwrap_or(&[]);

            // A clock jump only shows what happens at its own instant from
            // itself onward.
            let skip = if self.program.opcode(step) == Some(OpCode::Time) {
                current.iter().take_while(|e| e.step < step).count()
            } else {
                0
            };

            let mut pointers: Vec<Pointer> = previous
                .iter()
                .rev()
                .take_while(|e| e.step > bound)
                .filter(|e| self.shown(e, step))
                .map(|e| Pointer::from_snapshot(time, e))
                .collect();

            let mut own: Vec<Pointer> = current
                .iter()
                .skip(skip)
                .take_while(|e| e.step <= bound)
                .filter(|e| self.shown(e, step))
                .map(|e| Pointer::from_snapshot(time, e))
                .collect();
            own.reverse();
            pointers.extend(own);

            if let Some(mut prepared) = preparations.take() {
                prepared.extend(pointers);
                pointers = prepared;
            }

            traces.push(StepTrace { step, phase, pointers });
        }

        traces
    }
}
