//! Integration tests for temporal semantics.
//!
//! Component: Temporal Semantics
//!
//! These tests verify the core temporal mechanics of chronoweave:
//! - The "precedes" order over timeline keys
//! - Editor memory and its hand-off to the driver
//! - Divergence detection against committed memory
//! - Segmentation into confirmed and speculative phases
//! - Trace serialization for the presentation layer

#![cfg(test)]

use crate::common::*;

use chronoweave::*;

fn key(time: Time, step: Step) -> TimelineKey {
    TimelineKey::new(time, step)
}

// =============================================================================
// Ordering Tests
// =============================================================================

mod ordering {
    use super::*;

    #[test]
    fn earlier_time_precedes() {
        assert!(precedes(key(1, 5), key(2, 0)));
        assert!(!precedes(key(2, 0), key(1, 5)));
    }

    #[test]
    fn later_step_precedes_at_same_time() {
        assert!(precedes(key(3, 4), key(3, 1)));
        assert!(!precedes(key(3, 1), key(3, 4)));
    }

    #[test]
    fn no_key_precedes_itself() {
        assert!(!precedes(key(0, 0), key(0, 0)));
    }

    #[test]
    fn origin_precedes_real_time() {
        assert!(TimelineKey::ORIGIN.precedes(&key(-1_000_000, 0)));
        assert!(TimelineKey::ORIGIN < key(0, i64::MAX));
    }

    #[test]
    fn sorting_yields_timeline_order() {
        // Arrange
        let mut keys = vec![key(2, 0), key(0, 0), key(0, 3), key(-1, 9), key(2, 2)];

        // Act
        keys.sort();

        // Assert
        assert_eq!(keys, vec![key(-1, 9), key(0, 3), key(0, 0), key(2, 2), key(2, 0)]);
    }
}

// =============================================================================
// Program Memory Tests
// =============================================================================

mod program_memory {
    use super::*;

    #[test]
    fn timed_edit_visible_only_afterwards() {
        // Arrange
        let mut memory = ProgramMemory::new();

        // Act
        memory.set(2, 8, Some(4), Some(1));

        // Assert
        assert_eq!(memory.get(2, 4, Some(1)), 0);
        assert_eq!(memory.get(2, 4, Some(0)), 8);
        assert_eq!(memory.get(2, 5, None), 8);
        assert!(memory.inputs().is_empty());
    }

    #[test]
    fn untimed_edits_become_inputs() {
        // Arrange
        let mut memory = ProgramMemory::new();
        memory.set(0, 5, None, None);
        memory.set(3, -2, None, None);

        // Act
        let mut tl = TimeLoop::from_memory(program("pos 3 read pos 0 add out"), &memory);
        tl.solve();

        // Assert
        assert_eq!(tl.registers().val, 3);
    }

    #[test]
    fn reset_total_forgets_inputs() {
        // Arrange
        let mut memory = ProgramMemory::new();
        memory.set(0, 5, None, None);
        memory.set(0, 6, Some(0), None);

        // Act
        memory.reset();
        let after_reset = memory.get(0, 10, None);
        memory.reset_total();

        // Assert
        assert_eq!(after_reset, 5);
        assert_eq!(memory.get(0, 10, None), 0);
    }
}

// =============================================================================
// Divergence Tests
// =============================================================================

mod divergence {
    use super::*;

    fn reads() -> Vec<ReadEvent> {
        vec![
            ReadEvent { address: 0, value: 0, key: key(0, 0) },
            ReadEvent { address: 1, value: 2, key: key(3, 3) },
        ]
    }

    #[test]
    fn matching_reads_have_no_split() {
        // Arrange
        let mut memory = TimelineStore::new();
        memory.set(1, key(2, 2), 2);

        // Act
        let splits = find_splits(&reads(), &memory);

        // Assert
        assert!(splits.is_empty());
    }

    #[test]
    fn mismatched_read_is_the_split() {
        // Arrange
        let mut memory = TimelineStore::new();
        memory.set(1, key(2, 2), 5);

        // Act
        let splits = find_splits(&reads(), &memory);

        // Assert
        assert_eq!(splits, vec![3]);
    }

    #[test]
    fn every_divergent_step_is_reported() {
        // Arrange
        let mut tl = TimeLoop::new(program(programs::CHAIN), Vec::new());

        // Act
        tl.solve();

        // Assert
        assert_eq!(tl.divergences(), vec![2, 5]);
    }
}

// =============================================================================
// Segmentation Tests
// =============================================================================

mod segmentation {
    use super::*;

    #[test]
    fn consistent_run_is_one_confirmed_phase() {
        // Arrange / Act
        let (tl, traces) = first_run(programs::SHARED_INSTANT);

        // Assert
        assert!(tl.done());
        assert!(traces.iter().all(StepTrace::is_confirmed));
        assert_eq!(
            pointer_tuples(&traces),
            vec![
                vec![(0, 0, 0, 0)],
                vec![(1, 0, 9, 4), (1, 0, 5, 1)],
                vec![(2, 0, 5, 2)],
                vec![(0, 0, 5, 3)],
                vec![(1, 0, 9, 4), (1, 0, 5, 1)],
            ]
        );
    }

    #[test]
    fn same_instant_writes_are_echoes() {
        // Arrange / Act
        let (_, traces) = first_run(programs::SHARED_INSTANT);

        // Assert
        let echoes: Vec<bool> = traces[1].pointers.iter().map(|p| p.is_echo(1)).collect();
        assert_eq!(echoes, vec![true, false]);
    }

    #[test]
    fn phases_advance_past_each_split() {
        // Arrange / Act
        let (tl, traces) = first_run(programs::CHAIN);

        // Assert
        assert!(!tl.done());
        let phases: Vec<usize> = traces.iter().map(|t| t.phase).collect();
        assert_eq!(phases, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn previous_run_shows_beyond_the_split() {
        // Arrange
        let (mut tl, _) = first_run(programs::DIVERGENCE);

        // Act
        let traces = next_run(&mut tl);

        // Assert
        assert!(!tl.done());
        assert_eq!(
            pointer_tuples(&traces)[0],
            vec![(0, 0, 1, 3), (0, 0, 0, 0)]
        );
        assert_eq!(pointer_tuples(&traces)[3], vec![(0, 0, 2, 3)]);
    }

    #[test]
    fn negative_time_writes_prepare_step_zero() {
        // Arrange
        let (mut tl, first) = first_run(programs::BACKWARD_WRITE);

        // Act
        let second = next_run(&mut tl);

        // Assert: run 1 diverged at step 0, so its write was not shown up front
        assert_eq!(pointer_tuples(&first)[0], vec![(0, 0, 0, 0)]);
        assert!(tl.done());
        assert_eq!(pointer_tuples(&second)[0], vec![(-2, 0, 7, 3), (0, 0, 0, 0)]);
    }

    #[test]
    fn traces_serialize_as_json() {
        // Arrange
        let (_, traces) = first_run(programs::STORE_LITERAL);

        // Act
        let json = serde_json::to_value(&traces[2]).expect("serialize");

        // Assert
        assert_eq!(
            json,
            serde_json::json!({
                "step": 2,
                "phase": 0,
                "pointers": [{ "time": 2, "address": 5, "value": 7, "step": 2 }]
            })
        );
    }
}
