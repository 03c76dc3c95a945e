//! The history log and cursor.

use crate::error::{HistoryError, Result};
use crate::snapshot::Snapshot;
use crate::target::{Operation, Target};
use crate::types::SnapshotEncoding;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace, warn};

/// History configuration.
#[derive(Clone, Debug, Default)]
pub struct HistoryConfig {
    /// Maximum number of slots retained. `None` keeps everything; when the
    /// cap is hit the oldest slot is evicted. `Some(0)` behaves as `Some(1)`.
    pub max_depth: Option<usize>,

    /// Encoding used for captured snapshots.
    pub encoding: SnapshotEncoding,
}

/// One executed operation and the target state it was applied to.
struct Slot<K> {
    operation: Operation<K>,
    snapshot: Snapshot,
}

/// Read-only view of a log slot.
#[derive(Debug)]
pub struct Entry<'a, K> {
    /// Index of the slot in the log.
    pub index: usize,
    pub operation: &'a Operation<K>,
    /// State of the target immediately before `operation` ran.
    pub snapshot: &'a Snapshot,
    /// False for slots in the redo tail.
    pub active: bool,
}

/// Undo/redo engine over targets whose mutations are of kind `K`.
///
/// The engine owns the log; targets are borrowed per call. Every failing
/// call leaves the log and cursor exactly as they were.
pub struct History<K> {
    config: HistoryConfig,

    /// Slots `[0, position)` are active, `[position, len)` are the redo tail.
    slots: VecDeque<Slot<K>>,

    position: usize,
}

impl<K: Clone + fmt::Debug> History<K> {
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            slots: VecDeque::new(),
            position: 0,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // --- Commands ---

    /// Run `operation` against `target` and record it.
    ///
    /// Any redo tail is discarded once the operation has succeeded. If the
    /// target rejects the operation it is rolled back to its prior state and
    /// nothing is recorded.
    pub fn execute<T>(&mut self, target: &mut T, operation: impl Into<Operation<K>>) -> Result<()>
    where
        T: Target<Kind = K>,
    {
        let operation = operation.into();

        if !target.supports(operation.kind()) {
            warn!(operation = ?operation.kind(), "target does not support operation");
            return Err(HistoryError::InvalidOperation(format!(
                "{:?} is not supported by this target",
                operation.kind()
            )));
        }

        let snapshot = target.capture(self.config.encoding)?;
        trace!(hash = %snapshot.hash().short(), bytes = snapshot.len(), "captured snapshot");

        if let Err(e) = target.apply(operation.kind()) {
            warn!(operation = ?operation.kind(), error = %e, "operation failed, rolling back");
            Self::rollback(target, &snapshot);
            return Err(e);
        }

        if self.position < self.slots.len() {
            let dropped = self.slots.len() - self.position;
            self.slots.truncate(self.position);
            debug!(dropped, "discarded redo tail");
        }

        self.slots.push_back(Slot { operation, snapshot });
        self.position += 1;
        self.enforce_depth();

        debug!(position = self.position, len = self.slots.len(), "executed");
        Ok(())
    }

    /// Restore `target` to the state before the most recent active operation.
    pub fn undo<T>(&mut self, target: &mut T) -> Result<()>
    where
        T: Target<Kind = K>,
    {
        if self.position == 0 {
            return Err(HistoryError::NothingToUndo);
        }

        target.restore(&self.slots[self.position - 1].snapshot)?;
        self.position -= 1;

        debug!(position = self.position, len = self.slots.len(), "undo");
        Ok(())
    }

    /// Re-apply the first operation of the redo tail.
    pub fn redo<T>(&mut self, target: &mut T) -> Result<()>
    where
        T: Target<Kind = K>,
    {
        let Some(slot) = self.slots.get(self.position) else {
            return Err(HistoryError::NothingToRedo);
        };

        if let Err(e) = target.apply(slot.operation.kind()) {
            warn!(operation = ?slot.operation.kind(), error = %e, "redo failed");
            return Err(e);
        }
        self.position += 1;

        debug!(position = self.position, len = self.slots.len(), "redo");
        Ok(())
    }

    /// Move the cursor to `position`, bringing `target` along.
    ///
    /// Moving back restores a single snapshot; moving forward replays the
    /// recorded operations in order. A replay that fails partway restores the
    /// snapshot recorded for the starting position.
    pub fn seek<T>(&mut self, target: &mut T, position: usize) -> Result<()>
    where
        T: Target<Kind = K>,
    {
        let len = self.slots.len();
        if position > len {
            return Err(HistoryError::InvalidPosition {
                requested: position,
                len,
            });
        }

        match position.cmp(&self.position) {
            Ordering::Equal => return Ok(()),
            Ordering::Less => {
                target.restore(&self.slots[position].snapshot)?;
            }
            Ordering::Greater => {
                for slot in self.slots.range(self.position..position) {
                    if let Err(e) = target.apply(slot.operation.kind()) {
                        warn!(operation = ?slot.operation.kind(), error = %e, "seek failed, rolling back");
                        Self::rollback(target, &self.slots[self.position].snapshot);
                        return Err(e);
                    }
                }
            }
        }

        debug!(from = self.position, to = position, len, "seek");
        self.position = position;
        Ok(())
    }

    /// Drop every slot. The target is left as it is.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.position = 0;
    }

    // --- Queries ---

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.slots.len()
    }

    /// Cursor separating active history from the redo tail.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Operation the next `undo` would revert.
    pub fn peek_undo(&self) -> Option<&Operation<K>> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .map(|slot| &slot.operation)
    }

    /// Operation the next `redo` would replay.
    pub fn peek_redo(&self) -> Option<&Operation<K>> {
        self.slots.get(self.position).map(|slot| &slot.operation)
    }

    /// All slots, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_, K>> + '_ {
        self.slots.iter().enumerate().map(move |(index, slot)| Entry {
            index,
            operation: &slot.operation,
            snapshot: &slot.snapshot,
            active: index < self.position,
        })
    }

    // --- Internal ---

    fn enforce_depth(&mut self) {
        let Some(max) = self.config.max_depth else {
            return;
        };
        let max = max.max(1);

        while self.slots.len() > max {
            self.slots.pop_front();
            self.position = self.position.saturating_sub(1);
            trace!(max_depth = max, "evicted oldest slot");
        }
    }

    fn rollback<T: Target<Kind = K>>(target: &mut T, snapshot: &Snapshot) {
        if let Err(e) = target.restore(snapshot) {
            warn!(error = %e, "rollback restore failed, target state may be inconsistent");
        }
    }
}

impl<K: Clone + fmt::Debug> Default for History<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for History<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("position", &self.position)
            .field("len", &self.slots.len())
            .field("max_depth", &self.config.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::{Number, NumberOp};
    use serde::{Deserialize, Serialize};

    fn setup(value: i64) -> (History<NumberOp>, Number) {
        (History::new(), Number::new(value))
    }

    #[test]
    fn test_fresh_history_boundaries() {
        let (mut history, mut n) = setup(5);

        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.is_empty());
        assert!(matches!(history.undo(&mut n), Err(HistoryError::NothingToUndo)));
        assert!(matches!(history.redo(&mut n), Err(HistoryError::NothingToRedo)));
        assert_eq!(n, Number::new(5));
        assert_eq!(history.position(), 0);
    }

    #[test]
    fn test_documented_scenario() {
        let (mut history, mut n) = setup(5);

        history.execute(&mut n, NumberOp::Double).unwrap();
        assert_eq!(n.value(), 10);
        history.execute(&mut n, NumberOp::IncrementByOne).unwrap();
        assert_eq!(n.value(), 11);

        history.undo(&mut n).unwrap();
        assert_eq!(n.value(), 10);
        history.undo(&mut n).unwrap();
        assert_eq!(n.value(), 5);

        history.redo(&mut n).unwrap();
        assert_eq!(n.value(), 10);

        history.execute(&mut n, NumberOp::Halve).unwrap();
        assert_eq!(n.value(), 5);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.peek_undo(), Some(&Operation::new(NumberOp::Halve)));
    }

    #[test]
    fn test_branch_discards_redo_tail() {
        let (mut history, mut n) = setup(3);

        history.execute(&mut n, NumberOp::Double).unwrap();
        history.execute(&mut n, NumberOp::Double).unwrap();
        history.undo(&mut n).unwrap();
        assert!(history.can_redo());

        history.execute(&mut n, NumberOp::IncrementByOne).unwrap();
        assert!(!history.can_redo());
        assert!(matches!(history.redo(&mut n), Err(HistoryError::NothingToRedo)));
        assert_eq!(n.value(), 7);
    }

    #[test]
    fn test_undo_restores_derived_fields() {
        let (mut history, mut n) = setup(12);

        history.execute(&mut n, NumberOp::Double).unwrap();
        assert_eq!(n.name(), "Number24");

        history.undo(&mut n).unwrap();
        assert_eq!(n.name(), "Number12");
        assert_eq!(n.decimal(), 0.12);
    }

    #[test]
    fn test_identical_executes_not_deduplicated() {
        let (mut history, mut n) = setup(0);

        for _ in 0..3 {
            history.execute(&mut n, NumberOp::IncrementByOne).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.position(), 3);
        assert_eq!(n.value(), 3);
    }

    #[test]
    fn test_failed_execute_leaves_everything_unchanged() {
        let (mut history, mut n) = setup(i64::MAX / 2 + 2);

        history.execute(&mut n, NumberOp::DecrementByOne).unwrap();
        history.execute(&mut n, NumberOp::IncrementByOne).unwrap();
        history.undo(&mut n).unwrap();
        let before = n.clone();

        let result = history.execute(&mut n, NumberOp::Double);
        assert!(matches!(result, Err(HistoryError::TargetRejected(_))));

        assert_eq!(n, before);
        assert_eq!(history.position(), 1);
        assert_eq!(history.len(), 2);
        assert!(history.can_redo());
    }

    #[test]
    fn test_peek_operations() {
        let (mut history, mut n) = setup(1);
        assert!(history.peek_undo().is_none());
        assert!(history.peek_redo().is_none());

        history.execute(&mut n, NumberOp::Double).unwrap();
        history.execute(&mut n, NumberOp::Halve).unwrap();
        history.undo(&mut n).unwrap();

        assert_eq!(history.peek_undo().map(|op| *op.kind()), Some(NumberOp::Double));
        assert_eq!(history.peek_redo().map(|op| *op.kind()), Some(NumberOp::Halve));
    }

    #[test]
    fn test_entries_mark_active_slots() {
        let (mut history, mut n) = setup(2);

        history.execute(&mut n, NumberOp::Double).unwrap();
        history.execute(&mut n, NumberOp::Double).unwrap();
        history.execute(&mut n, NumberOp::Double).unwrap();
        history.undo(&mut n).unwrap();

        let entries: Vec<_> = history.entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries.iter().map(|e| e.active).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert_eq!(entries[0].index, 0);

        let first: Number = entries[0].snapshot.decode().unwrap();
        assert_eq!(first, Number::new(2));
        let last: Number = entries[2].snapshot.decode().unwrap();
        assert_eq!(last, Number::new(8));
    }

    #[test]
    fn test_seek_backward_and_forward() {
        let (mut history, mut n) = setup(1);

        for op in [NumberOp::Double, NumberOp::IncrementByOne, NumberOp::Double] {
            history.execute(&mut n, op).unwrap();
        }
        assert_eq!(n.value(), 6);

        history.seek(&mut n, 0).unwrap();
        assert_eq!(n.value(), 1);
        assert_eq!(history.position(), 0);

        history.seek(&mut n, 2).unwrap();
        assert_eq!(n.value(), 3);
        assert_eq!(history.position(), 2);

        history.seek(&mut n, 2).unwrap();
        assert_eq!(n.value(), 3);

        history.seek(&mut n, 3).unwrap();
        assert_eq!(n.value(), 6);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_seek_out_of_range() {
        let (mut history, mut n) = setup(1);
        history.execute(&mut n, NumberOp::Double).unwrap();

        let result = history.seek(&mut n, 2);
        assert!(matches!(
            result,
            Err(HistoryError::InvalidPosition { requested: 2, len: 1 })
        ));
        assert_eq!(history.position(), 1);
        assert_eq!(n.value(), 2);
    }

    #[test]
    fn test_depth_cap_evicts_oldest() {
        let mut history = History::with_config(HistoryConfig {
            max_depth: Some(2),
            ..Default::default()
        });
        let mut n = Number::new(1);

        for _ in 0..4 {
            history.execute(&mut n, NumberOp::IncrementByOne).unwrap();
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.position(), 2);

        history.undo(&mut n).unwrap();
        history.undo(&mut n).unwrap();
        assert_eq!(n.value(), 3);
        assert!(matches!(history.undo(&mut n), Err(HistoryError::NothingToUndo)));
    }

    #[test]
    fn test_depth_cap_zero_keeps_one() {
        let mut history = History::with_config(HistoryConfig {
            max_depth: Some(0),
            ..Default::default()
        });
        let mut n = Number::new(1);

        history.execute(&mut n, NumberOp::Double).unwrap();
        history.execute(&mut n, NumberOp::Double).unwrap();
        assert_eq!(history.len(), 1);
        history.undo(&mut n).unwrap();
        assert_eq!(n.value(), 2);
    }

    #[test]
    fn test_clear() {
        let (mut history, mut n) = setup(4);
        history.execute(&mut n, NumberOp::Halve).unwrap();
        history.clear();

        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert_eq!(n.value(), 2);
    }

    #[test]
    fn test_json_encoding() {
        let mut history = History::with_config(HistoryConfig {
            encoding: SnapshotEncoding::Json,
            ..Default::default()
        });
        let mut n = Number::new(9);

        history.execute(&mut n, NumberOp::DecrementByOne).unwrap();
        let entry = history.entries().next().unwrap();
        assert_eq!(entry.snapshot.encoding(), SnapshotEncoding::Json);

        history.undo(&mut n).unwrap();
        assert_eq!(n.value(), 9);
    }

    // A target with a restricted capability set.
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum CounterOp {
        Bump,
        Reset,
    }

    impl Target for Counter {
        type Kind = CounterOp;

        fn capture(&self, encoding: SnapshotEncoding) -> Result<Snapshot> {
            Snapshot::encode(self, encoding)
        }

        fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
            *self = snapshot.decode()?;
            Ok(())
        }

        fn apply(&mut self, kind: &CounterOp) -> Result<()> {
            match kind {
                CounterOp::Bump => self.count += 1,
                CounterOp::Reset => self.count = 0,
            }
            Ok(())
        }

        fn supports(&self, kind: &CounterOp) -> bool {
            *kind != CounterOp::Reset
        }
    }

    #[test]
    fn test_unsupported_kind_is_invalid_operation() {
        let mut history = History::new();
        let mut counter = Counter::default();

        history.execute(&mut counter, CounterOp::Bump).unwrap();
        let result = history.execute(&mut counter, CounterOp::Reset);

        assert!(matches!(result, Err(HistoryError::InvalidOperation(_))));
        assert_eq!(counter.count, 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.position(), 1);
    }
}
