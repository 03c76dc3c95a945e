//! A history and its target behind a single lock.

use super::engine::{History, HistoryConfig};
use crate::error::Result;
use crate::target::{Operation, Target};
use parking_lot::Mutex;

struct Inner<T: Target> {
    history: History<T::Kind>,
    target: T,
}

/// Serializes every history call together with the target it mutates.
///
/// `History` itself has no locking; guarding it alone would still leave the
/// target unsynchronized, so both live under one mutex here.
pub struct SharedHistory<T: Target> {
    inner: Mutex<Inner<T>>,
}

impl<T: Target> SharedHistory<T> {
    pub fn new(target: T) -> Self {
        Self::with_config(target, HistoryConfig::default())
    }

    pub fn with_config(target: T, config: HistoryConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                history: History::with_config(config),
                target,
            }),
        }
    }

    pub fn execute(&self, operation: impl Into<Operation<T::Kind>>) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { history, target } = &mut *guard;
        history.execute(target, operation)
    }

    pub fn undo(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { history, target } = &mut *guard;
        history.undo(target)
    }

    pub fn redo(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { history, target } = &mut *guard;
        history.redo(target)
    }

    pub fn seek(&self, position: usize) -> Result<()> {
        let mut guard = self.inner.lock();
        let Inner { history, target } = &mut *guard;
        history.seek(target, position)
    }

    pub fn can_undo(&self) -> bool {
        self.inner.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.lock().history.can_redo()
    }

    pub fn position(&self) -> usize {
        self.inner.lock().history.position()
    }

    /// Read the target while holding the lock.
    pub fn with_target<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock().target)
    }

    /// Read the history while holding the lock.
    pub fn with_history<R>(&self, f: impl FnOnce(&History<T::Kind>) -> R) -> R {
        f(&self.inner.lock().history)
    }

    pub fn into_inner(self) -> (History<T::Kind>, T) {
        let inner = self.inner.into_inner();
        (inner.history, inner.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HistoryError;
    use crate::number::{Number, NumberOp};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_shared_undo_redo() {
        let shared = SharedHistory::new(Number::new(5));

        shared.execute(NumberOp::Double).unwrap();
        assert_eq!(shared.with_target(|n| n.value()), 10);

        shared.undo().unwrap();
        assert_eq!(shared.with_target(|n| n.value()), 5);
        assert!(shared.can_redo());

        shared.redo().unwrap();
        assert_eq!(shared.with_target(|n| n.value()), 10);
        assert!(matches!(shared.redo(), Err(HistoryError::NothingToRedo)));
    }

    #[test]
    fn test_concurrent_executes_are_serialized() {
        let shared = Arc::new(SharedHistory::new(Number::new(0)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..25 {
                        shared.execute(NumberOp::IncrementByOne).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.with_target(|n| n.value()), 100);
        assert_eq!(shared.position(), 100);

        shared.seek(0).unwrap();
        assert_eq!(shared.with_target(|n| n.value()), 0);
    }

    #[test]
    fn test_into_inner() {
        let shared = SharedHistory::new(Number::new(3));
        shared.execute(NumberOp::IncrementByOne).unwrap();

        let (mut history, mut n) = shared.into_inner();
        assert_eq!(history.len(), 1);
        history.undo(&mut n).unwrap();
        assert_eq!(n.value(), 3);
    }
}
