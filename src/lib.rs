//! # History Engine
//!
//! Undo/redo for any object whose edits can be expressed as a closed set of
//! named mutations.
//!
//! ## Core Concepts
//!
//! - **Target**: the object being edited; applies mutations and captures or
//!   restores its full state
//! - **Operation**: a replayable request to apply one mutation kind
//! - **Snapshot**: opaque, checksummed capture of a target's state
//! - **History**: log of (operation, pre-execution snapshot) slots and a
//!   cursor; executing after an undo discards the redo tail
//!
//! ## Example
//!
//! ```
//! use history_engine::{History, Number, NumberOp};
//!
//! let mut number = Number::new(5);
//! let mut history = History::new();
//!
//! history.execute(&mut number, NumberOp::Double)?;
//! history.execute(&mut number, NumberOp::IncrementByOne)?;
//! assert_eq!(number.value(), 11);
//!
//! history.undo(&mut number)?;
//! history.undo(&mut number)?;
//! assert_eq!(number.value(), 5);
//!
//! history.redo(&mut number)?;
//! history.execute(&mut number, NumberOp::Halve)?;
//! assert_eq!(number.value(), 5);
//! assert!(!history.can_redo());
//! # Ok::<(), history_engine::HistoryError>(())
//! ```

pub mod error;
pub mod history;
pub mod number;
pub mod snapshot;
pub mod target;
pub mod types;

// Re-exports
pub use error::{HistoryError, Result};
pub use history::{Entry, History, HistoryConfig, SharedHistory};
pub use number::{Number, NumberOp};
pub use snapshot::Snapshot;
pub use target::{Operation, Target};
pub use types::{ContentHash, SnapshotEncoding};
