//! Undo/redo history.
//!
//! Each executed operation is logged together with a snapshot of the target
//! taken just before it ran. A cursor splits the log into active history and
//! a redo tail; executing a new operation after an undo drops the tail.

mod engine;
mod shared;

pub use engine::{Entry, History, HistoryConfig};
pub use shared::SharedHistory;
