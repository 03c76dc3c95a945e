//! Reference target: an integer with deterministically derived fields.

use crate::error::{HistoryError, Result};
use crate::snapshot::Snapshot;
use crate::target::Target;
use crate::types::SnapshotEncoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NAME_PREFIX: &str = "Number";

/// An integer value plus fields derived from it.
///
/// The derived fields exist so that a snapshot has to carry more than one
/// scalar; restoring only `value` would leave them stale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Number {
    value: i64,
    name: String,
    decimal: f64,
}

impl Number {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            name: format!("{}{}", NAME_PREFIX, value),
            decimal: value as f64 / 100.0,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decimal(&self) -> f64 {
        self.decimal
    }

    fn set(&mut self, value: i64) {
        *self = Number::new(value);
    }
}

/// Mutations supported by [`Number`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberOp {
    Double,
    Halve,
    IncrementByOne,
    DecrementByOne,
}

impl NumberOp {
    pub const ALL: [NumberOp; 4] = [
        NumberOp::Double,
        NumberOp::Halve,
        NumberOp::IncrementByOne,
        NumberOp::DecrementByOne,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumberOp::Double => "double",
            NumberOp::Halve => "halve",
            NumberOp::IncrementByOne => "increment",
            NumberOp::DecrementByOne => "decrement",
        }
    }

    fn eval(&self, value: i64) -> Option<i64> {
        match self {
            NumberOp::Double => value.checked_mul(2),
            // Truncates toward zero.
            NumberOp::Halve => Some(value / 2),
            NumberOp::IncrementByOne => value.checked_add(1),
            NumberOp::DecrementByOne => value.checked_sub(1),
        }
    }
}

impl fmt::Display for NumberOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumberOp {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double" => Ok(NumberOp::Double),
            "halve" | "half" => Ok(NumberOp::Halve),
            "increment" | "inc" => Ok(NumberOp::IncrementByOne),
            "decrement" | "dec" => Ok(NumberOp::DecrementByOne),
            other => Err(HistoryError::InvalidOperation(format!(
                "unknown number operation '{}'",
                other
            ))),
        }
    }
}

impl Target for Number {
    type Kind = NumberOp;

    fn capture(&self, encoding: SnapshotEncoding) -> Result<Snapshot> {
        Snapshot::encode(self, encoding)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        *self = snapshot.decode()?;
        Ok(())
    }

    fn apply(&mut self, kind: &NumberOp) -> Result<()> {
        let next = kind.eval(self.value).ok_or_else(|| {
            HistoryError::TargetRejected(format!("{} overflows {}", kind, self.value))
        })?;
        self.set(next);
        Ok(())
    }
}
