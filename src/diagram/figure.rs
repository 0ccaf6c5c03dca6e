// Figure identifiers
//
// Every diagram, entity and relationship carries a figure id. Ids come from an
// explicit generator shared by the diagrams of one session, so resetting it
// gives reproducible numbering without any global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a figure, unique within its generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FigureId(pub u64);

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything drawn in a diagram
pub trait Figure {
    fn fig_id(&self) -> FigureId;
}

/// Monotonic figure id counter
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator whose first id is `value + 1`
    pub fn starting_at(value: u64) -> Self {
        Self {
            counter: AtomicU64::new(value),
        }
    }

    /// Reset the counter; the next id issued is `value + 1`
    pub fn set_counter(&self, value: u64) {
        self.counter.store(value, Ordering::SeqCst);
    }

    /// Last id issued (or the reset value)
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Issue the next id
    pub fn next_id(&self) -> FigureId {
        FigureId(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
