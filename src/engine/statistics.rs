// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Counters kept by a structure iterator, reset on every `init()`.

use std::fmt;

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

#[derive(Debug, EnumCountMacro, EnumIter, Display, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counters {
    /// Access sequences loaded from the sequence iterator.
    SequencesDrawn,
    /// Sequences with a pair that admits no dependency.
    SequencesRejected,
    /// Complete candidates handed to the filters.
    CandidatesChecked,
    StructuresRejected,
    /// Candidates the feasibility oracle turned down.
    InfeasibleStructures,
    StructuresYielded,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; Counters::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub(crate) fn increment(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    pub(crate) fn reset(&mut self) {
        self.stats = [0; Counters::COUNT];
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Counters::iter()
            .map(|counter| format!("{}={}", counter, self.get(counter)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
