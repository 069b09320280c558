// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Generator settings.
//!
//! Compile-time defaults come from Cargo features; everything can still be
//! set per cursor through the `with_*` methods.

use crate::engine::Mode;

/// Default bound on nested table-walk unrolling.
pub const DEFAULT_RECURSION_LIMIT: usize = 1;

/// Default bound on consecutive failed draws in random mode.
pub const DEFAULT_RANDOM_RETRY_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub mode: Mode,
    pub recursion_limit: usize,
    /// Re-check accepted structures with the feasibility oracle.
    pub check_structure: bool,
    /// Cross address hazards (`PA.ADDR_EQUAL`, ...) into every dependency.
    pub address_hazards: bool,
    /// Stop after this many structures. Exhaustive mode starts over from the
    /// first sequence until the limit is reached.
    pub count_limit: Option<usize>,
    /// Seed for random mode; `None` draws one at construction.
    pub seed: Option<u64>,
    pub random_retry_limit: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Exhaustive,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            check_structure: cfg!(feature = "check-structure"),
            address_hazards: true,
            count_limit: None,
            seed: None,
            random_retry_limit: DEFAULT_RANDOM_RETRY_LIMIT,
        }
    }
}

impl GeneratorSettings {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_recursion_limit(mut self, recursion_limit: usize) -> Self {
        self.recursion_limit = recursion_limit;
        self
    }

    pub fn with_check_structure(mut self, check_structure: bool) -> Self {
        self.check_structure = check_structure;
        self
    }

    pub fn with_address_hazards(mut self, address_hazards: bool) -> Self {
        self.address_hazards = address_hazards;
        self
    }

    pub fn with_count_limit(mut self, count_limit: usize) -> Self {
        self.count_limit = Some(count_limit);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_random_retry_limit(mut self, random_retry_limit: usize) -> Self {
        self.random_retry_limit = random_retry_limit.max(1);
        self
    }
}
