// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The structure iterator: sequences times dependency assignments.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cursor::{Cursor, CursorState};
use super::dependency::possible_dependencies;
use super::statistics::{Counters, Statistics};
use super::{
    Choosers, DependencyCursor, FeasibilityOracle, Mode, Sampling, SequenceCursor, Strategy,
};
use crate::config::GeneratorSettings;
use crate::error::{GeneratorError, Result};
use crate::filter::{AccessFilter, FilterBuilder, StructureFilter};
use crate::hazard::{BufferDependency, Hazard, UnitedDependency, UnitedHazard};
use crate::model::{MemoryAccess, MemoryAccessType, MemoryTopology};
use crate::source::{AccessConstraints, PathClassifier};
use crate::structure::MemoryAccessStructure;

/// Enumerates memory access structures for a template of access types.
///
/// The iterator is an odometer over two kinds of wheels. For the current
/// access sequence there is one dependency cursor per pair `i < j`; `next()`
/// turns the first of them that has another value (pairs in row-major
/// order), resetting the ones before it. Once every dependency cursor has
/// wrapped around, the sequence cursor moves on and the dependency cursors
/// are rebuilt for the new sequence. A sequence in which some pair admits no
/// dependency at all is skipped.
///
/// Every candidate is checked against the filters (basic, user and
/// advanced) and, when enabled, the feasibility oracle; only accepted
/// candidates become values.
///
/// In random mode one accepted assignment per sequence is enough: `next()`
/// goes straight to the next drawn sequence.
///
/// A sequence with an access the access filters reject is skipped before
/// any dependency is enumerated. With a count limit, exhaustive mode starts
/// over from the first sequence until the limit is reached.
pub struct StructureIterator {
    access_types: Vec<MemoryAccessType>,
    constraints: Vec<AccessConstraints>,
    settings: GeneratorSettings,
    strategy: Strategy,
    seed: u64,
    rng: StdRng,

    user_filters: FilterBuilder,
    access_filter: AccessFilter,
    pair_filter: StructureFilter,
    structure_filter: StructureFilter,
    oracle: Option<Box<dyn FeasibilityOracle>>,

    sequence: SequenceCursor,
    accesses: Vec<MemoryAccess>,
    pairs: Vec<(usize, usize)>,
    dependencies: Vec<DependencyCursor>,
    enough_dependencies: bool,

    state: CursorState,
    yielded: usize,
    yielded_at_restart: usize,
    statistics: Statistics,
}

impl StructureIterator {
    /// Classify every position and set up the cursors.
    ///
    /// `access_constraints` holds one set per position; each is merged over
    /// `global_constraints`, handed to the classifier and attached to every
    /// access drawn for that position.
    pub fn new(
        topology: &MemoryTopology,
        access_types: Vec<MemoryAccessType>,
        access_constraints: Vec<AccessConstraints>,
        global_constraints: AccessConstraints,
        classifier: &dyn PathClassifier,
        settings: GeneratorSettings,
    ) -> Result<Self> {
        if access_types.is_empty() {
            return Err(GeneratorError::EmptyAccessTypes);
        }
        if access_constraints.len() != access_types.len() {
            return Err(GeneratorError::ConstraintCountMismatch {
                types: access_types.len(),
                constraints: access_constraints.len(),
            });
        }

        let constraints: Vec<AccessConstraints> = access_constraints
            .iter()
            .map(|local| AccessConstraints::merge(&global_constraints, local))
            .collect();

        let mut choosers: Choosers = Vec::with_capacity(access_types.len());
        for (position, (access_type, constraints)) in
            access_types.iter().zip(&constraints).enumerate()
        {
            let candidates = classifier.path_choosers(
                topology,
                *access_type,
                constraints,
                settings.recursion_limit,
            );
            if candidates.is_empty() {
                return Err(GeneratorError::NoChoosers {
                    position,
                    access_type: access_type.to_string(),
                });
            }
            debug!("access {} ({}): {} choosers", position, access_type, candidates.len());
            choosers.push(candidates);
        }

        let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let strategy = settings.mode.strategy();
        let sampling = Sampling {
            seed,
            retry_limit: settings.random_retry_limit,
        };
        let sequence = (strategy.sequence)(choosers, &sampling);

        let size = access_types.len();
        let pairs = (0..size)
            .flat_map(|i| (i + 1..size).map(move |j| (i, j)))
            .collect();

        let mut basic = FilterBuilder::basic();
        let access_filter = basic.build_access_filter();
        let pair_filter = basic.build();
        basic.add_builder(&FilterBuilder::advanced());
        let structure_filter = basic.build();

        Ok(Self {
            access_types,
            constraints,
            settings,
            strategy,
            seed,
            rng: StdRng::seed_from_u64(seed),
            user_filters: FilterBuilder::new(),
            access_filter,
            pair_filter,
            structure_filter,
            oracle: None,
            sequence,
            accesses: Vec::new(),
            pairs,
            dependencies: Vec::new(),
            enough_dependencies: false,
            state: CursorState::Fresh,
            yielded: 0,
            yielded_at_restart: 0,
            statistics: Statistics::new(),
        })
    }

    pub fn access_types(&self) -> &[MemoryAccessType] {
        &self.access_types
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Seed in use, drawn at construction when the settings carry none.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Install the oracle consulted when `check_structure` is on.
    pub fn set_oracle<O>(&mut self, oracle: O)
    where
        O: FeasibilityOracle + 'static,
    {
        self.oracle = Some(Box::new(oracle));
    }

    // User filters take effect at the next `init()`.

    pub fn add_access_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess) -> bool + 'static,
    {
        self.user_filters.add_access_filter(filter);
    }

    pub fn add_hazard_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &MemoryAccess, &Hazard) -> bool + 'static,
    {
        self.user_filters.add_hazard_filter(filter);
    }

    pub fn add_dependency_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &MemoryAccess, &BufferDependency) -> bool + 'static,
    {
        self.user_filters.add_dependency_filter(filter);
    }

    pub fn add_united_hazard_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &UnitedHazard) -> bool + 'static,
    {
        self.user_filters.add_united_hazard_filter(filter);
    }

    pub fn add_united_dependency_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &UnitedDependency) -> bool + 'static,
    {
        self.user_filters.add_united_dependency_filter(filter);
    }

    pub fn add_structure_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccessStructure) -> bool + 'static,
    {
        self.user_filters.add_structure_filter(filter);
    }

    /// The filter every yielded structure satisfies.
    pub fn structure_filter(&self) -> StructureFilter {
        self.structure_filter.clone()
    }

    /// The current structure, without attaching dependency rows.
    pub fn structure(&self) -> Option<MemoryAccessStructure> {
        self.has_value().then(|| self.assemble())
    }

    /// Borrowing iterator over the remaining values, starting with `init()`.
    pub fn structures(&mut self) -> Structures<'_> {
        Structures {
            cursor: self,
            started: false,
        }
    }

    fn rebuild_filters(&mut self) {
        let mut builder = FilterBuilder::basic();
        builder.add_builder(&self.user_filters);
        self.access_filter = builder.build_access_filter();
        self.pair_filter = builder.build();
        builder.add_builder(&FilterBuilder::advanced());
        self.structure_filter = builder.build();
    }

    fn assemble(&self) -> MemoryAccessStructure {
        let size = self.accesses.len();
        let mut matrix: Vec<Vec<Option<BufferDependency>>> = vec![vec![None; size]; size];
        for (&(i, j), cursor) in self.pairs.iter().zip(&self.dependencies) {
            matrix[i][j] = cursor.value().flatten();
        }
        MemoryAccessStructure::new(self.accesses.clone(), matrix)
    }

    fn load_accesses(&mut self) -> bool {
        let Some(accesses) = self.sequence.value() else {
            return false;
        };
        self.accesses = accesses
            .into_iter()
            .zip(&self.constraints)
            .map(|(access, constraints)| access.with_constraints(constraints.clone()))
            .collect();
        self.enough_dependencies = false;
        self.statistics.increment(Counters::SequencesDrawn);

        if let Some(position) = self.accesses.iter().position(|a| !(self.access_filter)(a)) {
            trace!("sequence rejected: access {} {}", position, self.accesses[position]);
            self.statistics.increment(Counters::SequencesRejected);
            return false;
        }
        true
    }

    /// Build one dependency cursor per pair; false if some pair has none.
    fn init_dependencies(&mut self) -> bool {
        self.dependencies.clear();
        for &(i, j) in &self.pairs {
            let possible = possible_dependencies(
                &self.accesses[i],
                &self.accesses[j],
                &self.pair_filter,
                self.settings.address_hazards,
            );
            trace!("pair {} -> {}: {} possible dependencies", i, j, possible.len());
            if possible.is_empty() {
                trace!("sequence rejected: no dependency between {} and {}", i, j);
                self.statistics.increment(Counters::SequencesRejected);
                self.dependencies.clear();
                return false;
            }
            let sampling = Sampling {
                seed: self.rng.gen(),
                retry_limit: self.settings.random_retry_limit,
            };
            let mut cursor = (self.strategy.dependency)(possible, &sampling);
            cursor.init();
            self.dependencies.push(cursor);
        }
        true
    }

    /// Move to the first usable sequence at or after the current one.
    fn settle_accesses(&mut self) -> bool {
        let mut rejected = 0;
        while self.sequence.has_value() {
            if self.load_accesses() && self.init_dependencies() {
                return true;
            }
            rejected += 1;
            if self.gives_up(rejected) {
                debug!("giving up after {} unusable random sequences", rejected);
                return false;
            }
            self.sequence.next();
        }
        false
    }

    /// Random mode never runs out of candidates, so it stops after too many
    /// consecutive failures.
    fn gives_up(&self, failures: usize) -> bool {
        self.settings.mode == Mode::Random && failures >= self.settings.random_retry_limit
    }

    fn next_dependencies(&mut self) -> bool {
        for cursor in self.dependencies.iter_mut() {
            if cursor.has_value() {
                cursor.next();
                if cursor.has_value() {
                    return true;
                }
                cursor.init();
            }
        }
        false
    }

    fn next_structure(&mut self) -> bool {
        if !self.enough_dependencies && self.next_dependencies() {
            return true;
        }
        self.sequence.next();
        self.settle_accesses() || self.restart_sequence()
    }

    /// Under a count limit, an exhausted pass over the sequences starts over,
    /// as long as the pass yielded something.
    fn restart_sequence(&mut self) -> bool {
        if self.settings.mode != Mode::Exhaustive
            || self.settings.count_limit.is_none()
            || self.yielded == self.yielded_at_restart
        {
            return false;
        }
        debug!("restarting sequences after {} structures", self.yielded);
        self.yielded_at_restart = self.yielded;
        self.sequence.init();
        self.settle_accesses()
    }

    fn check_structure(&mut self) -> bool {
        let structure = self.assemble();
        self.statistics.increment(Counters::CandidatesChecked);

        if !(self.structure_filter)(&structure) {
            self.statistics.increment(Counters::StructuresRejected);
            return false;
        }
        if self.settings.check_structure {
            if let Some(oracle) = &self.oracle {
                if !oracle.is_feasible(&structure) {
                    trace!("structure infeasible:\n{}", structure);
                    self.statistics.increment(Counters::InfeasibleStructures);
                    return false;
                }
            }
        }

        if self.strategy.enough_dependencies {
            self.enough_dependencies = true;
        }
        true
    }

    /// Advance until a candidate is accepted or nothing is left.
    fn seek(&mut self, mut have_candidate: bool) {
        let mut failures = 0;
        loop {
            if !have_candidate {
                debug!("structures exhausted: {}", self.statistics);
                self.state = CursorState::Exhausted;
                return;
            }
            if self.check_structure() {
                self.yielded += 1;
                self.statistics.increment(Counters::StructuresYielded);
                self.state = CursorState::HasValue;
                return;
            }
            failures += 1;
            if self.gives_up(failures) {
                debug!("giving up after {} rejected random candidates", failures);
                self.state = CursorState::Exhausted;
                return;
            }
            have_candidate = self.next_structure();
        }
    }

    fn limit_reached(&self) -> bool {
        self.settings
            .count_limit
            .is_some_and(|limit| self.yielded >= limit)
    }
}

impl Cursor for StructureIterator {
    type Item = Vec<MemoryAccess>;

    fn init(&mut self) {
        debug!(
            "init: {} access types, mode {}",
            self.access_types.len(),
            self.settings.mode
        );
        self.statistics.reset();
        self.yielded = 0;
        self.yielded_at_restart = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
        self.rebuild_filters();
        self.state = CursorState::Fresh;

        if self.limit_reached() {
            self.state = CursorState::Exhausted;
            return;
        }
        self.sequence.init();
        let have_candidate = self.settle_accesses();
        self.seek(have_candidate);
    }

    fn has_value(&self) -> bool {
        self.state == CursorState::HasValue
    }

    /// The accesses of the current structure, dependency rows attached.
    fn value(&self) -> Option<Vec<MemoryAccess>> {
        self.structure().map(MemoryAccessStructure::into_accesses)
    }

    fn next(&mut self) {
        if !self.has_value() {
            return;
        }
        if self.limit_reached() {
            debug!("count limit {} reached", self.yielded);
            self.state = CursorState::Exhausted;
            return;
        }
        let have_candidate = self.next_structure();
        self.seek(have_candidate);
    }

    fn stop(&mut self) {
        self.sequence.stop();
        self.state = CursorState::Exhausted;
    }

    fn name(&self) -> &'static str {
        "StructureIterator"
    }
}

/// Iterator adapter returned by [`StructureIterator::structures`].
pub struct Structures<'a> {
    cursor: &'a mut StructureIterator,
    started: bool,
}

impl Iterator for Structures<'_> {
    type Item = Vec<MemoryAccess>;

    fn next(&mut self) -> Option<Vec<MemoryAccess>> {
        if self.started {
            self.cursor.next();
        } else {
            self.cursor.init();
            self.started = true;
        }
        self.cursor.value()
    }
}
