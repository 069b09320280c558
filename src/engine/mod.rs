// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Structure enumeration engine.
//!
//! Three layers of cursors, each following the [`Cursor`] protocol:
//!
//! 1. An access-sequence cursor draws one concrete access per template
//!    position ([`ExhaustiveSequence`] or [`RandomSequence`]).
//! 2. For each pair `i < j` of the current sequence, a dependency cursor walks
//!    the possible dependencies of `j` on `i` ([`ExhaustiveDependencies`] or
//!    [`RandomDependencies`]).
//! 3. [`StructureIterator`] combines them as an odometer: the dependency
//!    cursors turn first, in row-major pair order, and the sequence cursor
//!    only moves once they have all wrapped around.
//!
//! The [`Mode`] picks which cursor implementations are used, through the
//! factories of its [`Strategy`].
//!
//! # Example
//!
//! ```
//! use mmu_structure_gen::config::GeneratorSettings;
//! use mmu_structure_gen::engine::{Cursor, Mode, StructureIterator};
//! use mmu_structure_gen::model::*;
//! use mmu_structure_gen::source::{AccessConstraints, TableClassifier};
//!
//! let l1 = Buffer::cache("L1", "PA", 1, 64);
//! let topology = MemoryTopology::new(vec![l1.clone()]);
//! let path = AccessPath::new(vec![BufferAccess::new(l1, BufferAccessEvent::Hit)]);
//! let classifier = TableClassifier::new().with_paths(MemoryAccessType::load(8), vec![path]);
//!
//! let mut iterator = StructureIterator::new(
//!     &topology,
//!     vec![MemoryAccessType::load(8); 2],
//!     vec![AccessConstraints::default(); 2],
//!     AccessConstraints::default(),
//!     &classifier,
//!     GeneratorSettings::new(Mode::Exhaustive),
//! )
//! .unwrap();
//!
//! // PA.ADDR_NOT_EQUAL with each of three L1 hazards, PA.ADDR_EQUAL with TAG_EQUAL.
//! assert_eq!(iterator.structures().count(), 4);
//! ```

pub mod cursor;
pub mod dependency;
pub mod sequence;
pub mod statistics;
pub mod structure;

pub use cursor::{Cursor, CursorState};
pub use dependency::{possible_dependencies, ExhaustiveDependencies, RandomDependencies};
pub use sequence::{Choosers, ExhaustiveSequence, RandomSequence};
pub use statistics::{Counters, Statistics};
pub use structure::{StructureIterator, Structures};

use strum_macros::Display;

use crate::hazard::BufferDependency;
use crate::model::MemoryAccess;
use crate::structure::MemoryAccessStructure;

/// Seed and retry bound handed to the cursor factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub seed: u64,
    pub retry_limit: usize,
}

pub type SequenceCursor = Box<dyn Cursor<Item = Vec<MemoryAccess>>>;
pub type DependencyCursor = Box<dyn Cursor<Item = Option<BufferDependency>>>;

pub type SequenceFactory = fn(Choosers, &Sampling) -> SequenceCursor;
pub type DependencyFactory = fn(Vec<Option<BufferDependency>>, &Sampling) -> DependencyCursor;

/// Cursor factories plus the short-circuit rule of one mode.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub sequence: SequenceFactory,
    pub dependency: DependencyFactory,
    /// One accepted dependency assignment per access sequence is enough.
    pub enough_dependencies: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Mode {
    /// Sample: one structure per drawn sequence, without end.
    Random,
    /// Every structure, in lexicographic order.
    Exhaustive,
}

fn exhaustive_sequence(choosers: Choosers, _sampling: &Sampling) -> SequenceCursor {
    Box::new(ExhaustiveSequence::new(choosers))
}

fn random_sequence(choosers: Choosers, sampling: &Sampling) -> SequenceCursor {
    Box::new(RandomSequence::new(choosers, sampling))
}

fn exhaustive_dependencies(
    dependencies: Vec<Option<BufferDependency>>,
    _sampling: &Sampling,
) -> DependencyCursor {
    Box::new(ExhaustiveDependencies::new(dependencies))
}

fn random_dependencies(
    dependencies: Vec<Option<BufferDependency>>,
    sampling: &Sampling,
) -> DependencyCursor {
    Box::new(RandomDependencies::new(dependencies, sampling))
}

impl Mode {
    pub fn strategy(self) -> Strategy {
        match self {
            Mode::Random => Strategy {
                sequence: random_sequence,
                dependency: random_dependencies,
                enough_dependencies: true,
            },
            Mode::Exhaustive => Strategy {
                sequence: exhaustive_sequence,
                dependency: exhaustive_dependencies,
                enough_dependencies: false,
            },
        }
    }
}

/// Whether a structure admits concrete addresses. Stands in for the solver.
pub trait FeasibilityOracle {
    fn is_feasible(&self, structure: &MemoryAccessStructure) -> bool;
}

impl<F> FeasibilityOracle for F
where
    F: Fn(&MemoryAccessStructure) -> bool,
{
    fn is_feasible(&self, structure: &MemoryAccessStructure) -> bool {
        self(structure)
    }
}
