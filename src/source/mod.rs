// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Boundary with the path classifier.
//!
//! Classifying one abstract access into concrete buffer paths is not part of
//! the generator. The generator asks a [`PathClassifier`] for the choosers of
//! every template position and then only ever calls [`AccessChooser::choose`].
//! The [`table`] module has a table-driven classifier for tests and simple
//! callers.

pub mod table;

pub use table::{FixedChooser, TableClassifier};

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::rc::Rc;

use crate::model::{AccessPath, BufferAccessEvent, MemoryAccess, MemoryAccessType, MemoryTopology};

/// Produces one candidate memory access, or `None` when it cannot.
pub trait AccessChooser: Debug {
    fn choose(&self) -> Option<MemoryAccess>;
}

/// Maps an access type to the choosers for its paths.
pub trait PathClassifier {
    fn path_choosers(
        &self,
        topology: &MemoryTopology,
        access_type: MemoryAccessType,
        constraints: &AccessConstraints,
        recursion_limit: usize,
    ) -> Vec<Rc<dyn AccessChooser>>;
}

/// The events an access is allowed to cause on one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEventConstraint {
    pub buffer: String,
    pub events: BTreeSet<BufferAccessEvent>,
}

impl BufferEventConstraint {
    pub fn new(buffer: &str, events: &[BufferAccessEvent]) -> Self {
        Self {
            buffer: String::from(buffer),
            events: events.iter().copied().collect(),
        }
    }

    /// The path must consult the buffer, and only with allowed events.
    pub fn admits(&self, path: &AccessPath) -> bool {
        let events = path.events(&self.buffer);
        !events.is_empty() && events.iter().all(|e| self.events.contains(e))
    }
}

/// Constraints on the paths of one access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessConstraints {
    buffer_events: Vec<BufferEventConstraint>,
}

impl AccessConstraints {
    pub fn new(buffer_events: Vec<BufferEventConstraint>) -> Self {
        Self { buffer_events }
    }

    pub fn buffer_events(&self) -> &[BufferEventConstraint] {
        &self.buffer_events
    }

    pub fn is_empty(&self) -> bool {
        self.buffer_events.is_empty()
    }

    pub fn admits(&self, path: &AccessPath) -> bool {
        self.buffer_events.iter().all(|c| c.admits(path))
    }

    /// The global set overridden, buffer by buffer, by the local one.
    pub fn merge(global: &AccessConstraints, local: &AccessConstraints) -> AccessConstraints {
        let mut buffer_events: Vec<BufferEventConstraint> = global
            .buffer_events
            .iter()
            .filter(|g| !local.buffer_events.iter().any(|l| l.buffer == g.buffer))
            .cloned()
            .collect();
        buffer_events.extend(local.buffer_events.iter().cloned());
        AccessConstraints { buffer_events }
    }
}
