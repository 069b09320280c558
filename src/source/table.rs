// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Table-driven path classification.

use std::rc::Rc;

use log::trace;

use super::{AccessChooser, AccessConstraints, PathClassifier};
use crate::model::{AccessPath, MemoryAccess, MemoryAccessType, MemoryTopology};

/// Always chooses the same path.
#[derive(Debug, Clone)]
pub struct FixedChooser {
    access_type: MemoryAccessType,
    path: AccessPath,
}

impl FixedChooser {
    pub fn new(access_type: MemoryAccessType, path: AccessPath) -> Self {
        Self { access_type, path }
    }
}

impl AccessChooser for FixedChooser {
    fn choose(&self) -> Option<MemoryAccess> {
        Some(MemoryAccess::new(self.access_type, self.path.clone()))
    }
}

/// A classifier backed by a list of known paths per access type.
///
/// Paths that violate the constraints, or that nest deeper than the
/// recursion limit, are dropped.
#[derive(Debug, Clone, Default)]
pub struct TableClassifier {
    table: Vec<(MemoryAccessType, Vec<AccessPath>)>,
}

impl TableClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, access_type: MemoryAccessType, paths: Vec<AccessPath>) -> Self {
        match self.table.iter_mut().find(|(t, _)| *t == access_type) {
            Some((_, known)) => known.extend(paths),
            None => self.table.push((access_type, paths)),
        }
        self
    }

    pub fn paths(&self, access_type: MemoryAccessType) -> &[AccessPath] {
        self.table
            .iter()
            .find(|(t, _)| *t == access_type)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or(&[])
    }
}

fn nesting(path: &AccessPath) -> usize {
    path.entries()
        .iter()
        .map(|e| e.context().depth())
        .max()
        .unwrap_or(0)
}

impl PathClassifier for TableClassifier {
    fn path_choosers(
        &self,
        _topology: &MemoryTopology,
        access_type: MemoryAccessType,
        constraints: &AccessConstraints,
        recursion_limit: usize,
    ) -> Vec<Rc<dyn AccessChooser>> {
        let choosers: Vec<Rc<dyn AccessChooser>> = self
            .paths(access_type)
            .iter()
            .filter(|path| nesting(path) <= recursion_limit && constraints.admits(path))
            .map(|path| {
                Rc::new(FixedChooser::new(access_type, path.clone())) as Rc<dyn AccessChooser>
            })
            .collect();
        trace!(
            "{}: {} of {} paths classified",
            access_type,
            choosers.len(),
            self.paths(access_type).len()
        );
        choosers
    }
}
