// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Memory accesses: one logical load or store and the path it takes.

use std::fmt;
use strum_macros::Display;

use super::path::AccessPath;
use crate::hazard::BufferDependency;
use crate::source::AccessConstraints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum MemoryOperation {
    Load,
    Store,
}

/// Classification of an access: operation plus data size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryAccessType {
    pub operation: MemoryOperation,
    pub size: usize,
}

impl MemoryAccessType {
    pub fn load(size: usize) -> Self {
        Self {
            operation: MemoryOperation::Load,
            size,
        }
    }

    pub fn store(size: usize) -> Self {
        Self {
            operation: MemoryOperation::Store,
            size,
        }
    }
}

impl fmt::Display for MemoryAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.operation, self.size)
    }
}

/// One memory access of a structure.
///
/// The type and path are fixed when the access is drawn from a chooser.
/// `dependencies` is empty until the assembler attaches the row: entry `i`
/// is the dependency on the earlier access `i`, `None` when the two are
/// unrelated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryAccess {
    access_type: MemoryAccessType,
    path: AccessPath,
    constraints: AccessConstraints,
    dependencies: Vec<Option<BufferDependency>>,
}

impl MemoryAccess {
    pub fn new(access_type: MemoryAccessType, path: AccessPath) -> Self {
        Self {
            access_type,
            path,
            constraints: AccessConstraints::default(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: AccessConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn access_type(&self) -> MemoryAccessType {
        self.access_type
    }

    pub fn path(&self) -> &AccessPath {
        &self.path
    }

    pub fn constraints(&self) -> &AccessConstraints {
        &self.constraints
    }

    pub fn dependencies(&self) -> &[Option<BufferDependency>] {
        &self.dependencies
    }

    /// Dependency on the earlier access `i`, if one was attached.
    pub fn dependency_on(&self, i: usize) -> Option<&BufferDependency> {
        self.dependencies.get(i).and_then(|d| d.as_ref())
    }

    pub(crate) fn set_dependencies(&mut self, dependencies: Vec<Option<BufferDependency>>) {
        self.dependencies = dependencies;
    }
}

impl fmt::Display for MemoryAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.access_type, self.path)
    }
}
