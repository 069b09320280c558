// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Memory access structures: the unit the generator hands to its caller.
//!
//! A structure is N accesses plus an upper-triangular matrix of
//! dependencies: `dependency(i, j)` for `i < j` describes how access `j`
//! relates to the earlier access `i`, or is `None` when the two share no
//! eligible buffer. The united dependency of every access is computed once,
//! on construction, since every filter level above the pair level reads it.

use std::fmt;

use crate::error::{GeneratorError, Result};
use crate::hazard::{BufferDependency, UnitedDependency};
use crate::model::MemoryAccess;

#[derive(Debug, Clone)]
pub struct MemoryAccessStructure {
    accesses: Vec<MemoryAccess>,
    // dependencies[i][j], meaningful for i < j only.
    dependencies: Vec<Vec<Option<BufferDependency>>>,
    united: Vec<UnitedDependency>,
}

impl MemoryAccessStructure {
    /// # Panics
    ///
    /// Panics if `dependencies` is not an N×N matrix for N accesses.
    pub fn new(
        accesses: Vec<MemoryAccess>,
        dependencies: Vec<Vec<Option<BufferDependency>>>,
    ) -> Self {
        let size = accesses.len();
        assert_eq!(
            dependencies.len(),
            size,
            "Dependency matrix must have one row per access"
        );
        assert!(
            dependencies.iter().all(|row| row.len() == size),
            "Dependency matrix must be square"
        );

        let united = (0..size)
            .map(|j| {
                UnitedDependency::new(
                    (0..j).filter_map(|i| dependencies[i][j].as_ref().map(|dep| (i, dep))),
                )
            })
            .collect();

        Self {
            accesses,
            dependencies,
            united,
        }
    }

    /// A two-access structure, as checked while enumerating one pair.
    pub fn pair(
        first: MemoryAccess,
        second: MemoryAccess,
        dependency: Option<BufferDependency>,
    ) -> Self {
        Self::new(
            vec![first, second],
            vec![vec![None, dependency], vec![None, None]],
        )
    }

    pub fn size(&self) -> usize {
        self.accesses.len()
    }

    pub fn accesses(&self) -> &[MemoryAccess] {
        &self.accesses
    }

    pub fn access(&self, i: usize) -> &MemoryAccess {
        &self.accesses[i]
    }

    /// Dependency of access `j` on the earlier access `i`; `None` unless `i < j`.
    pub fn dependency(&self, i: usize, j: usize) -> Option<&BufferDependency> {
        if i < j {
            self.dependencies[i][j].as_ref()
        } else {
            None
        }
    }

    pub fn united_dependency(&self, j: usize) -> &UnitedDependency {
        &self.united[j]
    }

    /// Check that every hazard links buffer accesses present on both paths.
    pub fn validate(&self) -> Result<()> {
        for j in 0..self.size() {
            for i in 0..j {
                let Some(dependency) = self.dependency(i, j) else {
                    continue;
                };
                for hazard in dependency.hazards() {
                    let (position, entry) = if !self.accesses[i].path().contains(hazard.primary()) {
                        (i, hazard)
                    } else if !self.accesses[j].path().contains(hazard.secondary()) {
                        (j, hazard)
                    } else {
                        continue;
                    };
                    return Err(GeneratorError::DanglingHazard {
                        hazard: entry.full_name(),
                        position,
                    });
                }
            }
        }
        Ok(())
    }

    /// The accesses with their dependency rows attached.
    pub fn into_accesses(self) -> Vec<MemoryAccess> {
        let Self {
            mut accesses,
            dependencies,
            ..
        } = self;
        for (j, access) in accesses.iter_mut().enumerate() {
            let row = (0..j).map(|i| dependencies[i][j].clone()).collect();
            access.set_dependencies(row);
        }
        accesses
    }
}

impl fmt::Display for MemoryAccessStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (j, access) in self.accesses.iter().enumerate() {
            writeln!(f, "{}: {}", j, access)?;
            for i in 0..j {
                if let Some(dependency) = self.dependency(i, j) {
                    writeln!(f, "  {} -> {}: {}", i, j, dependency)?;
                }
            }
        }
        Ok(())
    }
}
