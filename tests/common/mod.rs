// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use mmu_structure_gen::engine::{Cursor, StructureIterator};
use mmu_structure_gen::hazard::{BufferDependency, Hazard, HazardKind};
use mmu_structure_gen::model::{
    AccessPath, Buffer, BufferAccess, BufferAccessEvent, MemoryAccess, MemoryAccessType,
    MemoryTopology,
};
use mmu_structure_gen::source::{AccessConstraints, TableClassifier};
use mmu_structure_gen::{GeneratorSettings, MemoryAccessStructure, Result};

/// Direct-mapped, 64 sets: hazards IndexNotEqual, TagNotEqual, TagEqual.
pub fn l0() -> Buffer {
    Buffer::cache("L0", "PA", 1, 64)
}

/// Like [`l0`], but a separate buffer.
pub fn l2() -> Buffer {
    Buffer::cache("L2", "PA", 1, 64)
}

/// Four ways, 128 sets: replaceable, so all five tagged hazard kinds.
pub fn l1() -> Buffer {
    Buffer::cache("L1", "PA", 4, 128)
}

pub fn path(entries: &[(&Buffer, BufferAccessEvent)]) -> AccessPath {
    AccessPath::new(
        entries
            .iter()
            .map(|(buffer, event)| BufferAccess::new((*buffer).clone(), *event))
            .collect(),
    )
}

pub fn load(path: AccessPath) -> MemoryAccess {
    MemoryAccess::new(MemoryAccessType::load(8), path)
}

/// A classifier handing every load the given paths.
pub fn loads(paths: Vec<AccessPath>) -> TableClassifier {
    TableClassifier::new().with_paths(MemoryAccessType::load(8), paths)
}

pub fn topology() -> MemoryTopology {
    MemoryTopology::new(vec![l0(), l1(), l2()])
}

/// Settings that link accesses through buffer hazards only.
pub fn buffer_level() -> GeneratorSettings {
    GeneratorSettings::default().with_address_hazards(false)
}

/// `n` unconstrained loads over `classifier`.
pub fn iterator(
    classifier: &TableClassifier,
    n: usize,
    settings: GeneratorSettings,
) -> Result<StructureIterator> {
    StructureIterator::new(
        &topology(),
        vec![MemoryAccessType::load(8); n],
        vec![AccessConstraints::default(); n],
        AccessConstraints::default(),
        classifier,
        settings,
    )
}

/// Build a structure from the accesses and `(i, j, hazard)` triples. Each
/// hazard links the first top-level entry for its buffer on both paths.
pub fn structure(
    accesses: Vec<MemoryAccess>,
    hazards: &[(usize, usize, &str, HazardKind)],
) -> MemoryAccessStructure {
    let n = accesses.len();
    let mut matrix: Vec<Vec<Option<BufferDependency>>> = vec![vec![None; n]; n];
    for (i, j, buffer, kind) in hazards {
        let primary = accesses[*i].path().top_level(buffer).unwrap().clone();
        let secondary = accesses[*j].path().top_level(buffer).unwrap().clone();
        let dependency = matrix[*i][*j].take().unwrap_or_default();
        matrix[*i][*j] = Some(dependency.with(Hazard::new(*kind, primary, secondary)));
    }
    MemoryAccessStructure::new(accesses, matrix)
}

/// Run the cursor to exhaustion, collecting the structures it yields.
pub fn drain(cursor: &mut StructureIterator) -> Vec<MemoryAccessStructure> {
    let mut structures = Vec::new();
    cursor.init();
    while let Some(structure) = cursor.structure() {
        structures.push(structure);
        cursor.next();
    }
    structures
}

/// Display strings of the first `n` structures after `init()`.
pub fn first_structures(cursor: &mut StructureIterator, n: usize) -> Vec<String> {
    cursor.init();
    let mut shown = Vec::new();
    while let Some(structure) = cursor.structure() {
        shown.push(structure.to_string());
        if shown.len() == n {
            break;
        }
        cursor.next();
    }
    shown
}
