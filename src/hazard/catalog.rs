// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The hazard catalog: structurally possible hazard kinds per buffer.

use super::{Hazard, HazardKind};
use crate::model::{Buffer, BufferAccess};

/// Hazard kinds that two accesses to `buffer` may be linked by.
///
/// Multi-set buffers may map the two accesses to different sets. Tagged
/// buffers distinguish equal and unequal tags, and replaceable ones may also
/// have evicted the earlier entry in between. Untagged buffers fall back to
/// index equality, or whole-address equality when there is a single set.
/// Pass-through views and backing memory admit nothing.
pub fn hazard_kinds(buffer: &Buffer) -> Vec<HazardKind> {
    if !buffer.is_hazard_eligible() {
        return Vec::new();
    }

    let mut kinds = Vec::new();
    if buffer.sets() > 1 {
        kinds.push(HazardKind::IndexNotEqual);
    }
    if buffer.is_tagged() {
        kinds.push(HazardKind::TagNotEqual);
        kinds.push(HazardKind::TagEqual);
        if buffer.is_replaceable() {
            kinds.push(HazardKind::TagNotReplaced);
            kinds.push(HazardKind::TagReplaced);
        }
    } else if buffer.sets() > 1 {
        kinds.push(HazardKind::IndexEqual);
    } else {
        kinds.push(HazardKind::AddrNotEqual);
        kinds.push(HazardKind::AddrEqual);
    }
    kinds
}

/// Every hazard the catalog allows between two accesses to one buffer.
pub fn possible_hazards(primary: &BufferAccess, secondary: &BufferAccess) -> Vec<Hazard> {
    hazard_kinds(primary.buffer())
        .into_iter()
        .map(|kind| Hazard::new(kind, primary.clone(), secondary.clone()))
        .collect()
}

/// Hazard kinds between two addresses of one address space.
pub fn address_hazard_kinds() -> Vec<HazardKind> {
    vec![HazardKind::AddrNotEqual, HazardKind::AddrEqual]
}

/// Address hazards of the space indexed by the shared buffer of `primary`
/// and `secondary`.
pub fn possible_address_hazards(primary: &BufferAccess, secondary: &BufferAccess) -> Vec<Hazard> {
    address_hazard_kinds()
        .into_iter()
        .map(|kind| Hazard::address(kind, primary.clone(), secondary.clone()))
        .collect()
}
