// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hazard-level and united filters on buffer replacement.
//!
//! A `TAG_REPLACED` hazard means the entry loaded by the earlier access has
//! been evicted by the time the later access looks it up. The filters here
//! reject combinations of that hazard with events or other hazards that no
//! address assignment can satisfy.

use log::trace;

use crate::hazard::{Hazard, HazardKind, UnitedDependency, UnitedHazard};
use crate::model::{BufferAccessEvent, MemoryAccess};

/// A buffer that never evicts cannot miss on a tag it already holds.
pub fn non_replaceable_tag_equal(
    _first: &MemoryAccess,
    _second: &MemoryAccess,
    hazard: &Hazard,
) -> bool {
    if hazard.kind() == HazardKind::TagEqual
        && !hazard.buffer().is_replaceable()
        && hazard.secondary().event() == BufferAccessEvent::Miss
    {
        trace!("{}: miss on a non-replaceable buffer", hazard);
        return false;
    }
    true
}

/// A replaced entry must be fetched again, so the access cannot hit.
pub fn hit_and_tag_replaced(access: &MemoryAccess, hazard: &UnitedHazard) -> bool {
    let buffer = hazard.buffer().name();
    if access.path().event(buffer) == Some(BufferAccessEvent::Hit)
        && !hazard.tag_replaced_relation().is_empty()
    {
        trace!("{}: hit after tag replaced", buffer);
        return false;
    }
    true
}

/// One partner cannot both share the tag and have had it replaced.
pub fn tag_equal_and_tag_replaced(_access: &MemoryAccess, hazard: &UnitedHazard) -> bool {
    let tag_replaced = hazard.tag_replaced_relation();
    if hazard
        .tag_equal_relation()
        .iter()
        .any(|partner| tag_replaced.contains(partner))
    {
        trace!("{}: tag equal and tag replaced", hazard.buffer());
        return false;
    }
    true
}

/// At most one earlier access may have its entry replaced by this one.
pub fn multiple_tag_replaced(_access: &MemoryAccess, hazard: &UnitedHazard) -> bool {
    if hazard.tag_replaced_relation().len() > 1 {
        trace!("{}: multiple tags replaced", hazard.buffer());
        return false;
    }
    true
}

/// A replacement in one buffer rules out a hit in the other buffers
/// indexed by the same address.
pub fn hit_and_tag_replaced_across_buffers(
    access: &MemoryAccess,
    united: &UnitedDependency,
) -> bool {
    for hazard in united.hazards() {
        if hazard.tag_replaced_relation().is_empty() {
            continue;
        }
        let replaced = hazard.buffer();
        let hit_elsewhere = access.path().buffers().into_iter().any(|buffer| {
            buffer.name() != replaced.name()
                && buffer.address_space() == replaced.address_space()
                && access.path().event(buffer.name()) == Some(BufferAccessEvent::Hit)
        });
        if hit_elsewhere {
            trace!(
                "{}: tag replaced but another {} buffer hits",
                replaced,
                replaced.address_space()
            );
            return false;
        }
    }
    true
}

/// Replacement may happen in at most one buffer per address space.
pub fn multiple_tag_replaced_across_buffers(
    _access: &MemoryAccess,
    united: &UnitedDependency,
) -> bool {
    let mut spaces: Vec<&str> = Vec::new();
    for hazard in united.hazards() {
        if hazard.tag_replaced_relation().is_empty() {
            continue;
        }
        let space = hazard.buffer().address_space();
        if spaces.contains(&space) {
            trace!("{}: tags replaced in several buffers", space);
            return false;
        }
        spaces.push(space);
    }
    true
}
