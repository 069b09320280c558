// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Misses that need an eviction first.

use log::trace;

use crate::model::BufferAccessEvent;
use crate::structure::MemoryAccessStructure;

/// Reject a miss on a tag loaded earlier unless enough accesses to the same
/// set come in between to evict it.
///
/// For access `j` missing in a replaceable buffer, take the latest earlier
/// access `i` sharing its tag. Only accesses `k` with `i < k < j` that are
/// index-equal to `i` can push the entry out, and the buffer needs at least
/// `ways` of them.
pub fn access_then_miss(structure: &MemoryAccessStructure) -> bool {
    for j in 0..structure.size() {
        let access = structure.access(j);
        let united = structure.united_dependency(j);

        for buffer in access.path().buffers() {
            if !buffer.is_replaceable()
                || access.path().event(buffer.name()) != Some(BufferAccessEvent::Miss)
            {
                continue;
            }
            let Some(latest) = united
                .hazard(buffer.name())
                .and_then(|hazard| hazard.tag_equal_relation().last().copied())
            else {
                continue;
            };

            let evicting = (latest + 1..j)
                .filter(|&k| {
                    structure
                        .united_dependency(k)
                        .hazard(buffer.name())
                        .is_some_and(|hazard| hazard.index_equal_relation().contains(&latest))
                })
                .count();

            if evicting < buffer.ways() {
                trace!(
                    "{}: access {} misses after {} with {} of {} evicting accesses",
                    buffer,
                    j,
                    latest,
                    evicting,
                    buffer.ways()
                );
                return false;
            }
        }
    }
    true
}
