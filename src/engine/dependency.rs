// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Possible dependencies between two accesses, and cursors over them.

use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::cursor::{Cursor, CursorState};
use super::Sampling;
use crate::filter::StructureFilter;
use crate::hazard::{possible_address_hazards, possible_hazards, BufferDependency, Hazard};
use crate::model::{BufferAccess, MemoryAccess};
use crate::structure::MemoryAccessStructure;

/// Buffer-access pairs that may be linked by a hazard: same buffer, the
/// buffer is neither a view nor memory, and both accesses are top-level.
pub fn eligible_pairs<'a>(
    first: &'a MemoryAccess,
    second: &'a MemoryAccess,
) -> Vec<(&'a BufferAccess, &'a BufferAccess)> {
    shared_entries(first, second)
        .into_iter()
        .filter(|(b1, _)| b1.buffer().is_hazard_eligible())
        .collect()
}

/// One top-level pair per address space indexed by a buffer both accesses
/// consult, in the first access's path order. Views and memory count.
pub fn address_pairs<'a>(
    first: &'a MemoryAccess,
    second: &'a MemoryAccess,
) -> Vec<(&'a BufferAccess, &'a BufferAccess)> {
    let mut pairs: Vec<(&BufferAccess, &BufferAccess)> = Vec::new();
    for (b1, b2) in shared_entries(first, second) {
        let space = b1.buffer().address_space();
        if !pairs.iter().any(|(p1, _)| p1.buffer().address_space() == space) {
            pairs.push((b1, b2));
        }
    }
    pairs
}

fn shared_entries<'a>(
    first: &'a MemoryAccess,
    second: &'a MemoryAccess,
) -> Vec<(&'a BufferAccess, &'a BufferAccess)> {
    let mut pairs = Vec::new();
    for b1 in first.path().entries().iter().filter(|b| b.is_top_level()) {
        for b2 in second.path().entries() {
            if b2.is_top_level() && b1.same_buffer(b2) {
                pairs.push((b1, b2));
            }
        }
    }
    pairs
}

/// Every dependency of `second` on `first` that passes `pair_filter`.
///
/// The cross product starts with the address hazards of every shared
/// address space (when `address_hazards` is set), then takes the hazards of
/// each eligible buffer-access pair. It is pruned after each factor: a
/// partial dependency the filter already rejects is not extended. Returns
/// `[None]` when the accesses share nothing that could be linked, and an
/// empty list when pruning leaves nothing at all.
pub fn possible_dependencies(
    first: &MemoryAccess,
    second: &MemoryAccess,
    pair_filter: &StructureFilter,
    address_hazards: bool,
) -> Vec<Option<BufferDependency>> {
    let mut factors: Vec<Vec<Hazard>> = Vec::new();
    if address_hazards {
        for (b1, b2) in address_pairs(first, second) {
            factors.push(possible_address_hazards(b1, b2));
        }
    }
    for (b1, b2) in eligible_pairs(first, second) {
        let hazards = possible_hazards(b1, b2);
        if !hazards.is_empty() {
            factors.push(hazards);
        }
    }
    if factors.is_empty() {
        return vec![None];
    }

    let mut candidates = vec![BufferDependency::new()];
    for hazards in factors {
        let mut extended = Vec::with_capacity(candidates.len() * hazards.len());
        for candidate in &candidates {
            for hazard in &hazards {
                let dependency = candidate.with(hazard.clone());
                let pair = MemoryAccessStructure::pair(
                    first.clone(),
                    second.clone(),
                    Some(dependency.clone()),
                );
                if pair_filter(&pair) {
                    extended.push(dependency);
                }
            }
        }

        if extended.is_empty() {
            trace!("no dependency survives {}", hazards[0]);
            return Vec::new();
        }
        candidates = extended;
    }

    candidates.into_iter().map(Some).collect()
}

/// Walks the possible dependencies in order.
pub struct ExhaustiveDependencies {
    dependencies: Vec<Option<BufferDependency>>,
    index: usize,
    state: CursorState,
}

impl ExhaustiveDependencies {
    pub fn new(dependencies: Vec<Option<BufferDependency>>) -> Self {
        Self {
            dependencies,
            index: 0,
            state: CursorState::Fresh,
        }
    }
}

impl Cursor for ExhaustiveDependencies {
    type Item = Option<BufferDependency>;

    fn init(&mut self) {
        self.index = 0;
        self.state = if self.dependencies.is_empty() {
            CursorState::Exhausted
        } else {
            CursorState::HasValue
        };
    }

    fn has_value(&self) -> bool {
        self.state == CursorState::HasValue
    }

    fn value(&self) -> Option<Option<BufferDependency>> {
        self.has_value().then(|| self.dependencies[self.index].clone())
    }

    fn next(&mut self) {
        if !self.has_value() {
            return;
        }
        self.index += 1;
        if self.index >= self.dependencies.len() {
            self.state = CursorState::Exhausted;
        }
    }

    fn stop(&mut self) {
        self.state = CursorState::Exhausted;
    }
}

/// Walks the possible dependencies in a random order, fixed by the seed
/// until the next `init()`.
pub struct RandomDependencies {
    dependencies: Vec<Option<BufferDependency>>,
    order: Vec<usize>,
    rng: StdRng,
    index: usize,
    state: CursorState,
}

impl RandomDependencies {
    pub fn new(dependencies: Vec<Option<BufferDependency>>, sampling: &Sampling) -> Self {
        Self {
            order: (0..dependencies.len()).collect(),
            dependencies,
            rng: StdRng::seed_from_u64(sampling.seed),
            index: 0,
            state: CursorState::Fresh,
        }
    }
}

impl Cursor for RandomDependencies {
    type Item = Option<BufferDependency>;

    fn init(&mut self) {
        self.order.shuffle(&mut self.rng);
        self.index = 0;
        self.state = if self.dependencies.is_empty() {
            CursorState::Exhausted
        } else {
            CursorState::HasValue
        };
    }

    fn has_value(&self) -> bool {
        self.state == CursorState::HasValue
    }

    fn value(&self) -> Option<Option<BufferDependency>> {
        self.has_value()
            .then(|| self.dependencies[self.order[self.index]].clone())
    }

    fn next(&mut self) {
        if !self.has_value() {
            return;
        }
        self.index += 1;
        if self.index >= self.order.len() {
            self.state = CursorState::Exhausted;
        }
    }

    fn stop(&mut self) {
        self.state = CursorState::Exhausted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterBuilder;
    use crate::hazard::HazardKind;
    use crate::model::{AccessContext, AccessPath, Buffer, BufferAccessEvent, MemoryAccessType};
    use std::rc::Rc;

    fn access(entries: Vec<BufferAccess>) -> MemoryAccess {
        MemoryAccess::new(MemoryAccessType::load(8), AccessPath::new(entries))
    }

    fn accept_all() -> StructureFilter {
        FilterBuilder::new().build()
    }

    #[test]
    fn test_eligible_pairs() {
        use BufferAccessEvent::*;
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let mem = Buffer::memory("MEM", "PA");
        let walk = AccessContext::empty().descend("DTLB");
        let first = access(vec![
            BufferAccess::new(l1.clone(), Miss),
            BufferAccess::new(mem.clone(), Read),
        ]);
        let second = access(vec![
            BufferAccess::new(l1.clone(), Hit).with_context(walk),
            BufferAccess::new(l1, Hit),
            BufferAccess::new(mem, Read),
        ]);
        let pairs = eligible_pairs(&first, &second);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1.event(), Hit);
        assert!(pairs[0].1.is_top_level());
    }

    #[test]
    fn test_unrelated_pair_gets_placeholder() {
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let l2 = Buffer::cache("L2", "PA", 8, 1024);
        let first = access(vec![BufferAccess::new(l1, BufferAccessEvent::Hit)]);
        let second = access(vec![BufferAccess::new(l2, BufferAccessEvent::Hit)]);
        assert_eq!(
            possible_dependencies(&first, &second, &accept_all(), true),
            vec![None]
        );
    }

    #[test]
    fn test_cross_product() {
        let l0 = Buffer::cache("L0", "PA", 1, 64);
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let path = vec![
            BufferAccess::new(l0, BufferAccessEvent::Hit),
            BufferAccess::new(l1, BufferAccessEvent::Hit),
        ];
        let first = access(path.clone());
        let second = access(path);
        let dependencies = possible_dependencies(&first, &second, &accept_all(), false);
        // 3 kinds on L0 times 5 on L1.
        assert_eq!(dependencies.len(), 15);
        assert!(dependencies.iter().all(|d| d.as_ref().is_some_and(|d| d.len() == 2)));
    }

    #[test]
    fn test_pruning() {
        let l0 = Buffer::cache("L0", "PA", 1, 64);
        let first = access(vec![BufferAccess::new(l0.clone(), BufferAccessEvent::Hit)]);
        let second = access(vec![BufferAccess::new(l0, BufferAccessEvent::Miss)]);

        // The basic filters drop TAG_EQUAL before a miss on a direct-mapped buffer.
        let basic = FilterBuilder::basic().build();
        let kinds: Vec<HazardKind> = possible_dependencies(&first, &second, &basic, false)
            .into_iter()
            .flatten()
            .map(|d| d.hazards()[0].kind())
            .collect();
        assert_eq!(kinds, vec![HazardKind::IndexNotEqual, HazardKind::TagNotEqual]);

        let reject_all: StructureFilter = Rc::new(|_: &MemoryAccessStructure| false);
        assert!(possible_dependencies(&first, &second, &reject_all, false).is_empty());
        assert!(possible_dependencies(&first, &second, &reject_all, true).is_empty());
    }

    #[test]
    fn test_address_pairs_one_per_space() {
        use BufferAccessEvent::*;
        let dtlb = Buffer::cache("DTLB", "VA", 4, 16);
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let mem = Buffer::memory("MEM", "PA");
        let path = vec![
            BufferAccess::new(dtlb, Hit),
            BufferAccess::new(l1, Miss),
            BufferAccess::new(mem, Read),
        ];
        let first = access(path.clone());
        let second = access(path);
        let spaces: Vec<&str> = address_pairs(&first, &second)
            .iter()
            .map(|(b1, _)| b1.buffer().name())
            .collect();
        assert_eq!(spaces, vec!["DTLB", "L1"]);
    }

    #[test]
    fn test_address_factor_comes_first() {
        let l0 = Buffer::cache("L0", "PA", 1, 64);
        let first = access(vec![BufferAccess::new(l0.clone(), BufferAccessEvent::Hit)]);
        let second = access(vec![BufferAccess::new(l0, BufferAccessEvent::Hit)]);

        let basic = FilterBuilder::basic().build();
        let names: Vec<String> = possible_dependencies(&first, &second, &basic, true)
            .into_iter()
            .flatten()
            .map(|d| d.to_string())
            .collect();
        // Equal addresses leave only the equal tag.
        assert_eq!(
            names,
            vec![
                "{PA.ADDR_NOT_EQUAL, L0.INDEX_NOT_EQUAL}",
                "{PA.ADDR_NOT_EQUAL, L0.TAG_NOT_EQUAL}",
                "{PA.ADDR_NOT_EQUAL, L0.TAG_EQUAL}",
                "{PA.ADDR_EQUAL, L0.TAG_EQUAL}",
            ]
        );
    }

    #[test]
    fn test_shared_memory_only_links_addresses() {
        let mem = Buffer::memory("MEM", "PA");
        let first = access(vec![BufferAccess::new(mem.clone(), BufferAccessEvent::Read)]);
        let second = access(vec![BufferAccess::new(mem, BufferAccessEvent::Write)]);
        assert_eq!(
            possible_dependencies(&first, &second, &accept_all(), false),
            vec![None]
        );
        let dependencies = possible_dependencies(&first, &second, &accept_all(), true);
        assert_eq!(dependencies.len(), 2);
        assert!(dependencies
            .iter()
            .flatten()
            .all(|d| d.address_hazard("PA").is_some()));
    }

    #[test]
    fn test_random_dependencies_cover_everything_once() {
        let dependencies: Vec<Option<BufferDependency>> = (0..6).map(|_| None).collect();
        let sampling = Sampling {
            seed: 3,
            retry_limit: 1,
        };
        let mut cursor = RandomDependencies::new(dependencies, &sampling);
        cursor.init();
        let mut seen = 0;
        while cursor.has_value() {
            seen += 1;
            cursor.next();
        }
        assert_eq!(seen, 6);
        let mut order = cursor.order.clone();
        order.sort();
        assert_eq!(order, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_exhaustive_dependencies() {
        let mut cursor = ExhaustiveDependencies::new(vec![None, None]);
        assert!(!cursor.has_value());
        cursor.init();
        assert_eq!(cursor.value(), Some(None));
        cursor.next();
        assert!(cursor.has_value());
        cursor.next();
        assert!(!cursor.has_value());
        assert_eq!(cursor.value(), None);

        let mut empty = ExhaustiveDependencies::new(Vec::new());
        empty.init();
        assert!(!empty.has_value());
    }
}
